use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use vfdkit::{
    init_logging, ExchangeEngine, Poller, RegisterMap, Session, SignalSurface, SpeedLimits,
    TransportConfig,
};

/// Huanyang GT-series VFD spindle driver (Modbus RTU)
///
/// Any option not given on the command line uses the GT-series factory
/// default. Invalid values fall back to the default with a warning; only a
/// transport that cannot be opened is fatal.
#[derive(Parser, Debug)]
#[command(name = "vfdkit", version, about)]
struct Args {
    /// Serial device path
    #[arg(short = 'd', long)]
    device: Option<String>,

    /// Number of data bits (5-8)
    #[arg(short = 'b', long)]
    bits: Option<String>,

    /// Baud rate
    #[arg(short = 'r', long)]
    rate: Option<String>,

    /// Parity (N, E, or O)
    #[arg(short = 'p', long)]
    parity: Option<String>,

    /// Stop bits (1 or 2)
    #[arg(short = 's', long)]
    stopbits: Option<String>,

    /// Modbus slave address (1-127)
    #[arg(short = 't', long)]
    slave: Option<String>,

    /// Max motor speed in RPM
    #[arg(short = 'M', long)]
    maxrpm: Option<String>,

    /// Min motor speed in RPM
    #[arg(short = 'm', long)]
    minrpm: Option<String>,

    /// Polling period in milliseconds
    #[arg(long, default_value_t = 250)]
    period_ms: u64,

    /// Divisor converting the raw speed register to speed feedback
    #[arg(long, default_value_t = 60.0)]
    fb_divisor: f64,
}

fn parse_or_warn<T: std::str::FromStr>(raw: &str, what: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(value = raw, "Invalid {} - not a number, using default", what);
            None
        }
    }
}

fn build_config(args: &Args) -> (TransportConfig, SpeedLimits) {
    let mut config = TransportConfig::default();
    if let Some(device) = &args.device {
        config.set_device(device.clone());
    }
    if let Some(raw) = &args.rate {
        if let Some(baud) = parse_or_warn::<u32>(raw, "baud rate") {
            config.set_baud_rate(baud);
        }
    }
    if let Some(raw) = &args.bits {
        if let Some(bits) = parse_or_warn::<u8>(raw, "byte size") {
            config.set_data_bits(bits);
        }
    }
    if let Some(raw) = &args.parity {
        config.set_parity(raw);
    }
    if let Some(raw) = &args.stopbits {
        if let Some(stop_bits) = parse_or_warn::<u8>(raw, "stop bits") {
            config.set_stop_bits(stop_bits);
        }
    }
    if let Some(raw) = &args.slave {
        if let Some(slave) = parse_or_warn::<u8>(raw, "slave address") {
            config.set_slave(slave);
        }
    }

    let mut limits = SpeedLimits::default();
    if let Some(raw) = &args.maxrpm {
        if let Some(max_rpm) = parse_or_warn::<f64>(raw, "max RPM") {
            limits.set_max_rpm(max_rpm);
        }
    }
    if let Some(raw) = &args.minrpm {
        if let Some(min_rpm) = parse_or_warn::<f64>(raw, "min RPM") {
            limits.set_min_rpm(min_rpm);
        }
    }

    (config, limits)
}

/// Line-oriented supervisor channel on stdin.
///
/// Stands in for the HAL pin surface of a hosting motion-control system:
/// `speed <rpm>`, `on`, `off`, `status`, `quit`. An embedding supervisor
/// uses the [`SignalSurface`] API directly instead.
async fn supervisor_channel(surface: Arc<SignalSurface>, shutdown: Arc<Notify>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("speed") => match parts.next().and_then(|raw| raw.parse::<f64>().ok()) {
                Some(rpm) => surface.set_speed_command(rpm),
                None => tracing::warn!(input = %line, "usage: speed <rpm>"),
            },
            Some("on") => surface.set_spindle_enable(true),
            Some("off") => surface.set_spindle_enable(false),
            Some("status") => match serde_json::to_string(&surface.telemetry()) {
                Ok(json) => println!("{}", json),
                Err(err) => tracing::error!(%err, "could not serialize telemetry"),
            },
            Some("quit") => {
                shutdown.notify_one();
                break;
            }
            Some(other) => {
                tracing::warn!(command = other, "unknown command (speed/on/off/status/quit)");
            }
            None => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let args = Args::parse();
    let (config, limits) = build_config(&args);

    let period_ms = if args.period_ms == 0 {
        tracing::warn!("Polling period must be non-zero - using default of 250ms");
        250
    } else {
        args.period_ms
    };
    let fb_divisor = if args.fb_divisor > 0.0 {
        args.fb_divisor
    } else {
        tracing::warn!(
            value = args.fb_divisor,
            "Feedback divisor must be positive - using default of 60"
        );
        60.0
    };

    // A missing or misconfigured serial device cannot self-heal; report and
    // exit rather than retrying.
    let session = match Session::open(&config) {
        Ok(session) => session,
        Err(err) => {
            tracing::error!(%err, "Could not initialize serial port");
            std::process::exit(1);
        }
    };

    let surface = SignalSurface::new();
    let shutdown = Arc::new(Notify::new());
    let engine = ExchangeEngine::new(RegisterMap::GT_SERIES, limits, fb_divisor);

    let input_task = tokio::spawn(supervisor_channel(surface.clone(), shutdown.clone()));

    Poller::new(
        surface,
        session,
        engine,
        Duration::from_millis(period_ms),
        shutdown,
    )
    .run()
    .await;

    input_task.abort();
    Ok(())
}
