//! Modbus RTU session management
//!
//! Owns the serial transport for the lifetime of the process. Opening is
//! fatal-on-failure at startup; once the polling loop is running there is no
//! implicit reconnect — mid-loop failures surface as counted transaction
//! errors, trading resilience for availability of the degraded telemetry
//! path.

use crate::bus::RegisterBus;
use async_trait::async_trait;
use tokio::time::timeout;
use tokio_modbus::client::{rtu, Context, Reader, Writer};
use tokio_modbus::Slave;
use tokio_serial::SerialStream;
use vfdkit_core::{SerialParity, SessionError, TransactionError, TransportConfig};

fn to_serial_parity(parity: SerialParity) -> tokio_serial::Parity {
    match parity {
        SerialParity::None => tokio_serial::Parity::None,
        SerialParity::Even => tokio_serial::Parity::Even,
        SerialParity::Odd => tokio_serial::Parity::Odd,
    }
}

/// An open Modbus RTU session to one drive
pub struct Session {
    ctx: Context,
    timeout_ms: u64,
    device: String,
}

impl Session {
    /// Open the serial transport and attach an RTU context bound to the
    /// configured slave address.
    ///
    /// A failure here is fatal by contract: the caller must not enter the
    /// polling loop without a session.
    pub fn open(config: &TransportConfig) -> Result<Self, SessionError> {
        let builder = tokio_serial::new(&config.device, config.baud_rate)
            .data_bits(match config.data_bits {
                5 => tokio_serial::DataBits::Five,
                6 => tokio_serial::DataBits::Six,
                7 => tokio_serial::DataBits::Seven,
                8 => tokio_serial::DataBits::Eight,
                other => {
                    return Err(SessionError::InvalidParameters {
                        reason: format!("invalid data bits: {}", other),
                    })
                }
            })
            .stop_bits(match config.stop_bits {
                1 => tokio_serial::StopBits::One,
                2 => tokio_serial::StopBits::Two,
                other => {
                    return Err(SessionError::InvalidParameters {
                        reason: format!("invalid stop bits: {}", other),
                    })
                }
            })
            .parity(to_serial_parity(config.parity))
            .timeout(config.timeout());

        let port = SerialStream::open(&builder).map_err(|e| {
            tracing::warn!("Failed to open serial device {}: {}", config.device, e);
            SessionError::FailedToOpen {
                device: config.device.clone(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(
            device = %config.device,
            baud = config.baud_rate,
            parity = %config.parity,
            slave = config.slave,
            "serial transport open"
        );

        Ok(Self {
            ctx: rtu::attach_slave(port, Slave(config.slave)),
            timeout_ms: config.timeout_ms,
            device: config.device.clone(),
        })
    }

    /// Whether the session still holds its transport.
    ///
    /// The transport is owned for the whole session lifetime, so this is
    /// true until the session is dropped; a wedged device shows up as a
    /// climbing error count, not a dead session.
    pub fn is_alive(&self) -> bool {
        true
    }

    /// The device path this session was opened on.
    pub fn device(&self) -> &str {
        &self.device
    }

    fn bounded(&self) -> tokio::time::Duration {
        tokio::time::Duration::from_millis(self.timeout_ms)
    }
}

#[async_trait]
impl RegisterBus for Session {
    async fn read_holding(
        &mut self,
        addr: u16,
        count: u16,
    ) -> Result<Vec<u16>, TransactionError> {
        match timeout(self.bounded(), self.ctx.read_holding_registers(addr, count)).await {
            Err(_) => Err(TransactionError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
            Ok(Err(e)) => Err(TransactionError::Transport {
                reason: e.to_string(),
            }),
            Ok(Ok(Err(exception))) => Err(TransactionError::Exception {
                reason: format!("{:?}", exception),
            }),
            Ok(Ok(Ok(words))) => Ok(words),
        }
    }

    async fn write_register(&mut self, addr: u16, value: u16) -> Result<(), TransactionError> {
        match timeout(self.bounded(), self.ctx.write_single_register(addr, value)).await {
            Err(_) => Err(TransactionError::Timeout {
                timeout_ms: self.timeout_ms,
            }),
            Ok(Err(e)) => Err(TransactionError::Transport {
                reason: e.to_string(),
            }),
            Ok(Ok(Err(exception))) => Err(TransactionError::Exception {
                reason: format!("{:?}", exception),
            }),
            Ok(Ok(Ok(()))) => Ok(()),
        }
    }
}
