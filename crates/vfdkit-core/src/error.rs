//! Error handling for VFDKit
//!
//! Provides error types for the two failure classes that can actually fail:
//! - Session errors (opening the serial/Modbus transport)
//! - Transaction errors (a single register read/write mid-loop)
//!
//! Configuration errors are deliberately absent: invalid CLI values fall back
//! to defaults with a warning and never surface as an error value.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Session error type
///
/// Represents failures while opening the serial transport and attaching the
/// Modbus RTU context. These are fatal at startup: a missing or misconfigured
/// serial device cannot self-heal, so the process reports and exits rather
/// than retrying indefinitely.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    /// Failed to open the serial device
    #[error("Failed to open serial device {device}: {reason}")]
    FailedToOpen {
        /// The device path that failed to open.
        device: String,
        /// The reason the device failed to open.
        reason: String,
    },

    /// Transport parameters rejected by the serial layer
    #[error("Invalid transport parameters: {reason}")]
    InvalidParameters {
        /// The reason the parameters are invalid.
        reason: String,
    },
}

/// Transaction error type
///
/// Represents a single failed register exchange inside the polling loop.
/// These are never fatal: the loop counts them and continues with the
/// last-known-good telemetry.
#[derive(Error, Debug, Clone)]
pub enum TransactionError {
    /// The device did not answer within the configured timeout
    #[error("Transaction timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The device answered with a Modbus exception
    #[error("Device exception: {reason}")]
    Exception {
        /// The exception reported by the device.
        reason: String,
    },

    /// The transport failed mid-exchange
    #[error("Transport error: {reason}")]
    Transport {
        /// The reason for the transport error.
        reason: String,
    },

    /// The device answered with fewer registers than requested
    #[error("Short response: expected {expected} registers, got {actual}")]
    ShortResponse {
        /// The number of registers requested.
        expected: u16,
        /// The number of registers received.
        actual: usize,
    },
}

/// Main error type for VFDKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Transaction error
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transaction(TransactionError::Timeout { .. }))
    }

    /// Check if this is a session error
    pub fn is_session_error(&self) -> bool {
        matches!(self, Error::Session(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
