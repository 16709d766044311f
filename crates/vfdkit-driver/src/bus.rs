//! Register bus abstraction
//!
//! A narrow seam between the exchange engine and the transport: two
//! operations, both bounded in time by the implementation. The real
//! implementation lives in [`crate::session`]; tests substitute a scripted
//! mock so cycle logic can be exercised without a device.

use async_trait::async_trait;
use vfdkit_core::TransactionError;

/// Bounded holding-register access to one device
#[async_trait]
pub trait RegisterBus: Send {
    /// Read `count` holding registers starting at `addr`.
    async fn read_holding(&mut self, addr: u16, count: u16)
        -> Result<Vec<u16>, TransactionError>;

    /// Write a single holding register.
    async fn write_register(&mut self, addr: u16, value: u16) -> Result<(), TransactionError>;
}
