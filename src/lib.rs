//! Emulated 256 byte I2C memory and the exchange driver that exercises it.
//!
//! The device side is a two-state protocol machine: the first byte of every
//! write transaction selects a memory slot, further bytes stream into memory
//! with an auto-incrementing cursor, and reads are served sequentially from
//! wherever the cursor points. The controller side writes a payload, seeks
//! back, reads it in two parts and verifies the round-trip.
//!
//! ```
//! use i2c_scratchpad::{Exchange, Loopback, MemDevice, DEFAULT_DEVICE_ADDRESS};
//!
//! let mut bus = Loopback::new();
//! bus.bind(DEFAULT_DEVICE_ADDRESS, MemDevice::new()).unwrap();
//!
//! let mut exchange = Exchange::new(bus, DEFAULT_DEVICE_ADDRESS);
//! exchange.roundtrip(0x00, b"HI", 1).unwrap();
//! ```
#![no_std]
mod fmt;

mod device;
pub mod error;
mod exchange;
mod loopback;
mod store;

pub use device::{Event, MemDevice, Target};
pub use error::{Error, ErrorKind};
pub use exchange::Exchange;
pub use loopback::{BusFault, Loopback};
pub use store::{MemStore, MEM_SIZE};

/// The example device address used by the demo and the documentation.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0x17;
