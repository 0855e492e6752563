//! In-process bus for wiring a controller directly to bound targets.
//!
//! [`Loopback`] implements [`embedded_hal::i2c::I2c`], so anything written
//! against the HAL trait can be exercised on the host without bus hardware.
//! Targets register with [`Loopback::bind`] under a 7-bit address; an
//! unbound address reports `NoAcknowledge`, the same as silence on a real
//! bus.

use crate::device::Target;
use crate::error::{Error, ErrorKind};
use embedded_hal::i2c::{self, ErrorType, I2c, Operation, SevenBitAddress};
use heapless::Vec;

/// Bind table capacity.
const MAX_TARGETS: usize = 4;

/// Fault reported to the controller through the HAL error channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusFault {
    /// No target bound at the addressed position.
    NoAcknowledge,
}

impl i2c::Error for BusFault {
    fn kind(&self) -> i2c::ErrorKind {
        match self {
            BusFault::NoAcknowledge => {
                i2c::ErrorKind::NoAcknowledge(i2c::NoAcknowledgeSource::Address)
            }
        }
    }
}

/// An I2C bus whose targets live in the same process as the controller.
pub struct Loopback<T> {
    targets: Vec<(SevenBitAddress, T), MAX_TARGETS>,
}

impl<T> Loopback<T> {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Register `target` at `address`. Fails with [`ErrorKind::BadParam`]
    /// if the address is taken or the bind table is full.
    pub fn bind(&mut self, address: SevenBitAddress, target: T) -> Result<(), Error> {
        if self.targets.iter().any(|(bound, _)| *bound == address) {
            return Err(ErrorKind::BadParam.into());
        }
        self.targets
            .push((address, target))
            .map_err(|_| ErrorKind::BadParam.into())
    }

    /// Inspect the target bound at `address`.
    pub fn target(&self, address: SevenBitAddress) -> Option<&T> {
        self.targets
            .iter()
            .find(|(bound, _)| *bound == address)
            .map(|(_, target)| target)
    }
}

impl<T> Default for Loopback<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, PartialEq)]
enum Direction {
    Read,
    Write,
}

impl<T> ErrorType for Loopback<T> {
    type Error = BusFault;
}

impl<T: Target> I2c for Loopback<T> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let target = self
            .targets
            .iter_mut()
            .find(|(bound, _)| *bound == address)
            .map(|(_, target)| target)
            .ok_or(BusFault::NoAcknowledge)?;

        let mut direction = None;
        for operation in operations.iter_mut() {
            let next = match operation {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };
            // Adjacent operations of one direction continue a single
            // transfer; a direction change puts a repeated start on the
            // wire, which targets observe like a stop.
            if direction.is_some() && direction != Some(next) {
                target.on_transaction_finished();
            }
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        target.on_byte_received(byte);
                    }
                }
                Operation::Read(buffer) => {
                    for slot in buffer.iter_mut() {
                        *slot = target.on_byte_requested();
                    }
                }
            }
            direction = Some(next);
        }
        target.on_transaction_finished();
        Ok(())
    }
}
