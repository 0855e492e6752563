//! Controller-side exchange driver.
//!
//! [`Exchange`] exercises the full write/seek/partial-read contract of the
//! memory device over any [`embedded_hal::i2c::I2c`] implementation. It is a
//! diagnostic driver: every fault is surfaced immediately and nothing is
//! retried, so a wiring or protocol problem stops the run at the first
//! operation that trips over it.

use crate::error::{Error, ErrorKind};
use crate::store::MEM_SIZE;
use core::convert::Infallible;
use core::fmt::Write as _;
use core::slice::from_ref;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as I2cError, ErrorKind as I2cErrorKind, I2c, SevenBitAddress};
use heapless::{String, Vec};

// One slot address byte ahead of the payload.
const WRITE_BUFFER: usize = MEM_SIZE + 1;
// Bytes served by the first half of the demo round's split read.
const SPLIT: usize = 5;
// Pause between demo rounds.
const PACE_MS: u32 = 2_000;
// Slot address step between demo rounds.
const ADDRESS_STEP: u8 = 32;

fn write_fault<E: I2cError>(err: E) -> Error {
    match err.kind() {
        I2cErrorKind::NoAcknowledge(_) => ErrorKind::CommFail.into(),
        _ => ErrorKind::TxFail.into(),
    }
}

fn read_fault<E: I2cError>(err: E) -> Error {
    match err.kind() {
        I2cErrorKind::NoAcknowledge(_) => ErrorKind::CommFail.into(),
        _ => ErrorKind::RxFail.into(),
    }
}

/// Drives a remote memory device at a fixed 7-bit address.
pub struct Exchange<PHY> {
    phy: PHY,
    address: SevenBitAddress,
}

impl<PHY> Exchange<PHY> {
    pub fn new(phy: PHY, address: SevenBitAddress) -> Self {
        Self { phy, address }
    }

    /// Give the bus back.
    pub fn free(self) -> PHY {
        self.phy
    }
}

impl<PHY> Exchange<PHY>
where
    PHY: I2c,
{
    /// Write `payload` into the device memory starting at `mem_address`,
    /// as a single transaction of `1 + payload.len()` bytes.
    pub fn write_at(&mut self, mem_address: u8, payload: &[u8]) -> Result<(), Error> {
        let mut buffer: Vec<u8, WRITE_BUFFER> = Vec::new();
        buffer
            .push(mem_address)
            .map_err(|_| ErrorKind::InvalidSize)?;
        buffer
            .extend_from_slice(payload)
            .map_err(|_| ErrorKind::InvalidSize)?;
        debug!("write {} bytes at {:#04x}", payload.len(), mem_address);
        self.phy.write(self.address, &buffer).map_err(write_fault)
    }

    /// Seek to `mem_address` and fill `buffer` from there. The seek and the
    /// read are joined by a repeated start, so no other controller traffic
    /// can slip in between and move the cursor.
    pub fn read_at(&mut self, mem_address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        debug!("read {} bytes at {:#04x}", buffer.len(), mem_address);
        self.phy
            .write_read(self.address, from_ref(&mem_address), buffer)
            .map_err(read_fault)
    }

    /// Fill `buffer` from wherever the device cursor currently points.
    pub fn read_next(&mut self, buffer: &mut [u8]) -> Result<(), Error> {
        debug!("read {} bytes from the cursor", buffer.len());
        self.phy.read(self.address, buffer).map_err(read_fault)
    }

    /// Write `payload` at `mem_address`, seek back, read it in two parts of
    /// `split` and `payload.len() - split` bytes, and verify the round-trip
    /// byte for byte.
    ///
    /// The second part is issued as its own transaction, which proves that
    /// the device cursor survives the stop condition in between.
    pub fn roundtrip(&mut self, mem_address: u8, payload: &[u8], split: usize) -> Result<(), Error> {
        if split > payload.len() {
            return Err(ErrorKind::BadParam.into());
        }
        if payload.len() > MEM_SIZE {
            return Err(ErrorKind::InvalidSize.into());
        }
        self.write_at(mem_address, payload)?;

        let mut readback: Vec<u8, MEM_SIZE> = Vec::new();
        readback
            .resize(payload.len(), 0x00)
            .map_err(|()| ErrorKind::InvalidSize)?;
        let (head, tail) = readback.split_at_mut(split);
        self.read_at(mem_address, head)?;
        self.read_next(tail)?;

        if readback.as_slice() != payload {
            error!("read-back at {:#04x} differs from the payload", mem_address);
            return Err(ErrorKind::DataMismatch.into());
        }
        Ok(())
    }

    /// One demo round: write a greeting at `mem_address` and read it back
    /// in two parts.
    pub fn round(&mut self, mem_address: u8) -> Result<(), Error> {
        let mut message: String<32> = String::new();
        write!(message, "Hello, I2C target! - {:#04x}", mem_address)
            .map_err(|_| ErrorKind::InvalidSize)?;
        info!("exchange at {:#04x}: '{}'", mem_address, message.as_str());
        self.roundtrip(mem_address, message.as_bytes(), SPLIT)
    }

    /// Run demo rounds indefinitely, advancing the slot address by 32 each
    /// time and wrapping with the 256 byte address space. Returns only on
    /// the first failed round.
    pub fn run<D>(&mut self, delay: &mut D) -> Result<Infallible, Error>
    where
        D: DelayNs,
    {
        let mut mem_address = 0u8;
        loop {
            self.round(mem_address)?;
            delay.delay_ms(PACE_MS);
            mem_address = mem_address.wrapping_add(ADDRESS_STEP);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MemDevice, Target};
    use crate::loopback::Loopback;
    use crate::DEFAULT_DEVICE_ADDRESS;

    fn exchange() -> Exchange<Loopback<MemDevice>> {
        let mut bus = Loopback::new();
        bus.bind(DEFAULT_DEVICE_ADDRESS, MemDevice::new()).unwrap();
        Exchange::new(bus, DEFAULT_DEVICE_ADDRESS)
    }

    fn store<'a>(exchange: &'a Exchange<Loopback<MemDevice>>) -> &'a crate::store::MemStore {
        exchange.phy.target(DEFAULT_DEVICE_ADDRESS).unwrap().store()
    }

    #[test]
    fn write_seek_and_split_read() {
        let mut exchange = exchange();
        exchange.write_at(0x00, b"HI").unwrap();

        let mut head = [0x00; 1];
        let mut tail = [0x00; 1];
        exchange.read_at(0x00, &mut head).unwrap();
        exchange.read_next(&mut tail).unwrap();

        assert_eq!(&head, b"H");
        assert_eq!(&tail, b"I");
        assert_eq!(store(&exchange).cursor(), 2);
    }

    #[test]
    fn any_split_point_reads_back_the_payload() {
        let payload = b"Hello, I2C target! - 0x20";
        for split in 0..=payload.len() {
            let mut exchange = exchange();
            exchange.roundtrip(0x20, payload, split).unwrap();
        }
    }

    #[test]
    fn roundtrip_wraps_around_the_address_space() {
        let mut exchange = exchange();
        exchange.roundtrip(250, b"0123456789", SPLIT).unwrap();

        let store = store(&exchange);
        assert_eq!(store.get(255), b'5');
        assert_eq!(store.get(0), b'6');
        assert_eq!(store.get(3), b'9');
    }

    #[test]
    fn demo_round_succeeds_against_the_device() {
        let mut exchange = exchange();
        exchange.round(0x40).unwrap();
        assert_eq!(store(&exchange).get(0x40), b'H');
    }

    #[test]
    fn mismatch_is_fatal() {
        // Answers every request with a constant instead of the memory.
        struct Stuck;

        impl Target for Stuck {
            fn on_byte_received(&mut self, _value: u8) {}

            fn on_byte_requested(&mut self) -> u8 {
                0xee
            }

            fn on_transaction_finished(&mut self) {}
        }

        let mut bus = Loopback::new();
        bus.bind(DEFAULT_DEVICE_ADDRESS, Stuck).unwrap();
        let mut exchange = Exchange::new(bus, DEFAULT_DEVICE_ADDRESS);

        let err = exchange.roundtrip(0x00, b"HI", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataMismatch);
    }

    #[test]
    fn absent_device_is_a_comm_failure() {
        let bus: Loopback<MemDevice> = Loopback::new();
        let mut exchange = Exchange::new(bus, DEFAULT_DEVICE_ADDRESS);
        let err = exchange.write_at(0x00, b"HI").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommFail);
    }

    #[test]
    fn split_past_the_payload_is_rejected() {
        let mut exchange = exchange();
        let err = exchange.roundtrip(0x00, b"HI", 3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadParam);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut exchange = exchange();
        let payload = [0x00; MEM_SIZE + 1];
        let err = exchange.write_at(0x00, &payload).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSize);
    }
}
