//! The emulated memory device.
//!
//! [`MemDevice`] answers bus events the way the classic serial-RAM parts do:
//! the first byte of a write transaction selects a slot, further bytes are
//! stored with the cursor auto-incrementing, and reads are served
//! sequentially from wherever the cursor currently points. The cursor
//! survives stop conditions, so a controller can seek once and then collect
//! the data across as many partial reads as it likes.

use crate::store::MemStore;

/// Bus events delivered by the transport.
///
/// On most platforms these originate in the I2C peripheral's interrupt
/// handler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The controller wrote a byte.
    ByteReceived(u8),
    /// The controller is requesting a byte.
    ByteRequested,
    /// The controller issued a stop or repeated start.
    Finished,
}

/// Target-side transport contract.
///
/// The platform calls into whatever is bound at a given bus address. Handlers
/// run in the transport's event-delivery context, which may be an interrupt
/// handler, and must return quickly without blocking or allocating.
pub trait Target {
    fn on_byte_received(&mut self, value: u8);
    fn on_byte_requested(&mut self) -> u8;
    fn on_transaction_finished(&mut self);
}

/// Whether the current write transaction has supplied its slot address yet.
///
/// Exactly one address byte opens each write transaction, so a two-state
/// latch is all the protocol needs; there is nothing left to count.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    AwaitingAddress,
    Streaming,
}

/// A 256 byte memory behind an I2C target address.
#[derive(Clone, Debug)]
pub struct MemDevice {
    store: MemStore,
    state: State,
}

impl MemDevice {
    /// Zero-filled memory.
    pub const fn new() -> Self {
        Self::from_store(MemStore::new())
    }

    /// Memory with predetermined contents.
    pub const fn from_store(store: MemStore) -> Self {
        Self {
            store,
            state: State::AwaitingAddress,
        }
    }

    /// Read-only view of the memory and its cursor.
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// True between the address byte of a write transaction and the next
    /// stop or repeated start.
    pub fn address_latched(&self) -> bool {
        self.state == State::Streaming
    }

    /// Answer one bus event. Returns the byte to put on the wire for
    /// [`Event::ByteRequested`], `None` otherwise.
    ///
    /// Total over all events in all states: malformed transaction shapes
    /// (such as a read with no address ever written) are served from the
    /// current cursor rather than rejected. Allocation-free and lock-free,
    /// safe to call from an interrupt handler.
    pub fn handle(&mut self, event: Event) -> Option<u8> {
        match event {
            Event::ByteReceived(value) => {
                self.byte_received(value);
                None
            }
            Event::ByteRequested => Some(self.byte_requested()),
            Event::Finished => {
                self.finished();
                None
            }
        }
    }

    fn byte_received(&mut self, value: u8) {
        match self.state {
            // Writes always start with the slot address.
            State::AwaitingAddress => {
                self.store.seek(value);
                self.state = State::Streaming;
            }
            State::Streaming => self.store.write_next(value),
        }
    }

    fn byte_requested(&mut self) -> u8 {
        // Reads never latch an address; they continue from the cursor.
        self.store.read_next()
    }

    fn finished(&mut self) {
        // The cursor is deliberately left alone so a later read picks up
        // where the last transaction stopped.
        self.state = State::AwaitingAddress;
    }
}

impl Default for MemDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Target for MemDevice {
    fn on_byte_received(&mut self, value: u8) {
        self.byte_received(value);
    }

    fn on_byte_requested(&mut self) -> u8 {
        self.byte_requested()
    }

    fn on_transaction_finished(&mut self) {
        self.finished();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MEM_SIZE;

    fn counting_store() -> MemStore {
        let mut bytes = [0x00; MEM_SIZE];
        for (slot, value) in bytes.iter_mut().enumerate() {
            *value = slot as u8;
        }
        MemStore::from_bytes(bytes)
    }

    fn write_transaction(device: &mut MemDevice, address: u8, data: &[u8]) {
        device.handle(Event::ByteReceived(address));
        for &value in data {
            device.handle(Event::ByteReceived(value));
        }
        device.handle(Event::Finished);
    }

    #[test]
    fn serves_written_bytes_in_order() {
        let mut device = MemDevice::new();
        let data = [0x11, 0x22, 0x33, 0x44, 0x55];
        write_transaction(&mut device, 7, &data);

        // Seek back, then read without any further address byte.
        write_transaction(&mut device, 7, &[]);
        for (served, &expected) in data.iter().enumerate() {
            assert_eq!(device.handle(Event::ByteRequested), Some(expected));
            assert_eq!(device.store().cursor(), 7 + served as u8 + 1);
        }
    }

    #[test]
    fn write_wraps_around_the_address_space() {
        let mut device = MemDevice::new();
        let data = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        write_transaction(&mut device, 250, &data);

        for (offset, &value) in data.iter().enumerate() {
            assert_eq!(device.store().get(250u8.wrapping_add(offset as u8)), value);
        }
        assert_eq!(device.store().cursor(), 4);
    }

    #[test]
    fn finished_clears_the_latch_but_not_the_cursor() {
        let mut device = MemDevice::from_store(counting_store());
        write_transaction(&mut device, 5, &[0xff]);
        assert!(!device.address_latched());

        // One slot past the write, not slot 0.
        assert_eq!(device.handle(Event::ByteRequested), Some(6));
    }

    #[test]
    fn data_bytes_append_within_one_transaction() {
        let mut device = MemDevice::new();
        device.handle(Event::ByteReceived(10));
        assert!(device.address_latched());
        device.handle(Event::ByteReceived(b'A'));
        device.handle(Event::ByteReceived(b'B'));

        assert_eq!(device.store().get(10), b'A');
        assert_eq!(device.store().get(11), b'B');
        assert_eq!(device.store().cursor(), 12);
    }

    #[test]
    fn request_without_latched_address_serves_the_cursor() {
        let mut device = MemDevice::from_store(counting_store());
        assert_eq!(device.handle(Event::ByteRequested), Some(0));
        assert_eq!(device.handle(Event::ByteRequested), Some(1));
        device.handle(Event::Finished);
        // Still no address written; the read continues regardless.
        assert_eq!(device.handle(Event::ByteRequested), Some(2));
    }

    #[test]
    fn only_requests_produce_a_response_byte() {
        let mut device = MemDevice::new();
        assert_eq!(device.handle(Event::ByteReceived(0)), None);
        assert_eq!(device.handle(Event::ByteRequested), Some(0));
        assert_eq!(device.handle(Event::Finished), None);
    }
}
