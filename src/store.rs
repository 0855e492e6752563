/// Number of addressable byte slots in the emulated memory.
pub const MEM_SIZE: usize = 256;

/// The 256 byte backing store together with its auto-incrementing cursor.
///
/// Every access through the cursor increments it modulo 256, so a long
/// transfer simply wraps back to slot 0 instead of running off the end.
/// Mutating access is `pub(crate)`: only the device state machine writes
/// the store, everything else observes it read-only.
#[derive(Clone, Debug)]
pub struct MemStore {
    bytes: [u8; MEM_SIZE],
    cursor: u8,
}

impl MemStore {
    /// Zero-filled store with the cursor at slot 0.
    pub const fn new() -> Self {
        Self::from_bytes([0x00; MEM_SIZE])
    }

    /// Store with predetermined contents, cursor at slot 0.
    pub const fn from_bytes(bytes: [u8; MEM_SIZE]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Move the cursor. Any `u8` is a valid slot address.
    pub(crate) fn seek(&mut self, address: u8) {
        self.cursor = address;
    }

    /// Store `value` at the cursor, then advance it.
    pub(crate) fn write_next(&mut self, value: u8) {
        self.bytes[usize::from(self.cursor)] = value;
        self.cursor = self.cursor.wrapping_add(1);
    }

    /// Serve the byte at the cursor, then advance it.
    pub(crate) fn read_next(&mut self) -> u8 {
        let value = self.bytes[usize::from(self.cursor)];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }

    /// Current cursor position.
    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    /// Contents of a single slot, without touching the cursor.
    pub fn get(&self, address: u8) -> u8 {
        self.bytes[usize::from(address)]
    }

    /// The whole memory, for inspection.
    pub fn as_bytes(&self) -> &[u8; MEM_SIZE] {
        &self.bytes
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}
