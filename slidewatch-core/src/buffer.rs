//! Bounded response buffer
//!
//! Accumulates bytes read from the radio until the owner clears it.
//! Bytes past capacity are dropped and the buffer remembers that it
//! overflowed.

use heapless::Vec;
use slidewatch_protocol::response;

/// Default capacity, large enough for a full relay packet plus the
/// signal quality line and a command echo
pub const RESPONSE_BUFFER_LEN: usize = 512;

/// Fixed-capacity byte accumulator
#[derive(Debug, Clone)]
pub struct ResponseBuffer<const N: usize = RESPONSE_BUFFER_LEN> {
    data: Vec<u8, N>,
    overflowed: bool,
}

impl<const N: usize> Default for ResponseBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ResponseBuffer<N> {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            overflowed: false,
        }
    }

    /// Append one byte
    ///
    /// Returns false if the buffer was full and the byte was dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.data.push(byte).is_err() {
            self.overflowed = true;
            return false;
        }
        true
    }

    /// Append bytes up to capacity, returning how many were kept
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().take_while(|&&b| self.push(b)).count()
    }

    /// Accumulated bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of accumulated bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been accumulated
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check if no more bytes fit
    pub fn is_full(&self) -> bool {
        self.data.is_full()
    }

    /// Capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check whether bytes were dropped since the last clear
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Check whether the accumulated bytes contain `needle`
    pub fn contains(&self, needle: &[u8]) -> bool {
        response::contains(&self.data, needle)
    }

    /// Drop the first `count` bytes, keeping the rest in order
    pub fn discard_front(&mut self, count: usize) {
        let len = self.data.len();
        let count = count.min(len);
        self.data.copy_within(count..len, 0);
        self.data.truncate(len - count);
    }

    /// Discard everything and reset the overflow flag
    pub fn clear(&mut self) {
        self.data.clear();
        self.overflowed = false;
    }
}
