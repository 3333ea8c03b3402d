//! AT command channel
//!
//! Writes a command line, waits a fixed settle time, then polls the
//! module's output into the response buffer until the expected
//! acknowledgement shows up or the timeout elapses. Every byte read is
//! mirrored to the diagnostic sink.

use embedded_hal::delay::DelayNs;
use heapless::Vec;
use slidewatch_hal::{Clock, SerialChannel};

use super::error::LinkError;
use crate::buffer::ResponseBuffer;
use crate::traits::{DiagnosticSink, LinkNote};

/// Bytes handed to the sink per `mirror` call
const MIRROR_CHUNK: usize = 32;

/// Channel polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelTiming {
    /// Delay after every write before reading (ms)
    pub settle_ms: u32,
    /// Delay between polls of the serial port (ms)
    pub poll_ms: u32,
}

impl Default for ChannelTiming {
    fn default() -> Self {
        Self {
            settle_ms: 200,
            poll_ms: 2,
        }
    }
}

/// Request/response driver over a serial channel
///
/// Owns the serial port, the time sources and the response buffer.
pub struct CommandChannel<S, C, D> {
    serial: S,
    clock: C,
    delay: D,
    timing: ChannelTiming,
    buffer: ResponseBuffer,
}

impl<S, C, D> CommandChannel<S, C, D>
where
    S: SerialChannel,
    C: Clock,
    D: DelayNs,
{
    /// Create a channel with an empty response buffer
    pub fn new(serial: S, clock: C, delay: D, timing: ChannelTiming) -> Self {
        Self {
            serial,
            clock,
            delay,
            timing,
            buffer: ResponseBuffer::new(),
        }
    }

    /// Send a command and wait for its acknowledgement
    ///
    /// The buffer is cleared before writing. With `ack` of `None` this
    /// returns `Ok(true)` right after the settle delay. Otherwise it
    /// returns whether `ack` was seen within `timeout_ms`, measured from
    /// the end of the settle delay; the wait overshoots by at most one
    /// poll delay.
    pub fn send_and_await<K: DiagnosticSink>(
        &mut self,
        command: &[u8],
        ack: Option<&[u8]>,
        timeout_ms: u32,
        sink: &mut K,
    ) -> Result<bool, LinkError> {
        self.buffer.clear();
        self.serial.write(command).map_err(|_| LinkError::Channel)?;
        self.delay.delay_ms(self.timing.settle_ms);

        let Some(ack) = ack else {
            return Ok(true);
        };

        let start = self.clock.now_ms();
        loop {
            self.drain(sink)?;
            if self.buffer.contains(ack) {
                return Ok(true);
            }
            if self.clock.elapsed_since(start) >= u64::from(timeout_ms) {
                return Ok(false);
            }
            self.delay.delay_ms(self.timing.poll_ms);
        }
    }

    /// Move every available byte into the response buffer
    ///
    /// Returns the number of bytes read, including any dropped because
    /// the buffer was full.
    pub fn drain<K: DiagnosticSink>(&mut self, sink: &mut K) -> Result<usize, LinkError> {
        let was_overflowed = self.buffer.overflowed();
        let mut chunk: Vec<u8, MIRROR_CHUNK> = Vec::new();
        let mut total = 0;

        while self.serial.available().map_err(|_| LinkError::Channel)? > 0 {
            let byte = self.serial.read_byte().map_err(|_| LinkError::Channel)?;
            self.buffer.push(byte);
            total += 1;

            if chunk.push(byte).is_err() {
                sink.mirror(&chunk);
                chunk.clear();
                let _ = chunk.push(byte);
            }
        }
        if !chunk.is_empty() {
            sink.mirror(&chunk);
        }

        if !was_overflowed && self.buffer.overflowed() {
            sink.note(LinkNote::BufferOverflow);
        }
        Ok(total)
    }

    /// Accumulated response bytes
    pub fn buffer(&self) -> &ResponseBuffer {
        &self.buffer
    }

    /// Discard accumulated response bytes
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Discard response bytes before `offset`
    pub fn discard_before(&mut self, offset: usize) {
        self.buffer.discard_front(offset);
    }

    /// Current time (ms)
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Milliseconds elapsed since `start`
    pub fn elapsed_since(&self, start: u64) -> u64 {
        self.clock.elapsed_since(start)
    }

    /// Block for `ms` milliseconds
    pub fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Block for one poll interval
    pub fn poll_delay(&mut self) {
        self.delay.delay_ms(self.timing.poll_ms);
    }

    /// Polling parameters
    pub fn timing(&self) -> ChannelTiming {
        self.timing
    }

    /// Borrow the serial port
    pub fn serial(&self) -> &S {
        &self.serial
    }

    /// Mutably borrow the serial port
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Release the owned resources
    pub fn release(self) -> (S, C, D) {
        (self.serial, self.clock, self.delay)
    }
}
