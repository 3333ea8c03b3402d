//! Diagnostic sink for link activity

use slidewatch_protocol::{FrameError, LinkQuality};

/// Typed link events reported to the diagnostic sink
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkNote {
    /// A command line was written to the module
    CommandSent(&'static str),
    /// A command's acknowledgement was not seen within its budget
    AckMissed(&'static str),
    /// The module did not answer the liveness probe; the link is disabled
    ModuleAbsent,
    /// Radio configuration finished
    Configured,
    /// A link operation was skipped because the link is disabled
    Skipped,
    /// A packet was received and decoded
    PacketReceived {
        /// Field tokens present in the payload
        fields: usize,
        /// Hex payload was cut short
        truncated: bool,
        /// Signal quality at the time of reception
        quality: LinkQuality,
    },
    /// A receive window elapsed without a packet
    ReceiveTimeout,
    /// A packet payload could not be decoded
    MalformedPayload(FrameError),
    /// The response buffer filled up and bytes were dropped
    BufferOverflow,
    /// Transmission confirmed by the module
    Sent,
    /// Transmission not confirmed
    SendFailed,
}

/// Observer for link activity
///
/// Both methods must return promptly; they are called from inside the
/// command and receive polling loops.
pub trait DiagnosticSink {
    /// Called with every chunk of bytes read from the module
    fn mirror(&mut self, _bytes: &[u8]) {}

    /// Called for each link event
    fn note(&mut self, _note: LinkNote) {}
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &mut T {
    fn mirror(&mut self, bytes: &[u8]) {
        (**self).mirror(bytes)
    }

    fn note(&mut self, note: LinkNote) {
        (**self).note(note)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {}
