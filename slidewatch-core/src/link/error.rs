//! Link error kinds

use slidewatch_protocol::FrameError;

/// Errors surfaced by link operations
///
/// None of these are fatal to the node; the caller logs them and moves
/// on to its next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Module did not answer the liveness probe
    LinkAbsent,
    /// Link was disabled by an earlier failed probe
    Disabled,
    /// Expected acknowledgement not seen within budget
    AckTimeout,
    /// Packet payload could not be encoded or decoded
    MalformedPayload(FrameError),
    /// Underlying serial transport failed
    Channel,
    /// Operation attempted before configuration
    NotConfigured,
}

impl From<FrameError> for LinkError {
    fn from(e: FrameError) -> Self {
        LinkError::MalformedPayload(e)
    }
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::LinkAbsent => f.write_str("radio module not detected"),
            LinkError::Disabled => f.write_str("link disabled"),
            LinkError::AckTimeout => f.write_str("acknowledgement timeout"),
            LinkError::MalformedPayload(e) => write!(f, "malformed payload: {:?}", e),
            LinkError::Channel => f.write_str("serial channel error"),
            LinkError::NotConfigured => f.write_str("link not configured"),
        }
    }
}
