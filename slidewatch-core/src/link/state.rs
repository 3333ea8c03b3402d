//! Link state machine
//!
//! The link configures once, then alternates between idle and one radio
//! operation at a time. A failed liveness probe parks it in `Disabled`
//! for good.

/// Link states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Power-on, module not yet touched
    #[default]
    Unconfigured,
    /// Probing and configuring the module
    Configuring,
    /// Configured, no operation in progress
    Idle,
    /// Receive armed, waiting for a packet
    Receiving,
    /// Transmit issued, waiting for confirmation
    Transmitting,
    /// Module absent; no further commands are sent
    Disabled,
}

/// Events that drive link state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// Startup configuration begins
    Configure,
    /// Liveness probe answered
    ProbeAnswered,
    /// Liveness probe unanswered
    ProbeFailed,
    /// Receive mode armed
    ArmReceive,
    /// Receive window ended, with or without a packet
    ReceiveEnded,
    /// Transmit command issued
    Transmit,
    /// Transmit confirmed or timed out
    TransmitEnded,
}

impl LinkState {
    /// Check if radio operations may start from this state
    pub fn is_ready(&self) -> bool {
        matches!(self, LinkState::Idle)
    }

    /// Check if the link has been disabled
    pub fn is_disabled(&self) -> bool {
        matches!(self, LinkState::Disabled)
    }

    /// Check if a radio operation is in progress
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LinkState::Configuring | LinkState::Receiving | LinkState::Transmitting
        )
    }

    /// Process an event and return the next state
    pub fn transition(self, event: LinkEvent) -> Self {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (Unconfigured, Configure) => Configuring,

            (Configuring, ProbeAnswered) => Idle,
            (Configuring, ProbeFailed) => Disabled,

            (Idle, ArmReceive) => Receiving,
            (Idle, Transmit) => Transmitting,

            (Receiving, ReceiveEnded) => Idle,
            (Transmitting, TransmitEnded) => Idle,

            // Disabled is terminal; everything else ignores stray events
            _ => self,
        }
    }
}
