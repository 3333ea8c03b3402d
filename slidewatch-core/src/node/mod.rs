//! Per-role node cycles
//!
//! Each node keeps the readings it shows and sends between cycles. The
//! link driver, sensors and display are borrowed for the duration of one
//! cycle, so the caller decides cadence and owns the hardware.

pub mod end;
pub mod gateway;
pub mod sensor;

pub use end::EndNode;
pub use gateway::GatewayNode;
pub use sensor::SensorNode;

use crate::link::LinkError;

/// Outcome of one node cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Sensors were read and the display refreshed
    pub sampled: bool,
    /// A packet was received
    pub received: bool,
    /// A frame was transmitted and confirmed
    pub transmitted: bool,
    /// Radio work was skipped because the module is absent
    pub link_disabled: bool,
    /// Display backend reported an error
    pub display_failed: bool,
    /// Link error, if any
    pub error: Option<LinkError>,
}

impl CycleReport {
    /// Check if the cycle did any radio work or hit an error
    pub fn is_idle(&self) -> bool {
        !self.received && !self.transmitted && self.error.is_none()
    }

    fn link_failed(&mut self, e: LinkError) {
        if e == LinkError::Disabled {
            self.link_disabled = true;
        } else {
            self.error = Some(e);
        }
    }

    fn display_result<E>(&mut self, result: Result<(), E>) {
        if result.is_err() {
            self.display_failed = true;
        }
    }
}
