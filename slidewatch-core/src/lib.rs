//! Board-agnostic core logic for the Slidewatch nodes
//!
//! This crate contains everything between the serial port and the
//! sensors/display that does not depend on a specific board:
//!
//! - Response buffer and AT command channel
//! - Receive parser for role-tagged packets
//! - Link state machine and the link driver that owns the radio
//! - Configuration types and the embedded configuration parser
//! - Collaborator traits (sensors, display, diagnostics)
//! - Alert classifier and analog calibration
//! - Per-role node cycles (sensor, gateway, end node)

#![no_std]
#![deny(unsafe_code)]

pub mod alert;
pub mod buffer;
pub mod calibration;
pub mod config;
pub mod link;
pub mod node;
pub mod sample;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
