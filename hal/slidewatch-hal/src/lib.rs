//! Slidewatch Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the radio link
//! needs, so the same link code runs on the RP2040 board and against the
//! scripted radio used in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  slidewatch-core (link driver, nodes)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  slidewatch-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  firmware     │       │  mock radio   │
//! │  (embassy-rp) │       │  (host tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::SerialChannel`] - Byte-oriented, half-duplex serial transport
//! - [`time::Clock`] - Monotonic millisecond clock
//!
//! Blocking delays use `embedded_hal::delay::DelayNs` directly.

#![no_std]
#![deny(unsafe_code)]

pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use time::Clock;
pub use uart::{IoSerial, SerialChannel, UartConfig};
