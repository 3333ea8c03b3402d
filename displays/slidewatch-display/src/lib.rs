//! Character display pages for Slidewatch nodes
//!
//! This crate provides:
//! - `DisplayBackend` trait for text-mode displays (OLED, TFT, log sink)
//! - `Screen`, an 8 × 21 character buffer with per-row highlights
//! - `PageRenderer`, which lays out every node page on a `Screen`
//! - `PageDisplay`, the `ReadingDisplay` implementation that ties the
//!   renderer to a backend
//!
//! # Pages
//!
//! - Sensor node: both soil probes, rain, humidity, temperature,
//!   vibration, displacement and alert status
//! - Gateway: its own rain, humidity and temperature, the last link
//!   quality and the upstream sensor's status
//! - End node: the relayed sensor fields, or the relayed gateway fields

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod pages;
pub mod screen;

#[cfg(test)]
mod testing;

pub use backend::{DisplayBackend, DisplayError};
pub use pages::{PageDisplay, PageRenderer};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
