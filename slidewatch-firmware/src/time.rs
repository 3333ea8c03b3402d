//! Link clock backed by the embassy time driver

use embassy_time::Instant;
use slidewatch_hal::Clock;

/// Milliseconds since boot
#[derive(Clone, Copy, Default)]
pub struct UptimeClock;

impl Clock for UptimeClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
