//! Display trait for reading pages

use slidewatch_protocol::{GatewayReading, LinkQuality, RelayReading, SensorReading};

/// Which half of a relayed reading the end node shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayPage {
    /// Upstream sensor node fields
    #[default]
    Sensor,
    /// Gateway fields
    Gateway,
}

/// Push interface for rendering readings
///
/// Each method draws one complete page.
pub trait ReadingDisplay {
    /// Error type for the display backend
    type Error;

    /// Sensor node's own page
    fn show_sensor(&mut self, reading: &SensorReading) -> Result<(), Self::Error>;

    /// Gateway's own page
    ///
    /// `upstream_alert` is the alert flag of the last relayed sensor
    /// reading.
    fn show_gateway(
        &mut self,
        reading: &GatewayReading,
        quality: LinkQuality,
        upstream_alert: bool,
    ) -> Result<(), Self::Error>;

    /// End node page for a relayed reading
    fn show_relay(&mut self, relay: &RelayReading, page: RelayPage) -> Result<(), Self::Error>;
}
