//! Landslide alert classifier
//!
//! A reading raises an alert only when the ground is saturated (both soil
//! probes, rain and humidity above their thresholds, temperature below
//! its threshold) and the slope is moving (displacement above threshold
//! and, if required, the vibration switch tripped). Anything else is
//! normal.

use slidewatch_protocol::SensorReading;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlertLevel {
    #[default]
    Normal,
    Alert,
}

impl AlertLevel {
    /// Check if this level is an alert
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertLevel::Alert)
    }

    /// Short status text for displays
    pub fn label(&self) -> &'static str {
        match self {
            AlertLevel::Normal => "OK",
            AlertLevel::Alert => "Alert!",
        }
    }
}

impl From<bool> for AlertLevel {
    fn from(alert: bool) -> Self {
        if alert {
            AlertLevel::Alert
        } else {
            AlertLevel::Normal
        }
    }
}

/// Alert thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertThresholds {
    /// Soil moisture, both probes (%)
    pub soil_moisture: u8,
    /// Rain gauge (%)
    pub rain: u8,
    /// Relative humidity (%)
    pub humidity: u8,
    /// Air temperature ceiling (°C)
    pub temperature: i8,
    /// Displacement (m/s²)
    pub displacement: f32,
    /// Vibration switch must be tripped
    pub require_vibration: bool,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            soil_moisture: 60,
            rain: 50,
            humidity: 60,
            temperature: 25,
            displacement: 1.0,
            require_vibration: true,
        }
    }
}

impl AlertThresholds {
    /// Classify a reading
    pub fn classify(&self, reading: &SensorReading) -> AlertLevel {
        let saturated = reading.soil_m1 > self.soil_moisture
            && reading.soil_m2 > self.soil_moisture
            && reading.rain > self.rain
            && reading.humidity > self.humidity
            && reading.temperature < self.temperature;
        let moving = reading.displacement > self.displacement
            && (reading.vibration || !self.require_vibration);

        AlertLevel::from(saturated && moving)
    }
}
