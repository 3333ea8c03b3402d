//! Analog sensor calibration
//!
//! Soil moisture probes and the rain gauge are read as raw ADC counts and
//! mapped linearly between two calibration points to 0-100 %. Probes
//! differ in orientation: the capacitive probe reads lower when wet, the
//! rain gauge higher.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Two-point linear calibration for an analog sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalogCalibration {
    /// Raw count at 0 % (dry air / no rain)
    pub raw_dry: u16,
    /// Raw count at 100 % (in water / full gauge)
    pub raw_wet: u16,
}

impl AnalogCalibration {
    /// Capacitive soil moisture probe
    pub const CAPACITIVE_SOIL: Self = Self {
        raw_dry: 877,
        raw_wet: 480,
    };

    /// Resistive soil moisture probe
    pub const RESISTIVE_SOIL: Self = Self {
        raw_dry: 1023,
        raw_wet: 336,
    };

    /// Tipping bucket rain gauge (potentiometer)
    pub const RAIN_GAUGE: Self = Self {
        raw_dry: 21,
        raw_wet: 1024,
    };

    /// Map a raw count to percent, clamped to 0-100
    ///
    /// A degenerate calibration (both points equal) reads 0 %.
    pub fn percent(&self, raw: u16) -> u8 {
        let dry = i32::from(self.raw_dry);
        let wet = i32::from(self.raw_wet);
        if dry == wet {
            return 0;
        }
        let pct = (i32::from(raw) - dry) * 100 / (wet - dry);
        pct.clamp(0, 100) as u8
    }
}

/// Calibrations for every analog input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationSet {
    pub soil_m1: AnalogCalibration,
    pub soil_m2: AnalogCalibration,
    pub rain: AnalogCalibration,
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self {
            soil_m1: AnalogCalibration::CAPACITIVE_SOIL,
            soil_m2: AnalogCalibration::RESISTIVE_SOIL,
            rain: AnalogCalibration::RAIN_GAUGE,
        }
    }
}
