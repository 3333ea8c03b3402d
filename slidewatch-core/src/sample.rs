//! Partial sensor samples
//!
//! Sensors fail independently (a DHT22 read times out, the accelerometer
//! is absent). A sample carries only the values that were actually read;
//! applying it to a reading overwrites those and keeps the rest.

use slidewatch_protocol::{GatewayReading, SensorReading};

/// One acquisition pass at the sensor node
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    pub soil_m1: Option<u8>,
    pub soil_m2: Option<u8>,
    pub rain: Option<u8>,
    pub humidity: Option<u8>,
    pub temperature: Option<i8>,
    pub displacement: Option<f32>,
    pub vibration: Option<bool>,
}

impl SensorSample {
    /// Overwrite the fields of `reading` that this sample holds
    ///
    /// The `alert` flag is left alone; it belongs to the classifier.
    pub fn apply(&self, reading: &mut SensorReading) {
        if let Some(v) = self.soil_m1 {
            reading.soil_m1 = v;
        }
        if let Some(v) = self.soil_m2 {
            reading.soil_m2 = v;
        }
        if let Some(v) = self.rain {
            reading.rain = v;
        }
        if let Some(v) = self.humidity {
            reading.humidity = v;
        }
        if let Some(v) = self.temperature {
            reading.temperature = v;
        }
        if let Some(v) = self.displacement {
            reading.displacement = v;
        }
        if let Some(v) = self.vibration {
            reading.vibration = v;
        }
    }

    /// Check if no sensor produced a value
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One acquisition pass at the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatewaySample {
    pub rain: Option<u8>,
    pub humidity: Option<u8>,
    pub temperature: Option<i8>,
}

impl GatewaySample {
    /// Overwrite the fields of `reading` that this sample holds
    pub fn apply(&self, reading: &mut GatewayReading) {
        if let Some(v) = self.rain {
            reading.rain = v;
        }
        if let Some(v) = self.humidity {
            reading.humidity = v;
        }
        if let Some(v) = self.temperature {
            reading.temperature = v;
        }
    }
}
