//! Sensor acquisition traits

use crate::sample::{GatewaySample, SensorSample};

/// Sensors at the landslide site
///
/// Implementations read every sensor once and report what succeeded.
/// Calibration to percent happens inside the implementation.
pub trait SensorSource {
    /// Take one sample
    fn sample(&mut self) -> SensorSample;
}

/// Sensors local to the gateway
pub trait GatewaySource {
    /// Take one sample
    fn sample(&mut self) -> GatewaySample;
}
