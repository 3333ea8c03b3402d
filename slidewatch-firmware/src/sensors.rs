//! Board sensors
//!
//! Soil moisture probes and the rain gauge are analog; the vibration
//! switch is a digital input. The DHT22 and ADXL345 sit on their own
//! buses and are not sampled here, so humidity, temperature and
//! displacement keep whatever value the reading already holds.

use defmt::*;
use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::Input;

use slidewatch_core::calibration::{AnalogCalibration, CalibrationSet};
use slidewatch_core::sample::{GatewaySample, SensorSample};
use slidewatch_core::traits::{GatewaySource, SensorSource};

/// The calibration points are 10-bit counts; the RP2040 ADC is 12-bit
const ADC_SHIFT: u16 = 2;

/// Analog inputs shared by both node types
pub struct AnalogInputs {
    pub adc: Adc<'static, Blocking>,
    /// GPIO26 / ADC0
    pub soil_m1: Channel<'static>,
    /// GPIO27 / ADC1
    pub soil_m2: Channel<'static>,
    /// GPIO28 / ADC2
    pub rain: Channel<'static>,
}

impl AnalogInputs {
    fn percent(&mut self, probe: Probe, calibration: AnalogCalibration) -> Option<u8> {
        let channel = match probe {
            Probe::SoilM1 => &mut self.soil_m1,
            Probe::SoilM2 => &mut self.soil_m2,
            Probe::Rain => &mut self.rain,
        };
        match self.adc.blocking_read(channel) {
            Ok(raw) => Some(calibration.percent(raw >> ADC_SHIFT)),
            Err(_) => {
                warn!("ADC read failed");
                None
            }
        }
    }
}

/// Which analog input to read
#[derive(Clone, Copy)]
enum Probe {
    SoilM1,
    SoilM2,
    Rain,
}

/// Sensor node inputs
pub struct SiteSensors {
    analog: AnalogInputs,
    vibration: Input<'static>,
    calibration: CalibrationSet,
}

impl SiteSensors {
    /// Take ownership of the analog inputs and the vibration switch
    pub fn new(analog: AnalogInputs, vibration: Input<'static>, calibration: CalibrationSet) -> Self {
        Self {
            analog,
            vibration,
            calibration,
        }
    }
}

impl SensorSource for SiteSensors {
    fn sample(&mut self) -> SensorSample {
        let sample = SensorSample {
            soil_m1: self.analog.percent(Probe::SoilM1, self.calibration.soil_m1),
            soil_m2: self.analog.percent(Probe::SoilM2, self.calibration.soil_m2),
            rain: self.analog.percent(Probe::Rain, self.calibration.rain),
            vibration: Some(self.vibration.is_high()),
            ..Default::default()
        };
        debug!("Sample: {}", sample);
        sample
    }
}

/// Gateway inputs
pub struct GatewaySensors {
    analog: AnalogInputs,
    calibration: CalibrationSet,
}

impl GatewaySensors {
    /// Take ownership of the analog inputs; only the rain gauge is read
    pub fn new(analog: AnalogInputs, calibration: CalibrationSet) -> Self {
        Self { analog, calibration }
    }
}

impl GatewaySource for GatewaySensors {
    fn sample(&mut self) -> GatewaySample {
        GatewaySample {
            rain: self.analog.percent(Probe::Rain, self.calibration.rain),
            ..Default::default()
        }
    }
}
