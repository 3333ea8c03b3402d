//! Reading records
//!
//! A record is one node's sensor snapshot. Each record type fixes its
//! field list; field order here is field order on the wire and must not
//! change without changing the tags used on the link.
//!
//! Wire layouts:
//! ```text
//! SensorReading   m1,m2,rain,humidity,temperature,displacement,vibration,alert
//! GatewayReading  rain,humidity,temperature
//! RelayReading    <SensorReading fields>,<GatewayReading fields>
//! ```

use crate::fields::{FieldWriter, Fields};
use crate::frame::FrameError;

/// A flat record with a fixed field order
pub trait Record: Sized + Default {
    /// Number of fields on the wire
    const FIELD_COUNT: usize;

    /// Append this record's fields in wire order
    fn write_fields<const N: usize>(&self, out: &mut FieldWriter<'_, N>) -> Result<(), FrameError>;

    /// Read this record's fields starting at token `offset`
    ///
    /// Missing or unparseable tokens become zero.
    fn read_fields(fields: &Fields<'_>, offset: usize) -> Self;
}

/// Snapshot from the sensor node at the landslide site
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorReading {
    /// Capacitive soil moisture (%)
    pub soil_m1: u8,
    /// Resistive soil moisture (%)
    pub soil_m2: u8,
    /// Rain gauge (%)
    pub rain: u8,
    /// Relative humidity (%)
    pub humidity: u8,
    /// Air temperature (°C)
    pub temperature: i8,
    /// Ground acceleration magnitude (m/s²)
    pub displacement: f32,
    /// Vibration switch tripped
    pub vibration: bool,
    /// Alert raised by the classifier
    pub alert: bool,
}

impl Record for SensorReading {
    const FIELD_COUNT: usize = 8;

    fn write_fields<const N: usize>(&self, out: &mut FieldWriter<'_, N>) -> Result<(), FrameError> {
        out.int(self.soil_m1)?;
        out.int(self.soil_m2)?;
        out.int(self.rain)?;
        out.int(self.humidity)?;
        out.int(self.temperature)?;
        out.float(self.displacement)?;
        out.flag(self.vibration)?;
        out.flag(self.alert)
    }

    fn read_fields(fields: &Fields<'_>, offset: usize) -> Self {
        Self {
            soil_m1: fields.u8_or_zero(offset),
            soil_m2: fields.u8_or_zero(offset + 1),
            rain: fields.u8_or_zero(offset + 2),
            humidity: fields.u8_or_zero(offset + 3),
            temperature: fields.i8_or_zero(offset + 4),
            displacement: fields.float(offset + 5).unwrap_or(0.0),
            vibration: fields.flag(offset + 6).unwrap_or(false),
            alert: fields.flag(offset + 7).unwrap_or(false),
        }
    }
}

/// Local snapshot taken at the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GatewayReading {
    /// Rain gauge (%)
    pub rain: u8,
    /// Relative humidity (%)
    pub humidity: u8,
    /// Air temperature (°C)
    pub temperature: i8,
}

impl Record for GatewayReading {
    const FIELD_COUNT: usize = 3;

    fn write_fields<const N: usize>(&self, out: &mut FieldWriter<'_, N>) -> Result<(), FrameError> {
        out.int(self.rain)?;
        out.int(self.humidity)?;
        out.int(self.temperature)
    }

    fn read_fields(fields: &Fields<'_>, offset: usize) -> Self {
        Self {
            rain: fields.u8_or_zero(offset),
            humidity: fields.u8_or_zero(offset + 1),
            temperature: fields.i8_or_zero(offset + 2),
        }
    }
}

/// Sensor snapshot forwarded by the gateway with its own readings appended
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayReading {
    /// Upstream sensor node fields
    pub sensor: SensorReading,
    /// Gateway's local fields
    pub gateway: GatewayReading,
}

impl Record for RelayReading {
    const FIELD_COUNT: usize = SensorReading::FIELD_COUNT + GatewayReading::FIELD_COUNT;

    fn write_fields<const N: usize>(&self, out: &mut FieldWriter<'_, N>) -> Result<(), FrameError> {
        self.sensor.write_fields(out)?;
        self.gateway.write_fields(out)
    }

    fn read_fields(fields: &Fields<'_>, offset: usize) -> Self {
        Self {
            sensor: SensorReading::read_fields(fields, offset),
            gateway: GatewayReading::read_fields(fields, offset + SensorReading::FIELD_COUNT),
        }
    }
}
