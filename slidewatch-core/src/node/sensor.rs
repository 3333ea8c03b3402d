//! Sensor node cycle
//!
//! Samples and redraws on the update interval, transmits the latest
//! classified reading on the send interval. Both intervals run off the
//! link's clock.

use embedded_hal::delay::DelayNs;
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::SensorReading;

use super::CycleReport;
use crate::alert::{AlertLevel, AlertThresholds};
use crate::config::NodeConfig;
use crate::link::LinkDriver;
use crate::traits::{DiagnosticSink, ReadingDisplay, SensorSource};

/// Sensor node state
#[derive(Debug, Clone)]
pub struct SensorNode {
    update_interval_ms: u32,
    send_interval_ms: u32,
    thresholds: AlertThresholds,
    reading: SensorReading,
    last_update_ms: Option<u64>,
    last_send_ms: Option<u64>,
}

impl SensorNode {
    /// Create a sensor node; the first cycle samples immediately
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            update_interval_ms: config.update_interval_ms,
            send_interval_ms: config.send_interval_ms,
            thresholds: config.thresholds,
            reading: SensorReading::default(),
            last_update_ms: None,
            last_send_ms: None,
        }
    }

    /// Latest reading, alert flag included
    pub fn reading(&self) -> &SensorReading {
        &self.reading
    }

    /// Alert level of the latest reading
    pub fn alert_level(&self) -> AlertLevel {
        AlertLevel::from(self.reading.alert)
    }

    /// Run whatever is due
    ///
    /// The first call samples right away; the first transmission follows
    /// one send interval later.
    pub fn cycle<S, C, D, K, Src, Disp>(
        &mut self,
        link: &mut LinkDriver<S, C, D, K>,
        sensors: &mut Src,
        display: &mut Disp,
    ) -> CycleReport
    where
        S: SerialChannel,
        C: Clock,
        D: DelayNs,
        K: DiagnosticSink,
        Src: SensorSource,
        Disp: ReadingDisplay,
    {
        let mut report = CycleReport::default();
        let now = link.now_ms();

        if due(self.last_update_ms, now, self.update_interval_ms) {
            self.update(sensors);
            report.sampled = true;
            report.display_result(display.show_sensor(&self.reading));
            self.last_update_ms = Some(now);
        }

        match self.last_send_ms {
            None => self.last_send_ms = Some(now),
            Some(last) if now.saturating_sub(last) >= u64::from(self.send_interval_ms) => {
                match link.transmit(&self.reading) {
                    Ok(()) => report.transmitted = true,
                    Err(e) => report.link_failed(e),
                }
                self.last_send_ms = Some(now);
            }
            Some(_) => {}
        }

        report
    }

    /// Take a sample and reclassify
    pub fn update<Src: SensorSource>(&mut self, sensors: &mut Src) {
        sensors.sample().apply(&mut self.reading);
        self.reading.alert = self.thresholds.classify(&self.reading).is_alert();
    }
}

fn due(last: Option<u64>, now: u64, interval_ms: u32) -> bool {
    match last {
        None => true,
        Some(last) => now.saturating_sub(last) >= u64::from(interval_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;
    use crate::sample::SensorSample;
    use crate::testing::{FixedSensors, MockRadio, RecordingDisplay, Shown, VirtualTime};
    use crate::traits::NullSink;

    fn alarming() -> SensorSample {
        SensorSample {
            soil_m1: Some(80),
            soil_m2: Some(75),
            rain: Some(90),
            humidity: Some(95),
            temperature: Some(18),
            displacement: Some(2.5),
            vibration: Some(true),
        }
    }

    #[test]
    fn test_update_classifies() {
        let mut node = SensorNode::new(&NodeConfig::for_role(Role::Sensor));
        node.update(&mut FixedSensors(alarming()));
        assert!(node.reading().alert);
        assert_eq!(node.alert_level(), AlertLevel::Alert);

        node.update(&mut FixedSensors(SensorSample {
            vibration: Some(false),
            ..Default::default()
        }));
        assert!(!node.reading().alert);
        // Fields missing from the sample keep their values
        assert_eq!(node.reading().soil_m1, 80);
    }

    #[test]
    fn test_intervals() {
        let time = VirtualTime::new();
        let config = NodeConfig::for_role(Role::Sensor);
        let mut link = LinkDriver::new(
            MockRadio::wio_e5(&time),
            time.clock(),
            time.delay(),
            NullSink,
            config.link,
        );
        link.configure().unwrap();
        let mut node = SensorNode::new(&config);
        let mut sensors = FixedSensors(alarming());
        let mut display = RecordingDisplay::default();

        let report = node.cycle(&mut link, &mut sensors, &mut display);
        assert!(report.sampled);
        assert!(!report.transmitted);

        // Nothing is due yet
        time.advance_ms(1_000);
        let report = node.cycle(&mut link, &mut sensors, &mut display);
        assert!(!report.sampled);
        assert!(report.is_idle());

        time.advance_ms(4_000);
        let report = node.cycle(&mut link, &mut sensors, &mut display);
        assert!(report.sampled);
        assert!(!report.transmitted);

        time.advance_ms(15_000);
        let report = node.cycle(&mut link, &mut sensors, &mut display);
        assert!(report.transmitted);
        assert_eq!(
            link.channel().serial().last_transmit_text(),
            Some("GW,80,75,90,95,18,2.50,1,1")
        );
        assert!(matches!(display.last(), Some(Shown::Sensor(r)) if r.alert));
    }

    #[test]
    fn test_display_failure_reported() {
        let time = VirtualTime::new();
        let config = NodeConfig::for_role(Role::Sensor);
        let mut link = LinkDriver::new(
            MockRadio::wio_e5(&time),
            time.clock(),
            time.delay(),
            NullSink,
            config.link,
        );
        let mut node = SensorNode::new(&config);
        let mut display = RecordingDisplay {
            fail: true,
            ..Default::default()
        };

        let report = node.cycle(&mut link, &mut FixedSensors(alarming()), &mut display);
        assert!(report.sampled);
        assert!(report.display_failed);
    }
}
