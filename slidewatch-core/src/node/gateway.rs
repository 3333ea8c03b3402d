//! Gateway node cycle
//!
//! Samples its own sensors and redraws, then listens for a sensor node
//! reading and relays it to the end node with its own readings appended.

use embedded_hal::delay::DelayNs;
use slidewatch_hal::{Clock, SerialChannel};
use slidewatch_protocol::{GatewayReading, RelayReading, SensorReading};

use super::CycleReport;
use crate::config::NodeConfig;
use crate::link::LinkDriver;
use crate::traits::{DiagnosticSink, GatewaySource, ReadingDisplay};

/// Gateway node state
#[derive(Debug, Clone)]
pub struct GatewayNode {
    receive_window_ms: u32,
    relay_delay_ms: u32,
    own: GatewayReading,
    upstream: Option<SensorReading>,
}

impl GatewayNode {
    /// Create a gateway with zeroed readings and no upstream reading yet
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            receive_window_ms: config.receive_window_ms,
            relay_delay_ms: config.relay_delay_ms,
            own: GatewayReading::default(),
            upstream: None,
        }
    }

    /// Gateway's own latest reading
    pub fn reading(&self) -> &GatewayReading {
        &self.own
    }

    /// Last reading received from the sensor node
    pub fn upstream(&self) -> Option<&SensorReading> {
        self.upstream.as_ref()
    }

    /// Sample, redraw, then receive and relay one reading
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
        Src: GatewaySource,
        Disp: ReadingDisplay,
    {
        let mut report = CycleReport::default();

        sensors.sample().apply(&mut self.own);
        report.sampled = true;
        let upstream_alert = self.upstream.map(|r| r.alert).unwrap_or(false);
        report.display_result(display.show_gateway(&self.own, link.link_quality(), upstream_alert));

        let received = match link.receive::<SensorReading>(self.receive_window_ms) {
            Ok(received) => received,
            Err(e) => {
                report.link_failed(e);
                return report;
            }
        };
        link.pause(self.relay_delay_ms);

        let Some(received) = received else {
            return report;
        };
        report.received = true;
        self.upstream = Some(received.record);

        let relay = RelayReading {
            sensor: received.record,
            gateway: self.own,
        };
        match link.transmit(&relay) {
            Ok(()) => report.transmitted = true,
            Err(e) => report.link_failed(e),
        }
        report
    }
}
