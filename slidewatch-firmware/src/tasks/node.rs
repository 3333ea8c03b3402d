//! Node loop task
//!
//! Configures the radio once, then runs the configured role's cycle
//! forever. Link failures are logged and the loop carries on; a missing
//! module only stops the radio side.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_rp::uart::BufferedUart;
use embassy_time::{Delay, Timer};

use slidewatch_core::config::{NodeConfig, Role};
use slidewatch_core::link::{LinkDriver, LinkError};
use slidewatch_core::node::{CycleReport, EndNode, GatewayNode, SensorNode};
use slidewatch_core::traits::RelayPage;
use slidewatch_display::PageDisplay;
use slidewatch_hal::IoSerial;

use super::button::PAGE_REQUEST;
use crate::diagnostics::DefmtSink;
use crate::display::RttDisplay;
use crate::sensors::{AnalogInputs, GatewaySensors, SiteSensors};
use crate::time::UptimeClock;

type Link = LinkDriver<IoSerial<BufferedUart>, UptimeClock, Delay, DefmtSink>;
type Display = PageDisplay<RttDisplay>;

/// How long the gateway page stays up after a button press (ms)
const GATEWAY_PAGE_MS: u64 = 2_000;

/// Pause between cycles that did no radio work (ms)
const IDLE_PAUSE_MS: u64 = 10;

/// Peripherals handed to the node task
pub struct NodeHardware {
    /// Wio-E5 on UART0
    pub radio: IoSerial<BufferedUart>,
    pub analog: AnalogInputs,
    /// SW-420 vibration switch, high when tripped
    pub vibration: Input<'static>,
}

#[embassy_executor::task]
pub async fn node_task(config: NodeConfig, hardware: NodeHardware) {
    let mut display = PageDisplay::new(RttDisplay::new());
    let role = config.role.name();
    if display.show_boot(role, "Configuring").is_err() {
        warn!("Display not ready");
    }

    // The module ignores commands for a moment after power-up
    Timer::after_millis(250).await;

    let mut link = LinkDriver::new(hardware.radio, UptimeClock, Delay, DefmtSink, config.link);
    let status = match link.configure() {
        Ok(()) => "Ready",
        Err(LinkError::LinkAbsent) => "Not found",
        Err(e) => {
            warn!("Radio configuration: {}", e);
            "Degraded"
        }
    };
    let _ = display.show_boot(role, status);
    Timer::after_millis(500).await;

    match config.role {
        Role::Sensor => {
            let sensors = SiteSensors::new(hardware.analog, hardware.vibration, config.calibration);
            run_sensor(&config, &mut link, sensors, &mut display).await
        }
        Role::Gateway => {
            let sensors = GatewaySensors::new(hardware.analog, config.calibration);
            run_gateway(&config, &mut link, sensors, &mut display).await
        }
        Role::End => run_end(&config, &mut link, &mut display).await,
    }
}

async fn run_sensor(config: &NodeConfig, link: &mut Link, mut sensors: SiteSensors, display: &mut Display) -> ! {
    let mut node = SensorNode::new(config);
    loop {
        let report = node.cycle(link, &mut sensors, display);
        log_report(&report);
        if report.sampled {
            info!("Status: {}", node.alert_level().label());
        }
        Timer::after_millis(IDLE_PAUSE_MS).await;
    }
}

async fn run_gateway(config: &NodeConfig, link: &mut Link, mut sensors: GatewaySensors, display: &mut Display) -> ! {
    let mut node = GatewayNode::new(config);
    loop {
        let report = node.cycle(link, &mut sensors, display);
        log_report(&report);

        // Without a radio the cycle returns at once; keep the display pace
        if report.link_disabled {
            Timer::after_millis(u64::from(config.update_interval_ms)).await;
        } else {
            Timer::after_millis(IDLE_PAUSE_MS).await;
        }
    }
}

async fn run_end(config: &NodeConfig, link: &mut Link, display: &mut Display) -> ! {
    let mut node = EndNode::new(config);
    loop {
        let report = node.cycle(link, display);
        log_report(&report);

        if PAGE_REQUEST.try_take().is_some() {
            node.set_page(RelayPage::Gateway);
            if node.render(display).is_err() {
                warn!("Display error");
            }
            Timer::after_millis(GATEWAY_PAGE_MS).await;
            node.set_page(RelayPage::Sensor);
        }

        if report.link_disabled {
            Timer::after_millis(u64::from(config.update_interval_ms)).await;
        } else {
            Timer::after_millis(IDLE_PAUSE_MS).await;
        }
    }
}

fn log_report(report: &CycleReport) {
    if let Some(e) = report.error {
        warn!("Link: {}", e);
    }
    if report.display_failed {
        warn!("Display error");
    }
    trace!("Cycle: {}", report);
}
