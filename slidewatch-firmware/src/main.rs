//! Slidewatch - Landslide Monitoring Node Firmware
//!
//! One firmware image for all three nodes of the network. The role
//! (sensor, gateway or end node) and the radio settings come from the
//! `node.toml` compiled into the image.
//!
//! Board wiring:
//! - UART0 (GPIO0 TX, GPIO1 RX): Wio-E5 module, 9600 8N1
//! - GPIO26/27/28 (ADC0-2): capacitive soil, resistive soil, rain gauge
//! - GPIO15: vibration switch
//! - GPIO14: page button (end node)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use slidewatch_core::config::Role;
use slidewatch_hal::IoSerial;

use crate::sensors::AnalogInputs;
use crate::tasks::NodeHardware;

/// Embedded node configuration (compiled into firmware)
/// Edit node.toml and rebuild to change role or radio settings
const EMBEDDED_CONFIG: &str = include_str!("../node.toml");

mod config;
mod diagnostics;
mod display;
mod sensors;
mod tasks;
mod time;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Slidewatch firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let node_config = config::load_config(EMBEDDED_CONFIG);

    // Wio-E5 factory line settings
    let line = slidewatch_hal::UartConfig::default();
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = line.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 512]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized for Wio-E5 at {} baud", line.baudrate);

    let analog = AnalogInputs {
        adc: Adc::new_blocking(p.ADC, AdcConfig::default()),
        soil_m1: Channel::new_pin(p.PIN_26, Pull::None),
        soil_m2: Channel::new_pin(p.PIN_27, Pull::None),
        rain: Channel::new_pin(p.PIN_28, Pull::None),
    };

    let hardware = NodeHardware {
        radio: IoSerial::new(uart),
        analog,
        vibration: Input::new(p.PIN_15, Pull::Down),
    };

    if node_config.role == Role::End {
        let button = Input::new(p.PIN_14, Pull::Up);
        spawner.spawn(tasks::button_task(button)).unwrap();
    }

    spawner.spawn(tasks::node_task(node_config, hardware)).unwrap();
}
