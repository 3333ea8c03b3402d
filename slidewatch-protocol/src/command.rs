//! AT commands for the Wio-E5 in radio test mode
//!
//! Each command kind is a variant of [`Command`]; [`Command::to_line`]
//! renders the complete `AT+...\r\n` line and [`Command::ack`] names the
//! substring that confirms it in the module's response.

use core::fmt::Write;

use heapless::String;

use crate::frame::{FrameError, WireFrame};
use crate::hex;

/// Maximum command line length (TXLRPKT with a full hex frame fits)
pub const MAX_COMMAND_LEN: usize = 320;

/// An owned, rendered command line
pub type CommandLine = String<MAX_COMMAND_LEN>;

/// Liveness probe acknowledgement
pub const ACK_PROBE: &str = "+AT: OK";
/// Test mode acknowledgement
pub const ACK_TEST_MODE: &str = "+MODE: TEST";
/// RF configuration acknowledgement
pub const ACK_RF_CONFIG: &str = "+TEST: RFCFG";
/// Continuous receive acknowledgement
pub const ACK_ARM_RECEIVE: &str = "+TEST: RXLRPKT";
/// Transmit confirmation
pub const ACK_TX_DONE: &str = "TX DONE";

/// How a frame is handed to the module for transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TxEncoding {
    /// `TXLRSTR` with the frame text; the module sends the text bytes
    #[default]
    Text,
    /// `TXLRPKT` with the frame hex; identical bytes on air
    Hex,
}

/// LoRa radio parameters applied once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RfConfig {
    /// Carrier frequency (kHz)
    pub frequency_khz: u32,
    /// Spreading factor (7-12)
    pub spreading_factor: u8,
    /// Bandwidth (kHz): 125, 250 or 500
    pub bandwidth_khz: u16,
    /// Transmit preamble length (symbols)
    pub tx_preamble: u16,
    /// Receive preamble length (symbols)
    pub rx_preamble: u16,
    /// Transmit power (dBm)
    pub power_dbm: i8,
    /// Payload CRC enabled
    pub crc: bool,
    /// IQ inversion enabled
    pub iq_invert: bool,
    /// Public LoRaWAN sync word
    pub public_network: bool,
}

impl Default for RfConfig {
    /// Deployed link: 866 MHz, SF12, 125 kHz, 14 dBm
    fn default() -> Self {
        Self {
            frequency_khz: 866_000,
            spreading_factor: 12,
            bandwidth_khz: 125,
            tx_preamble: 12,
            rx_preamble: 15,
            power_dbm: 14,
            crc: true,
            iq_invert: false,
            public_network: false,
        }
    }
}

/// RF parameter validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RfConfigError {
    /// Frequency outside the module's 150-960 MHz range
    Frequency,
    /// Spreading factor outside 7-12
    SpreadingFactor,
    /// Bandwidth not 125, 250 or 500 kHz
    Bandwidth,
    /// Preamble length of zero
    Preamble,
    /// Power outside -1..=22 dBm
    Power,
}

impl RfConfig {
    /// Check the parameters against the module's accepted ranges
    pub fn validate(&self) -> Result<(), RfConfigError> {
        if !(150_000..=960_000).contains(&self.frequency_khz) {
            return Err(RfConfigError::Frequency);
        }
        if !(7..=12).contains(&self.spreading_factor) {
            return Err(RfConfigError::SpreadingFactor);
        }
        if !matches!(self.bandwidth_khz, 125 | 250 | 500) {
            return Err(RfConfigError::Bandwidth);
        }
        if self.tx_preamble == 0 || self.rx_preamble == 0 {
            return Err(RfConfigError::Preamble);
        }
        if !(-1..=22).contains(&self.power_dbm) {
            return Err(RfConfigError::Power);
        }
        Ok(())
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

/// Commands understood by the module
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command<'a> {
    /// `AT` liveness probe
    Probe,
    /// `AT+MODE=TEST` radio test mode
    EnterTestMode,
    /// `AT+TEST=RFCFG,...` radio parameters
    ConfigureRf(&'a RfConfig),
    /// `AT+TEST=RXLRPKT` continuous receive
    ArmReceive,
    /// `AT+TEST=TXLRSTR` / `AT+TEST=TXLRPKT` single packet transmit
    Transmit {
        frame: &'a WireFrame,
        encoding: TxEncoding,
    },
}

impl Command<'_> {
    /// Substring that confirms this command in the module's response
    pub fn ack(&self) -> &'static str {
        match self {
            Command::Probe => ACK_PROBE,
            Command::EnterTestMode => ACK_TEST_MODE,
            Command::ConfigureRf(_) => ACK_RF_CONFIG,
            Command::ArmReceive => ACK_ARM_RECEIVE,
            Command::Transmit { .. } => ACK_TX_DONE,
        }
    }

    /// Short name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Command::Probe => "AT",
            Command::EnterTestMode => "MODE",
            Command::ConfigureRf(_) => "RFCFG",
            Command::ArmReceive => "RXLRPKT",
            Command::Transmit {
                encoding: TxEncoding::Text,
                ..
            } => "TXLRSTR",
            Command::Transmit {
                encoding: TxEncoding::Hex,
                ..
            } => "TXLRPKT",
        }
    }

    /// Render the complete command line including `\r\n`
    pub fn to_line(&self) -> Result<CommandLine, FrameError> {
        let mut line = CommandLine::new();
        self.write_line(&mut line)?;
        Ok(line)
    }

    fn write_line(&self, line: &mut CommandLine) -> Result<(), FrameError> {
        let overflow = |_| FrameError::BufferTooSmall;
        match self {
            Command::Probe => line.push_str("AT").map_err(overflow)?,
            Command::EnterTestMode => line.push_str("AT+MODE=TEST").map_err(overflow)?,
            Command::ConfigureRf(rf) => {
                let mhz = rf.frequency_khz / 1000;
                let khz = rf.frequency_khz % 1000;
                if khz == 0 {
                    write!(line, "AT+TEST=RFCFG,{}", mhz)
                } else {
                    write!(line, "AT+TEST=RFCFG,{}.{:03}", mhz, khz)
                }
                .map_err(|_| FrameError::BufferTooSmall)?;
                write!(
                    line,
                    ",SF{},{},{},{},{},{},{},{}",
                    rf.spreading_factor,
                    rf.bandwidth_khz,
                    rf.tx_preamble,
                    rf.rx_preamble,
                    rf.power_dbm,
                    on_off(rf.crc),
                    on_off(rf.iq_invert),
                    on_off(rf.public_network),
                )
                .map_err(|_| FrameError::BufferTooSmall)?;
            }
            Command::ArmReceive => line.push_str("AT+TEST=RXLRPKT").map_err(overflow)?,
            Command::Transmit { frame, encoding } => match encoding {
                TxEncoding::Text => {
                    write!(line, "AT+TEST=TXLRSTR,\"{}\"", frame.text())
                        .map_err(|_| FrameError::BufferTooSmall)?;
                }
                TxEncoding::Hex => {
                    line.push_str("AT+TEST=TXLRPKT,\"").map_err(overflow)?;
                    hex::encode_into(frame.text().as_bytes(), line)
                        .map_err(|_| FrameError::BufferTooSmall)?;
                    line.push('"').map_err(overflow)?;
                }
            },
        }
        line.push_str("\r\n").map_err(overflow)
    }
}
