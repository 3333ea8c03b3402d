//! Link configuration

use slidewatch_protocol::{HexPolicy, RfConfig, RoleTag, TxEncoding, MAX_PAYLOAD_HEX};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::link::ChannelTiming;

/// Acknowledgement budgets per command (ms)
///
/// Each budget starts after the channel's settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CommandTimeouts {
    /// `AT` liveness probe
    pub probe_ms: u32,
    /// `AT+MODE=TEST`
    pub test_mode_ms: u32,
    /// `AT+TEST=RFCFG`
    pub rf_config_ms: u32,
    /// `AT+TEST=RXLRPKT`
    pub arm_receive_ms: u32,
    /// Transmit until `TX DONE` (SF12 airtime is over a second)
    pub transmit_ms: u32,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            probe_ms: 100,
            test_mode_ms: 1_500,
            rf_config_ms: 1_500,
            arm_receive_ms: 1_500,
            transmit_ms: 6_000,
        }
    }
}

/// Radio link configuration, applied once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Radio parameters
    pub rf: RfConfig,
    /// Tag put on transmitted frames
    pub tx_tag: RoleTag,
    /// Tag expected on received frames
    pub rx_tag: RoleTag,
    /// How frames are handed to the module
    pub encoding: TxEncoding,
    /// Treatment of odd-length received hex
    pub hex_policy: HexPolicy,
    /// Maximum payload hex digits taken after the receive marker
    pub max_payload_hex: usize,
    /// Settle and poll delays
    pub timing: ChannelTiming,
    /// Acknowledgement budgets
    pub timeouts: CommandTimeouts,
}

impl Default for LinkConfig {
    /// Gateway pairing: receives `GW`, transmits `EN`
    fn default() -> Self {
        Self {
            rf: RfConfig::default(),
            tx_tag: RoleTag::EN,
            rx_tag: RoleTag::GW,
            encoding: TxEncoding::default(),
            hex_policy: HexPolicy::default(),
            max_payload_hex: MAX_PAYLOAD_HEX,
            timing: ChannelTiming::default(),
            timeouts: CommandTimeouts::default(),
        }
    }
}

impl LinkConfig {
    /// Default configuration with the given tag pairing
    pub fn with_tags(tx_tag: RoleTag, rx_tag: RoleTag) -> Self {
        Self {
            tx_tag,
            rx_tag,
            ..Default::default()
        }
    }
}
