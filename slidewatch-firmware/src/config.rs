//! Configuration loading
//!
//! The node configuration is compiled into the firmware from `node.toml`
//! (validated by the build script) and parsed at boot.

use defmt::*;

use slidewatch_core::config::{parse_node_config, NodeConfig};

/// Parse the embedded configuration
///
/// Falls back to the sensor node defaults if parsing fails, which the
/// build-time validation should make impossible.
pub fn load_config(source: &str) -> NodeConfig {
    match parse_node_config(source) {
        Ok(config) => {
            info!(
                "Config: role={}, {} kHz SF{} {} dBm, window {} ms",
                config.role.name(),
                config.link.rf.frequency_khz,
                config.link.rf.spreading_factor,
                config.link.rf.power_dbm,
                config.receive_window_ms
            );
            config
        }
        Err(e) => {
            error!("Config parse failed: {}, using defaults", e);
            NodeConfig::default()
        }
    }
}
