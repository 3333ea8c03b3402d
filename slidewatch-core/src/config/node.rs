//! Node configuration

use slidewatch_protocol::{RfConfigError, RoleTag, MAX_PAYLOAD_HEX};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::link::LinkConfig;
use crate::alert::AlertThresholds;
use crate::calibration::CalibrationSet;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section
    UnknownKey,
    /// Value of the wrong type or out of range
    InvalidValue,
    /// `[node] role` not given
    MissingRole,
    /// A cycle interval or receive window of zero
    InvalidInterval,
    /// Radio parameters rejected
    Radio(RfConfigError),
}

impl From<RfConfigError> for ConfigError {
    fn from(e: RfConfigError) -> Self {
        ConfigError::Radio(e)
    }
}

/// Node role in the three-node chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    /// Sensor node at the landslide site
    #[default]
    Sensor,
    /// Relay between sensor node and end node
    Gateway,
    /// Monitoring station
    End,
}

impl Role {
    /// Parse a role name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sensor" => Some(Role::Sensor),
            "gateway" => Some(Role::Gateway),
            "end" => Some(Role::End),
            _ => None,
        }
    }

    /// Role name as used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            Role::Sensor => "sensor",
            Role::Gateway => "gateway",
            Role::End => "end",
        }
    }

    /// Tag this role puts on the frames it sends
    ///
    /// The sensor node's frames carry `GW` (they are addressed to the
    /// gateway); the gateway's relayed frames carry `EN`.
    pub fn tx_tag(&self) -> RoleTag {
        match self {
            Role::Sensor => RoleTag::GW,
            Role::Gateway | Role::End => RoleTag::EN,
        }
    }

    /// Tag this role listens for
    pub fn rx_tag(&self) -> RoleTag {
        match self {
            Role::Sensor | Role::Gateway => RoleTag::GW,
            Role::End => RoleTag::EN,
        }
    }

    /// Deployed receive window (ms)
    pub fn receive_window_ms(&self) -> u32 {
        match self {
            Role::End => 6_000,
            Role::Sensor | Role::Gateway => 5_000,
        }
    }
}

/// Complete node configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeConfig {
    /// Node role
    pub role: Role,
    /// Sensor sampling and display refresh interval (ms)
    pub update_interval_ms: u32,
    /// Sensor node transmit interval (ms)
    pub send_interval_ms: u32,
    /// How long one receive attempt listens (ms)
    pub receive_window_ms: u32,
    /// Pause between a received packet and its relay (ms)
    pub relay_delay_ms: u32,
    /// Analog input calibration
    pub calibration: CalibrationSet,
    /// Alert classifier thresholds
    pub thresholds: AlertThresholds,
    /// Radio link
    pub link: LinkConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::for_role(Role::default())
    }
}

impl NodeConfig {
    /// Deployed configuration for a role
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            update_interval_ms: 5_000,
            send_interval_ms: 20_000,
            receive_window_ms: role.receive_window_ms(),
            relay_delay_ms: 100,
            calibration: CalibrationSet::default(),
            thresholds: AlertThresholds::default(),
            link: LinkConfig::with_tags(role.tx_tag(), role.rx_tag()),
        }
    }

    /// Check values the parser cannot check field by field
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.link.rf.validate()?;

        if self.update_interval_ms == 0 || self.send_interval_ms == 0 || self.receive_window_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.link.timing.poll_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.link.max_payload_hex < 2 || self.link.max_payload_hex > MAX_PAYLOAD_HEX {
            return Err(ConfigError::InvalidValue);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_tag_pairing() {
        assert_eq!(Role::Sensor.tx_tag(), Role::Gateway.rx_tag());
        assert_eq!(Role::Gateway.tx_tag(), Role::End.rx_tag());
        assert_eq!(Role::Sensor.tx_tag().as_str(), "GW");
        assert_eq!(Role::End.rx_tag().as_str(), "EN");
    }

    #[test]
    fn test_role_names() {
        for role in [Role::Sensor, Role::Gateway, Role::End] {
            assert_eq!(Role::from_name(role.name()), Some(role));
        }
        assert_eq!(Role::from_name("relay"), None);
    }

    #[test]
    fn test_deployed_defaults() {
        let gateway = NodeConfig::for_role(Role::Gateway);
        assert_eq!(gateway.receive_window_ms, 5_000);
        assert_eq!(gateway.relay_delay_ms, 100);
        assert_eq!(gateway.link.rx_tag, RoleTag::GW);
        assert_eq!(gateway.link.tx_tag, RoleTag::EN);
        assert_eq!(gateway.link.timeouts.transmit_ms, 6_000);
        assert_eq!(gateway.link.timing.settle_ms, 200);

        let end = NodeConfig::for_role(Role::End);
        assert_eq!(end.receive_window_ms, 6_000);

        let sensor = NodeConfig::default();
        assert_eq!(sensor.role, Role::Sensor);
        assert_eq!(sensor.update_interval_ms, 5_000);
        assert_eq!(sensor.send_interval_ms, 20_000);
        assert_eq!(sensor.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = NodeConfig::default();
        config.send_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidInterval));

        let mut config = NodeConfig::default();
        config.link.rf.spreading_factor = 6;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Radio(RfConfigError::SpreadingFactor))
        );

        let mut config = NodeConfig::default();
        config.link.max_payload_hex = MAX_PAYLOAD_HEX + 2;
        assert_eq!(config.validate(), Err(ConfigError::InvalidValue));
    }
}
