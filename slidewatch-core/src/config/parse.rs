//! Minimal TOML parser for node configuration
//!
//! Handles only the subset used by `node.toml`: no arrays, inline
//! tables or multi-line strings.
//!
//! Supported features:
//! - `[section]` headers
//! - `key = value` pairs (string, integer, float, boolean)
//! - Comments (`# ...`), whole-line or trailing
//!
//! Sections and keys:
//! ```text
//! [node]         role, update_interval_ms, send_interval_ms,
//!                receive_window_ms, relay_delay_ms
//! [radio]        frequency_khz, spreading_factor, bandwidth_khz,
//!                tx_preamble, rx_preamble, power_dbm, crc, iq_invert,
//!                public_network
//! [link]         tx_tag, rx_tag, encoding, hex_policy, max_payload_hex,
//!                settle_ms, poll_ms, probe_timeout_ms,
//!                test_mode_timeout_ms, rf_config_timeout_ms,
//!                arm_receive_timeout_ms, transmit_timeout_ms
//! [calibration]  soil_m1_dry, soil_m1_wet, soil_m2_dry, soil_m2_wet,
//!                rain_dry, rain_wet
//! [alert]        soil_moisture, rain, humidity, temperature,
//!                displacement, require_vibration
//! ```
//!
//! Defaults come from the role, so `role` is required and is read before
//! anything else. Unknown sections and keys are errors.

use slidewatch_protocol::{HexPolicy, RoleTag, TxEncoding};

use super::node::{ConfigError, NodeConfig, Role};

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Node,
    Radio,
    Link,
    Calibration,
    Alert,
}

/// Parse and validate a node configuration
pub fn parse_node_config(input: &str) -> Result<NodeConfig, ConfigError> {
    let role = find_role(input)?;
    let mut config = NodeConfig::for_role(role);
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ConfigError::InvalidValue)?;
        apply_value(section, key, value, &mut config)?;
    }

    config.validate()?;
    Ok(config)
}

/// Find `role` in the `[node]` section
fn find_role(input: &str) -> Result<Role, ConfigError> {
    let mut in_node = false;
    for line in input.lines() {
        let line = strip_comment(line).trim();
        if line.starts_with('[') {
            in_node = line == "[node]";
            continue;
        }
        if !in_node {
            continue;
        }
        if let Some(("role", value)) = parse_key_value(line) {
            let name = parse_string(value)?;
            return Role::from_name(name).ok_or(ConfigError::InvalidValue);
        }
    }
    Err(ConfigError::MissingRole)
}

fn parse_section_header(header: &str) -> Result<Section, ConfigError> {
    match header.trim() {
        "node" => Ok(Section::Node),
        "radio" => Ok(Section::Radio),
        "link" => Ok(Section::Link),
        "calibration" => Ok(Section::Calibration),
        "alert" => Ok(Section::Alert),
        _ => Err(ConfigError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut NodeConfig,
) -> Result<(), ConfigError> {
    match section {
        Section::Root => Err(ConfigError::UnknownKey),
        Section::Node => apply_node(key, value, config),
        Section::Radio => apply_radio(key, value, config),
        Section::Link => apply_link(key, value, config),
        Section::Calibration => apply_calibration(key, value, config),
        Section::Alert => apply_alert(key, value, config),
    }
}

fn apply_node(key: &str, value: &str, config: &mut NodeConfig) -> Result<(), ConfigError> {
    match key {
        // Already applied by find_role
        "role" => {}
        "update_interval_ms" => config.update_interval_ms = parse_int(value)?,
        "send_interval_ms" => config.send_interval_ms = parse_int(value)?,
        "receive_window_ms" => config.receive_window_ms = parse_int(value)?,
        "relay_delay_ms" => config.relay_delay_ms = parse_int(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_radio(key: &str, value: &str, config: &mut NodeConfig) -> Result<(), ConfigError> {
    let rf = &mut config.link.rf;
    match key {
        "frequency_khz" => rf.frequency_khz = parse_int(value)?,
        "spreading_factor" => rf.spreading_factor = parse_int(value)?,
        "bandwidth_khz" => rf.bandwidth_khz = parse_int(value)?,
        "tx_preamble" => rf.tx_preamble = parse_int(value)?,
        "rx_preamble" => rf.rx_preamble = parse_int(value)?,
        "power_dbm" => rf.power_dbm = parse_int(value)?,
        "crc" => rf.crc = parse_bool(value)?,
        "iq_invert" => rf.iq_invert = parse_bool(value)?,
        "public_network" => rf.public_network = parse_bool(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_link(key: &str, value: &str, config: &mut NodeConfig) -> Result<(), ConfigError> {
    let link = &mut config.link;
    match key {
        "tx_tag" => link.tx_tag = parse_tag(value)?,
        "rx_tag" => link.rx_tag = parse_tag(value)?,
        "encoding" => link.encoding = parse_encoding(value)?,
        "hex_policy" => link.hex_policy = parse_hex_policy(value)?,
        "max_payload_hex" => link.max_payload_hex = parse_int(value)?,
        "settle_ms" => link.timing.settle_ms = parse_int(value)?,
        "poll_ms" => link.timing.poll_ms = parse_int(value)?,
        "probe_timeout_ms" => link.timeouts.probe_ms = parse_int(value)?,
        "test_mode_timeout_ms" => link.timeouts.test_mode_ms = parse_int(value)?,
        "rf_config_timeout_ms" => link.timeouts.rf_config_ms = parse_int(value)?,
        "arm_receive_timeout_ms" => link.timeouts.arm_receive_ms = parse_int(value)?,
        "transmit_timeout_ms" => link.timeouts.transmit_ms = parse_int(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_calibration(key: &str, value: &str, config: &mut NodeConfig) -> Result<(), ConfigError> {
    let cal = &mut config.calibration;
    match key {
        "soil_m1_dry" => cal.soil_m1.raw_dry = parse_int(value)?,
        "soil_m1_wet" => cal.soil_m1.raw_wet = parse_int(value)?,
        "soil_m2_dry" => cal.soil_m2.raw_dry = parse_int(value)?,
        "soil_m2_wet" => cal.soil_m2.raw_wet = parse_int(value)?,
        "rain_dry" => cal.rain.raw_dry = parse_int(value)?,
        "rain_wet" => cal.rain.raw_wet = parse_int(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

fn apply_alert(key: &str, value: &str, config: &mut NodeConfig) -> Result<(), ConfigError> {
    let alert = &mut config.thresholds;
    match key {
        "soil_moisture" => alert.soil_moisture = parse_int(value)?,
        "rain" => alert.rain = parse_int(value)?,
        "humidity" => alert.humidity = parse_int(value)?,
        "temperature" => alert.temperature = parse_int(value)?,
        "displacement" => alert.displacement = parse_float(value)?,
        "require_vibration" => alert.require_vibration = parse_bool(value)?,
        _ => return Err(ConfigError::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ConfigError> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ConfigError::InvalidValue)
    }
}

/// Parse an integer value (underscores allowed as in TOML)
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ConfigError> {
    let mut digits: heapless::String<24> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ConfigError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_float(value: &str) -> Result<f32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_tag(value: &str) -> Result<RoleTag, ConfigError> {
    RoleTag::new(parse_string(value)?).map_err(|_| ConfigError::InvalidValue)
}

fn parse_encoding(value: &str) -> Result<TxEncoding, ConfigError> {
    match parse_string(value)? {
        "text" => Ok(TxEncoding::Text),
        "hex" => Ok(TxEncoding::Hex),
        _ => Err(ConfigError::InvalidValue),
    }
}

fn parse_hex_policy(value: &str) -> Result<HexPolicy, ConfigError> {
    match parse_string(value)? {
        "truncate" => Ok(HexPolicy::Truncate),
        "reject" => Ok(HexPolicy::Reject),
        _ => Err(ConfigError::InvalidValue),
    }
}
