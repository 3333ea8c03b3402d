//! Build script for slidewatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates node.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Keys accepted per section, mirrored from the firmware's parser
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "node",
        &[
            "role",
            "update_interval_ms",
            "send_interval_ms",
            "receive_window_ms",
            "relay_delay_ms",
        ],
    ),
    (
        "radio",
        &[
            "frequency_khz",
            "spreading_factor",
            "bandwidth_khz",
            "tx_preamble",
            "rx_preamble",
            "power_dbm",
            "crc",
            "iq_invert",
            "public_network",
        ],
    ),
    (
        "link",
        &[
            "tx_tag",
            "rx_tag",
            "encoding",
            "hex_policy",
            "max_payload_hex",
            "settle_ms",
            "poll_ms",
            "probe_timeout_ms",
            "test_mode_timeout_ms",
            "rf_config_timeout_ms",
            "arm_receive_timeout_ms",
            "transmit_timeout_ms",
        ],
    ),
    (
        "calibration",
        &[
            "soil_m1_dry",
            "soil_m1_wet",
            "soil_m2_dry",
            "soil_m2_wet",
            "rain_dry",
            "rain_wet",
        ],
    ),
    (
        "alert",
        &[
            "soil_moisture",
            "rain",
            "humidity",
            "temperature",
            "displacement",
            "require_vibration",
        ],
    ),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate node.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=node.toml");

    let config_path = Path::new("node.toml");
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: node.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a node.toml configuration file in the     ║\n\
            ║  slidewatch-firmware directory.                                  ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read node.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail("Invalid TOML syntax in node.toml", &[e.to_string()]),
    };

    let mut errors = Vec::new();
    check_keys(&config, &mut errors);
    check_node(&config, &mut errors);
    check_radio(&config, &mut errors);
    check_link(&config, &mut errors);

    if !errors.is_empty() {
        fail("Invalid node configuration", &errors);
    }
}

/// Reject unknown sections, unknown keys and nested tables
fn check_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(name, _)| name == section) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("'{}' must be a section", section));
            continue;
        };
        for (key, value) in table {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
            if value.is_table() || value.is_array() {
                errors.push(format!("[{}] {} must be a plain value", section, key));
            }
        }
    }
}

fn check_node(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("node").and_then(|n| n.get("role")) {
        Some(toml::Value::String(role)) if ["sensor", "gateway", "end"].contains(&role.as_str()) => {}
        Some(_) => errors.push("[node] role must be \"sensor\", \"gateway\" or \"end\"".to_string()),
        None => errors.push("[node] role is required".to_string()),
    }

    for key in ["update_interval_ms", "send_interval_ms", "receive_window_ms"] {
        if let Some(value) = integer(config, "node", key) {
            if value <= 0 {
                errors.push(format!("[node] {} must be positive", key));
            }
        }
    }
}

fn check_radio(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(freq) = integer(config, "radio", "frequency_khz") {
        if !(150_000..=960_000).contains(&freq) {
            errors.push("[radio] frequency_khz must be 150000-960000".to_string());
        }
    }
    if let Some(sf) = integer(config, "radio", "spreading_factor") {
        if !(7..=12).contains(&sf) {
            errors.push("[radio] spreading_factor must be 7-12".to_string());
        }
    }
    if let Some(bw) = integer(config, "radio", "bandwidth_khz") {
        if ![125, 250, 500].contains(&bw) {
            errors.push("[radio] bandwidth_khz must be 125, 250 or 500".to_string());
        }
    }
    if let Some(power) = integer(config, "radio", "power_dbm") {
        if !(-1..=22).contains(&power) {
            errors.push("[radio] power_dbm must be -1 to 22".to_string());
        }
    }
}

fn check_link(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["tx_tag", "rx_tag"] {
        if let Some(tag) = config.get("link").and_then(|l| l.get(key)) {
            let valid = tag
                .as_str()
                .map(|t| t.len() == 2 && t.bytes().all(|b| b.is_ascii_alphanumeric()))
                .unwrap_or(false);
            if !valid {
                errors.push(format!("[link] {} must be two ASCII letters or digits", key));
            }
        }
    }

    let choices: [(&str, &[&str]); 2] = [("encoding", &["text", "hex"]), ("hex_policy", &["truncate", "reject"])];
    for (key, allowed) in choices {
        if let Some(value) = config.get("link").and_then(|l| l.get(key)) {
            if !value.as_str().map(|v| allowed.contains(&v)).unwrap_or(false) {
                errors.push(format!("[link] {} must be one of {:?}", key, allowed));
            }
        }
    }

    if let Some(max) = integer(config, "link", "max_payload_hex") {
        if !(2..=248).contains(&max) {
            errors.push("[link] max_payload_hex must be 2-248".to_string());
        }
    }
    if let Some(poll) = integer(config, "link", "poll_ms") {
        if poll <= 0 {
            errors.push("[link] poll_ms must be positive".to_string());
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}
