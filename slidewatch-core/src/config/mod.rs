//! Configuration types
//!
//! Board-agnostic node configuration. The firmware embeds a `node.toml`
//! and parses it with [`parse::parse_node_config`] at boot.

pub mod link;
pub mod node;
pub mod parse;

pub use link::{CommandTimeouts, LinkConfig};
pub use node::{ConfigError, NodeConfig, Role};
pub use parse::parse_node_config;
