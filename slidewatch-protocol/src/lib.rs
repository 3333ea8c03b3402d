//! Slidewatch Radio Link Protocol
//!
//! This crate defines the text protocol spoken between a node's MCU and
//! its Wio-E5 LoRa module, and the payload carried between the three
//! nodes of the landslide monitoring network (Sensor → Gateway → End).
//!
//! # Protocol Overview
//!
//! Commands are ASCII lines sent to the module in its radio test mode:
//! ```text
//! AT+TEST=TXLRSTR,"GW,45,60,10,70,22,0.30,0,0"\r\n
//! ```
//!
//! The receiving module reports every packet hex-encoded behind a fixed
//! preamble. The first bytes of the packet are the role tag and a comma,
//! so a receiver locates "its" packets by searching for the marker:
//! ```text
//! +TEST: LEN:31, RSSI:-41, SNR:13
//! +TEST: RX "47572C34352C36302C..."
//!            └─ "GW," ─┘└─ payload ─┘
//! ```
//!
//! The payload is the comma-joined textual encoding of a reading record.
//! Field order is fixed per record type and is the same as field order on
//! the wire.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod fields;
pub mod frame;
pub mod hex;
pub mod record;
pub mod response;
pub mod tag;

pub use command::{Command, CommandLine, RfConfig, RfConfigError, TxEncoding, MAX_COMMAND_LEN};
pub use fields::{FieldWriter, Fields, SEPARATOR};
pub use frame::{
    decode, Decoded, FrameError, WireFrame, MAX_FIELDS_TEXT, MAX_FRAME_HEX, MAX_FRAME_TEXT, MAX_PAYLOAD_HEX,
};
pub use hex::HexPolicy;
pub use record::{GatewayReading, Record, RelayReading, SensorReading};
pub use response::{find_packet, LinkQuality, Marker, PacketMatch, MARKER_LEN, RX_PREAMBLE};
pub use tag::RoleTag;
