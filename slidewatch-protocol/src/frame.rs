//! Wire frame encoding and decoding
//!
//! Frame text (what the transmitting module is asked to send):
//! - TAG (2 bytes): role tag, e.g. `GW`
//! - `,` separator
//! - FIELDS: comma-joined record fields
//!
//! The receiving module reports the frame bytes as hex. The receiver
//! matches the hex of `TAG,` as part of its marker, so the payload handed
//! to [`decode`] is the hex of the FIELDS part only.

use heapless::{String, Vec};

use crate::fields::{FieldWriter, Fields};
use crate::hex::{self, HexPolicy};
use crate::record::Record;
use crate::tag::{RoleTag, TAG_LEN};

/// Maximum frame text size in bytes (TAG + `,` + fields)
pub const MAX_FRAME_TEXT: usize = 127;

/// Maximum field text size in bytes
pub const MAX_FIELDS_TEXT: usize = MAX_FRAME_TEXT - TAG_LEN - 1;

/// Maximum hex payload size in characters (hex of the field text)
pub const MAX_PAYLOAD_HEX: usize = MAX_FIELDS_TEXT * 2;

/// Maximum hex size of a complete frame
pub const MAX_FRAME_HEX: usize = MAX_FRAME_TEXT * 2;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Encoded text exceeds the frame capacity
    PayloadTooLarge,
    /// Hex payload has an odd number of digits
    MalformedLength,
    /// Hex payload contains a non-hex character
    InvalidHexDigit,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Role tag is not two ASCII alphanumerics
    InvalidRoleTag,
}

/// An encoded frame ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    tag: RoleTag,
    text: String<MAX_FRAME_TEXT>,
}

impl WireFrame {
    /// Encode a record under a role tag
    ///
    /// Fails only if the field text exceeds [`MAX_FIELDS_TEXT`], which no
    /// record type defined in this crate can reach.
    pub fn encode<R: Record>(record: &R, tag: RoleTag) -> Result<Self, FrameError> {
        let mut text = String::new();
        text.push_str(tag.as_str())
            .map_err(|_| FrameError::PayloadTooLarge)?;
        text.push(',').map_err(|_| FrameError::PayloadTooLarge)?;

        let mut writer = FieldWriter::new(&mut text);
        record.write_fields(&mut writer)?;

        Ok(Self { tag, text })
    }

    /// The role tag this frame was encoded under
    pub fn tag(&self) -> RoleTag {
        self.tag
    }

    /// Complete frame text, `TAG,fields`
    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Field text without the tag
    pub fn fields_text(&self) -> &str {
        &self.text[TAG_LEN + 1..]
    }

    /// Hex of the complete frame, as reported by the receiving module
    pub fn to_hex(&self) -> Result<String<MAX_FRAME_HEX>, FrameError> {
        let mut out = String::new();
        hex::encode_into(self.text.as_bytes(), &mut out)?;
        Ok(out)
    }

    /// Hex of the field text, as it follows the receive marker
    pub fn payload_hex(&self) -> Result<String<MAX_PAYLOAD_HEX>, FrameError> {
        let mut out = String::new();
        hex::encode_into(self.fields_text().as_bytes(), &mut out)?;
        Ok(out)
    }
}

/// A decoded record with a report on how complete the payload was
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Decoded<R> {
    /// The decoded record; absent fields are zero
    pub record: R,
    /// Number of field tokens present in the payload
    pub fields: usize,
    /// Hex input was cut short (odd length or oversize)
    pub truncated: bool,
}

impl<R: Record> Decoded<R> {
    /// Check whether every field of the record was present
    pub fn is_complete(&self) -> bool {
        self.fields >= R::FIELD_COUNT && !self.truncated
    }

    /// Number of record fields that were missing and defaulted to zero
    pub fn missing_fields(&self) -> usize {
        R::FIELD_COUNT.saturating_sub(self.fields)
    }
}

/// Decode a hex payload into a record
///
/// Hex length is handled per `policy`. Field conversion never fails:
/// missing or garbled tokens default to zero and are reported through
/// [`Decoded::fields`].
pub fn decode<R: Record>(hex_payload: &[u8], policy: HexPolicy) -> Result<Decoded<R>, FrameError> {
    let mut bytes: Vec<u8, MAX_FIELDS_TEXT> = Vec::new();
    let result = hex::decode_into(hex_payload, &mut bytes, policy)?;

    let fields = Fields::from_bytes(&bytes);
    Ok(Decoded {
        record: R::read_fields(&fields, 0),
        fields: fields.len(),
        truncated: result.truncated,
    })
}
