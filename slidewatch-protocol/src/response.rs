//! Module response scanning
//!
//! Responses arrive as unframed text mixed with command echoes and
//! unrelated acknowledgements. Everything here searches a byte buffer
//! for labelled substrings instead of parsing line by line.

use heapless::String;

use crate::hex::{self, is_hex_digit};
use crate::tag::{RoleTag, TAG_LEN};

/// Preamble the module prints in front of a received packet's hex
pub const RX_PREAMBLE: &str = "+TEST: RX \"";

/// Marker length: preamble plus the hex of `TAG,`
pub const MARKER_LEN: usize = RX_PREAMBLE.len() + (TAG_LEN + 1) * 2;

const RSSI_LABEL: &[u8] = b"RSSI:";
const SNR_LABEL: &[u8] = b"SNR:";

/// Substring locating packets from one role tag
///
/// For tag `GW` this is `+TEST: RX "47572C`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    text: String<24>,
}

impl Marker {
    /// Build the marker for packets carrying `tag`
    pub fn for_tag(tag: RoleTag) -> Self {
        let mut text = String::new();
        let mut prefix = [0u8; TAG_LEN + 1];
        prefix[..TAG_LEN].copy_from_slice(tag.as_bytes());
        prefix[TAG_LEN] = b',';

        // Capacity covers MARKER_LEN
        let _ = text.push_str(RX_PREAMBLE);
        let _ = hex::encode_into(&prefix, &mut text);
        Self { text }
    }

    /// Marker text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Marker bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Marker length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the marker is empty (never true for a built marker)
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Find `needle` in `haystack`, ignoring ASCII case
///
/// Returns the start offset of the first occurrence. An empty needle
/// matches at zero.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

/// Find the last occurrence of `needle` in `haystack`, ignoring ASCII case
pub fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(haystack.len());
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .rposition(|window| window.eq_ignore_ascii_case(needle))
}

/// Check whether `haystack` contains `needle`, ignoring ASCII case
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

/// A packet located behind a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketMatch<'a> {
    /// Hex digits following the marker
    pub payload_hex: &'a [u8],
    /// Payload is terminated by a non-hex byte or reached the maximum length
    ///
    /// An incomplete match ends at the end of the buffer, so more digits
    /// may still be in flight.
    pub complete: bool,
    /// Buffer offset one past the last payload digit
    pub end: usize,
}

/// Locate the first packet behind `marker` in `buf`
///
/// The payload is the run of hex digits following the marker, capped at
/// `max_hex` digits.
pub fn find_packet<'a>(buf: &'a [u8], marker: &Marker, max_hex: usize) -> Option<PacketMatch<'a>> {
    let start = find(buf, marker.as_bytes())? + marker.len();
    let digits = buf[start..]
        .iter()
        .take(max_hex)
        .take_while(|&&c| is_hex_digit(c))
        .count();
    let end = start + digits;

    Some(PacketMatch {
        payload_hex: &buf[start..end],
        complete: end < buf.len() || digits == max_hex,
        end,
    })
}

/// Received signal quality reported alongside a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkQuality {
    /// Received signal strength (dBm)
    pub rssi: Option<i16>,
    /// Signal to noise ratio (dB)
    pub snr: Option<i16>,
}

impl LinkQuality {
    /// Parse the last `RSSI:` and `SNR:` values anywhere in `buf`
    pub fn parse(buf: &[u8]) -> Self {
        Self {
            rssi: labelled_int(buf, RSSI_LABEL),
            snr: labelled_int(buf, SNR_LABEL),
        }
    }

    /// Check if neither value is known
    pub fn is_empty(&self) -> bool {
        self.rssi.is_none() && self.snr.is_none()
    }

    /// Overlay newer values, keeping ours where `newer` has none
    pub fn merge(self, newer: LinkQuality) -> Self {
        Self {
            rssi: newer.rssi.or(self.rssi),
            snr: newer.snr.or(self.snr),
        }
    }
}

/// Signed integer following the last occurrence of `label`
fn labelled_int(buf: &[u8], label: &[u8]) -> Option<i16> {
    let start = rfind(buf, label)? + label.len();
    let mut rest = &buf[start..];
    while let [b' ', tail @ ..] = rest {
        rest = tail;
    }

    let (negative, digits) = match rest {
        [b'-', tail @ ..] => (true, tail),
        [b'+', tail @ ..] => (false, tail),
        _ => (false, rest),
    };

    let mut value: i32 = 0;
    let mut seen = false;
    for &c in digits.iter().take_while(|c| c.is_ascii_digit()) {
        seen = true;
        value = (value * 10 + i32::from(c - b'0')).min(i32::from(i16::MAX) + 1);
    }
    if !seen {
        return None;
    }

    let value = if negative { -value } else { value };
    Some(value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
}
