//! ASCII hex codec
//!
//! The Wio-E5 reports received packets as uppercase hex, two characters
//! per byte. Encoding here uses the same uppercase alphabet; decoding
//! accepts either case.

use heapless::{String, Vec};

use crate::frame::FrameError;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// How to treat hex input with an odd number of digits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HexPolicy {
    /// Drop the trailing unpaired digit and decode the even prefix
    #[default]
    Truncate,
    /// Refuse the input with [`FrameError::MalformedLength`]
    Reject,
}

/// Result of a successful hex decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexDecode {
    /// Number of bytes written to the output
    pub len: usize,
    /// Input digits were dropped (odd length or output full)
    pub truncated: bool,
}

/// Check whether a byte is an ASCII hex digit
pub fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

/// Value of a single hex digit
pub fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Append the uppercase hex encoding of `bytes` to `out`
pub fn encode_into<const N: usize>(bytes: &[u8], out: &mut String<N>) -> Result<(), FrameError> {
    if out.len() + bytes.len() * 2 > N {
        return Err(FrameError::PayloadTooLarge);
    }
    for &byte in bytes {
        out.push(HEX_DIGITS[(byte >> 4) as usize] as char)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        out.push(HEX_DIGITS[(byte & 0x0F) as usize] as char)
            .map_err(|_| FrameError::PayloadTooLarge)?;
    }
    Ok(())
}

/// Decode hex digits into `out`
///
/// `out` is cleared first. With [`HexPolicy::Truncate`] an odd trailing
/// digit is dropped, and input that does not fit is cut at the output
/// capacity; both set `truncated`. With [`HexPolicy::Reject`] those cases
/// are errors instead.
pub fn decode_into<const N: usize>(
    hex: &[u8],
    out: &mut Vec<u8, N>,
    policy: HexPolicy,
) -> Result<HexDecode, FrameError> {
    out.clear();

    let odd = hex.len() % 2 == 1;
    if odd && policy == HexPolicy::Reject {
        return Err(FrameError::MalformedLength);
    }

    let mut pairs = hex.len() / 2;
    let mut truncated = odd;
    if pairs > N {
        if policy == HexPolicy::Reject {
            return Err(FrameError::PayloadTooLarge);
        }
        pairs = N;
        truncated = true;
    }

    for pair in hex[..pairs * 2].chunks_exact(2) {
        let hi = nibble(pair[0]).ok_or(FrameError::InvalidHexDigit)?;
        let lo = nibble(pair[1]).ok_or(FrameError::InvalidHexDigit)?;
        // Capacity was checked above
        let _ = out.push((hi << 4) | lo);
    }

    Ok(HexDecode {
        len: out.len(),
        truncated,
    })
}
