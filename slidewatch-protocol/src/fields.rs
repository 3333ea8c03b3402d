//! Comma-separated field text
//!
//! A record travels as its fields' decimal text joined with commas, e.g.
//! `45,60,10,70,22,0.30,0,0`. Decoding is deliberately lenient: a lookup
//! past the last token yields `None`, and a token that does not parse
//! also yields `None`, so a record cut short by a corrupted transmission
//! degrades field by field instead of being dropped.

use core::fmt::Write;

use heapless::String;

use crate::frame::FrameError;

/// Field separator byte
pub const SEPARATOR: u8 = b',';

/// Read-only view over comma-separated field text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fields<'a> {
    text: &'a str,
}

impl<'a> Fields<'a> {
    /// Wrap field text
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Wrap decoded payload bytes
    ///
    /// Bytes after the first invalid UTF-8 sequence are ignored, which
    /// drops only the corrupted tail fields.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        let text = match core::str::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or(""),
        };
        Self { text }
    }

    /// The underlying text
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Number of tokens
    ///
    /// One more than the number of separators; empty text has none.
    pub fn len(&self) -> usize {
        if self.text.is_empty() {
            0
        } else {
            self.text.split(SEPARATOR as char).count()
        }
    }

    /// Check if there are no tokens
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Token at `index`, or `None` past the last token
    pub fn get(&self, index: usize) -> Option<&'a str> {
        if self.text.is_empty() {
            return None;
        }
        self.text.split(SEPARATOR as char).nth(index)
    }

    /// Iterate over all tokens
    pub fn iter(&self) -> impl Iterator<Item = &'a str> {
        let text = self.text;
        text.split(SEPARATOR as char).filter(move |_| !text.is_empty())
    }

    /// Integer value of the token at `index`
    ///
    /// Accepts a leading integer prefix (`"12abc"` → 12, `"0.30"` → 0).
    pub fn int(&self, index: usize) -> Option<i32> {
        self.get(index).and_then(parse_int_prefix)
    }

    /// Floating point value of the token at `index`
    pub fn float(&self, index: usize) -> Option<f32> {
        let token = self.get(index)?;
        token
            .trim()
            .parse::<f32>()
            .ok()
            .or_else(|| parse_int_prefix(token).map(|v| v as f32))
    }

    /// Boolean value of the token at `index` (any non-zero integer is true)
    pub fn flag(&self, index: usize) -> Option<bool> {
        self.int(index).map(|v| v != 0)
    }

    /// Integer at `index` saturated into `u8`, zero when absent
    pub fn u8_or_zero(&self, index: usize) -> u8 {
        self.int(index).map_or(0, |v| v.clamp(0, u8::MAX as i32) as u8)
    }

    /// Integer at `index` saturated into `i8`, zero when absent
    pub fn i8_or_zero(&self, index: usize) -> i8 {
        self.int(index)
            .map_or(0, |v| v.clamp(i8::MIN as i32, i8::MAX as i32) as i8)
    }
}

/// Parse the leading integer of a token
///
/// Leading whitespace and a sign are accepted; parsing stops at the first
/// non-digit. Returns `None` if no digit was found. Out-of-range values
/// saturate.
pub fn parse_int_prefix(token: &str) -> Option<i32> {
    let bytes = token.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for &c in digits {
        if !c.is_ascii_digit() {
            break;
        }
        seen = true;
        value = (value * 10 + i64::from(c - b'0')).min(i64::from(i32::MAX) + 1);
    }

    if !seen {
        return None;
    }
    let value = if negative { -value } else { value };
    Some(value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}

/// Builder for comma-separated field text
///
/// Inserts separators between fields; numbers use their decimal text,
/// floats two decimals, flags `0`/`1`.
pub struct FieldWriter<'a, const N: usize> {
    out: &'a mut String<N>,
    count: usize,
}

impl<'a, const N: usize> FieldWriter<'a, N> {
    /// Start writing fields at the end of `out`
    pub fn new(out: &'a mut String<N>) -> Self {
        Self { out, count: 0 }
    }

    /// Number of fields written so far
    pub fn count(&self) -> usize {
        self.count
    }

    fn separator(&mut self) -> Result<(), FrameError> {
        if self.count > 0 {
            self.out
                .push(SEPARATOR as char)
                .map_err(|_| FrameError::PayloadTooLarge)?;
        }
        self.count += 1;
        Ok(())
    }

    /// Append an integer field
    pub fn int(&mut self, value: impl Into<i32>) -> Result<(), FrameError> {
        self.separator()?;
        write!(self.out, "{}", value.into()).map_err(|_| FrameError::PayloadTooLarge)
    }

    /// Append a floating point field with two decimals
    pub fn float(&mut self, value: f32) -> Result<(), FrameError> {
        self.separator()?;
        write!(self.out, "{:.2}", value).map_err(|_| FrameError::PayloadTooLarge)
    }

    /// Append a boolean field as `0` or `1`
    pub fn flag(&mut self, value: bool) -> Result<(), FrameError> {
        self.int(i32::from(value))
    }
}
