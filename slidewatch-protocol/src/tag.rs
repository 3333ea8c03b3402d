//! Role tags
//!
//! Every packet starts with a two-letter tag and a comma. Receivers
//! search for the tag they expect, which lets several producers share one
//! channel. The pairing is fixed per link hop: the sensor node sends `GW`
//! (the gateway listens for `GW`), and the gateway relays as `EN` (the end
//! node listens for `EN`).

use crate::frame::FrameError;

/// Length of a role tag in bytes
pub const TAG_LEN: usize = 2;

/// Two-character ASCII role tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RoleTag([u8; TAG_LEN]);

impl RoleTag {
    /// Tag on the sensor node → gateway hop
    pub const GW: RoleTag = RoleTag(*b"GW");
    /// Tag on the gateway → end node hop
    pub const EN: RoleTag = RoleTag(*b"EN");

    /// Create a tag from two ASCII alphanumeric characters
    pub fn new(tag: &str) -> Result<Self, FrameError> {
        let bytes = tag.as_bytes();
        if bytes.len() != TAG_LEN || !bytes.iter().all(u8::is_ascii_alphanumeric) {
            return Err(FrameError::InvalidRoleTag);
        }
        Ok(Self([bytes[0], bytes[1]]))
    }

    /// Tag bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Tag as text
    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII alphanumerics
        core::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl core::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RoleTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RoleTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: &str = serde::Deserialize::deserialize(deserializer)?;
        RoleTag::new(text).map_err(|_| serde::de::Error::custom("role tag must be two ASCII letters"))
    }
}
