//! Domain GUIDs and their dashed-hex form used in `_msdcs` query names.

use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// A 16-byte Active Directory domain GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(Uuid);

impl Guid {
    /// Creates a GUID from bytes in canonical (big-endian) order, i.e. the
    /// order in which they appear in the dashed-hex string.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Creates a GUID from the Microsoft wire layout, where the first three
    /// fields are little-endian (as found in `objectGUID` attribute values).
    pub fn from_ms_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes_le(bytes))
    }

    /// Gets the GUID's bytes in canonical order.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for Guid {
    type Err = uuid::Error;

    /// Parses a GUID, with or without braces, in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<[u8; 16]> for Guid {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// Formats canonical-order GUID bytes as lowercase dashed hex
/// (`xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`).
pub fn format_guid(bytes: &[u8; 16]) -> String {
    Guid::from_bytes(*bytes).to_string()
}
