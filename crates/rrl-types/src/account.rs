use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{decode_fixed, TypeError};

/// Width of an account identifier in bytes.
pub const ACCOUNT_LEN: usize = 20;

/// Opaque identifier of a caller or receipt recipient.
///
/// Accounts are rendered as `0x`-prefixed lowercase hex and serialize as that
/// string, so they can be used as JSON map keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account {
    bytes: [u8; ACCOUNT_LEN],
}

impl Account {
    /// The all-zero account.
    pub const ZERO: Account = Account {
        bytes: [0; ACCOUNT_LEN],
    };

    /// Create from raw bytes.
    pub const fn from_raw(bytes: [u8; ACCOUNT_LEN]) -> Self {
        Self { bytes }
    }

    /// The raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; ACCOUNT_LEN] {
        &self.bytes
    }

    /// Full `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("0x{}", hex::encode(&self.bytes[..4]))
    }

    /// Parse from 40 hex characters, optionally prefixed with `0x`.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_fixed::<ACCOUNT_LEN>(s).map(Self::from_raw)
    }
}

impl FromStr for Account {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.short_id())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Account {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Account {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
