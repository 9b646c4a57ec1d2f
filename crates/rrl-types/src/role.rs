use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

use crate::error::{decode_fixed, TypeError};

/// Width of a role identifier in bytes.
pub const ROLE_LEN: usize = 32;

/// Tag hashed to obtain the writer role identifier.
pub const WRITER_ROLE_NAME: &str = "WRITER_ROLE";

/// Opaque 32-byte role identifier.
///
/// Well-known roles are derived deterministically: the admin role is the
/// all-zero value and named roles are the Keccak-256 digest of their name.
/// Any identifier is a valid role; roles nobody was granted are simply empty.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    hash: [u8; ROLE_LEN],
}

impl Role {
    /// The admin role. By default it administers every role, itself included.
    pub const ADMIN: Role = Role {
        hash: [0; ROLE_LEN],
    };

    /// Derive a role identifier from its name (`keccak256(name)`).
    pub fn from_name(name: &str) -> Self {
        let digest = Keccak256::digest(name.as_bytes());
        let mut hash = [0u8; ROLE_LEN];
        hash.copy_from_slice(&digest);
        Self { hash }
    }

    /// The role required to append receipts.
    pub fn writer() -> Self {
        Self::from_name(WRITER_ROLE_NAME)
    }

    /// Create from a raw 32-byte identifier.
    pub const fn from_raw(hash: [u8; ROLE_LEN]) -> Self {
        Self { hash }
    }

    /// Parse a role from user input.
    ///
    /// Accepts a `0x`-prefixed identifier, the aliases `ADMIN` /
    /// `DEFAULT_ADMIN_ROLE` and `WRITER`, or any other name, which is hashed.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.starts_with("0x") || s.starts_with("0X") {
            return Self::from_hex(s);
        }
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" | "DEFAULT_ADMIN_ROLE" => Ok(Self::ADMIN),
            "WRITER" => Ok(Self::writer()),
            _ => Ok(Self::from_name(s)),
        }
    }

    /// Parse from 64 hex characters, optionally prefixed with `0x`.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        decode_fixed::<ROLE_LEN>(s).map(Self::from_raw)
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; ROLE_LEN] {
        &self.hash
    }

    /// Full `0x`-prefixed hex string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }

    /// Human-friendly label for the well-known roles, hex otherwise.
    pub fn label(&self) -> String {
        if *self == Self::ADMIN {
            "ADMIN".into()
        } else if *self == Self::writer() {
            "WRITER".into()
        } else {
            format!("0x{}", hex::encode(&self.hash[..4]))
        }
    }

    /// Returns `true` for the admin role.
    pub fn is_admin(&self) -> bool {
        *self == Self::ADMIN
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::ADMIN
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Role({})", self.label())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_all_zero() {
        assert_eq!(Role::ADMIN.as_bytes(), &[0u8; ROLE_LEN]);
        assert_eq!(Role::ADMIN.to_string(), format!("0x{}", "0".repeat(64)));
        assert!(Role::ADMIN.is_admin());
    }

    #[test]
    fn from_name_is_keccak256() {
        // keccak256("") is a well-known constant.
        assert_eq!(
            Role::from_name("").to_string(),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn writer_role_is_hash_of_tag() {
        let writer = Role::writer();
        assert_eq!(writer, Role::from_name("WRITER_ROLE"));
        assert_ne!(writer, Role::ADMIN);
        assert!(!writer.is_admin());
    }

    #[test]
    fn different_names_produce_different_roles() {
        assert_ne!(Role::from_name("WRITER_ROLE"), Role::from_name("DUMMY_ROLE"));
    }

    #[test]
    fn parse_aliases_and_names() {
        assert_eq!(Role::parse("admin").unwrap(), Role::ADMIN);
        assert_eq!(Role::parse("DEFAULT_ADMIN_ROLE").unwrap(), Role::ADMIN);
        assert_eq!(Role::parse("writer").unwrap(), Role::writer());
        assert_eq!(Role::parse("WRITER_ROLE").unwrap(), Role::writer());
        assert_eq!(Role::parse("DUMMY_ROLE").unwrap(), Role::from_name("DUMMY_ROLE"));
    }

    #[test]
    fn parse_hex_roundtrip() {
        let role = Role::from_name("DUMMY_ROLE");
        assert_eq!(Role::parse(&role.to_hex()).unwrap(), role);
        assert!(matches!(
            Role::parse("0x1234"),
            Err(TypeError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn labels() {
        assert_eq!(Role::ADMIN.label(), "ADMIN");
        assert_eq!(Role::writer().label(), "WRITER");
        assert!(Role::from_name("X").label().starts_with("0x"));
    }

    #[test]
    fn serde_uses_hex_string() {
        let role = Role::writer();
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, format!("\"{}\"", role.to_hex()));
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, role);
    }

    #[test]
    fn ordering_is_consistent() {
        assert!(Role::from_raw([0; 32]) < Role::from_raw([1; 32]));
    }
}
