use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::Account;

/// Position of a receipt in the ledger (1-based, monotonic, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptId(pub u64);

impl ReceiptId {
    /// The raw sequence number.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<ReceiptId> for u64 {
    fn from(id: ReceiptId) -> Self {
        id.0
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r#{}", self.0)
    }
}

/// An immutable record of one reward event.
///
/// Field order is part of the contract: recipient, transfer reference,
/// version, timestamp, metadata URI. None of the fields is validated;
/// empty strings and a zero timestamp are stored as given.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Receipt {
    /// Account that received the reward.
    pub recipient: Account,
    /// Reference to the external transfer (usually a transaction hash).
    pub transfer_tx: String,
    /// Free-form software version tag of the issuer.
    pub version: String,
    /// Caller-supplied seconds since the Unix epoch.
    pub timestamp: u64,
    /// Pointer to off-ledger metadata, e.g. `ipfs://...`.
    pub metadata_uri: String,
}

impl Receipt {
    pub fn new(
        recipient: Account,
        transfer_tx: impl Into<String>,
        version: impl Into<String>,
        timestamp: u64,
        metadata_uri: impl Into<String>,
    ) -> Self {
        Self {
            recipient,
            transfer_tx: transfer_tx.into(),
            version: version.into(),
            timestamp,
            metadata_uri: metadata_uri.into(),
        }
    }

    /// The fields as a tuple in their fixed order.
    pub fn as_tuple(&self) -> (Account, &str, &str, u64, &str) {
        (
            self.recipient,
            &self.transfer_tx,
            &self.version,
            self.timestamp,
            &self.metadata_uri,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ACCOUNT_LEN;

    #[test]
    fn receipt_id_display() {
        assert_eq!(format!("{}", ReceiptId(42)), "r#42");
    }

    #[test]
    fn receipt_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&ReceiptId(7)).unwrap(), "7");
    }

    #[test]
    fn tuple_preserves_field_order() {
        let recipient = Account::from_raw([2; ACCOUNT_LEN]);
        let receipt = Receipt::new(recipient, "0xabc", "v1", 1000, "ipfs://x");
        assert_eq!(
            receipt.as_tuple(),
            (recipient, "0xabc", "v1", 1000, "ipfs://x")
        );
    }

    #[test]
    fn empty_fields_are_kept() {
        let receipt = Receipt::new(Account::ZERO, "", "", 0, "");
        assert!(receipt.transfer_tx.is_empty());
        assert_eq!(receipt.timestamp, 0);
    }
}
