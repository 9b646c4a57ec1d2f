use std::fmt;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::receipt::{Receipt, ReceiptId};
use crate::role::Role;

/// A side effect published to external observers.
///
/// Events are appended to a single ordered log in the order the state
/// changes happened. Operations that fail or change nothing emit nothing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// A receipt was appended.
    RewardReceiptStored {
        id: ReceiptId,
        recipient: Account,
        transfer_tx: String,
        version: String,
        timestamp: u64,
        metadata_uri: String,
    },
    /// `account` became a member of `role`, on behalf of `sender`.
    RoleGranted {
        role: Role,
        account: Account,
        sender: Account,
    },
    /// `account` stopped being a member of `role`, on behalf of `sender`.
    RoleRevoked {
        role: Role,
        account: Account,
        sender: Account,
    },
}

impl LedgerEvent {
    /// Build the event recording that `receipt` was stored at `id`.
    pub fn receipt_stored(id: ReceiptId, receipt: &Receipt) -> Self {
        Self::RewardReceiptStored {
            id,
            recipient: receipt.recipient,
            transfer_tx: receipt.transfer_tx.clone(),
            version: receipt.version.clone(),
            timestamp: receipt.timestamp,
            metadata_uri: receipt.metadata_uri.clone(),
        }
    }

    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RewardReceiptStored { .. } => "RewardReceiptStored",
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RewardReceiptStored {
                id,
                recipient,
                version,
                ..
            } => write!(f, "{} {id} recipient={recipient} version={version}", self.name()),
            Self::RoleGranted {
                role,
                account,
                sender,
            }
            | Self::RoleRevoked {
                role,
                account,
                sender,
            } => write!(
                f,
                "{} role={} account={account} sender={sender}",
                self.name(),
                role.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::ACCOUNT_LEN;

    #[test]
    fn receipt_stored_copies_every_field() {
        let receipt = Receipt::new(
            Account::from_raw([3; ACCOUNT_LEN]),
            "0xabc",
            "core-app@1.3.4",
            1_700_000_000,
            "ipfs://my-receipt",
        );
        let event = LedgerEvent::receipt_stored(ReceiptId(3), &receipt);
        match event {
            LedgerEvent::RewardReceiptStored {
                id,
                recipient,
                transfer_tx,
                version,
                timestamp,
                metadata_uri,
            } => {
                assert_eq!(id, ReceiptId(3));
                assert_eq!(recipient, receipt.recipient);
                assert_eq!(transfer_tx, "0xabc");
                assert_eq!(version, "core-app@1.3.4");
                assert_eq!(timestamp, 1_700_000_000);
                assert_eq!(metadata_uri, "ipfs://my-receipt");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn serde_is_internally_tagged() {
        let event = LedgerEvent::RoleGranted {
            role: Role::writer(),
            account: Account::from_raw([1; ACCOUNT_LEN]),
            sender: Account::ZERO,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "RoleGranted");
        let parsed: LedgerEvent = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn display_starts_with_name() {
        let event = LedgerEvent::RoleRevoked {
            role: Role::ADMIN,
            account: Account::ZERO,
            sender: Account::ZERO,
        };
        let s = event.to_string();
        assert!(s.starts_with("RoleRevoked"));
        assert!(s.contains("role=ADMIN"));
    }
}
