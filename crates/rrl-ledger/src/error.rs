use rrl_access::AccessError;
use rrl_types::{Account, Role};

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("ThriveCoinRewardReceipt: must have writer role to store receipt: account {account} is missing role {role}")]
    Unauthorized { account: Account, role: Role },

    #[error("ThriveCoinRewardReceipt: receipt not found: {id}")]
    NotFound { id: u64 },

    #[error("invalid receipt range: from={from}, to={to}")]
    InvalidRange { from: u64, to: u64 },

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("integrity violation: {reason}")]
    Integrity { reason: String },

    #[error("ledger lock poisoned")]
    LockPoisoned,

    #[error("serialization error: {0}")]
    Serialization(String),
}
