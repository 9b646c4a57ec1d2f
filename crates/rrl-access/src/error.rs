use rrl_types::{Account, Role};

/// Errors produced by role registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The caller does not hold the role required for the operation.
    #[error("AccessControl: account {account} is missing role {role}")]
    Unauthorized { account: Account, role: Role },

    /// A renounce was attempted on behalf of another account.
    #[error("AccessControl: can only renounce roles for self ({caller} tried to renounce for {account})")]
    SelfOnly { account: Account, caller: Account },

    /// An enumeration index past the end of a role's member set.
    #[error("AccessControl: index {index} out of range for role {role} with {len} members")]
    IndexOutOfRange { role: Role, index: usize, len: usize },

    /// A serialized member set listed the same account twice.
    #[error("duplicate role member: {account}")]
    DuplicateMember { account: Account },
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, AccessError>;
