//! Foundation types for the reward receipt ledger (RRL).
//!
//! Every other RRL crate depends on `rrl-types`.
//!
//! # Key Types
//!
//! - [`Account`] — 20-byte caller / recipient identifier
//! - [`Role`] — 32-byte role identifier ([`Role::ADMIN`], [`Role::writer`])
//! - [`Receipt`] — immutable proof-of-reward record
//! - [`ReceiptId`] — 1-based position of a receipt in the ledger
//! - [`LedgerEvent`] — side effects published to observers

pub mod account;
pub mod error;
pub mod event;
pub mod receipt;
pub mod role;

pub use account::{Account, ACCOUNT_LEN};
pub use error::TypeError;
pub use event::LedgerEvent;
pub use receipt::{Receipt, ReceiptId};
pub use role::{Role, ROLE_LEN, WRITER_ROLE_NAME};
