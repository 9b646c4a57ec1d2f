//! Append-only, role-gated receipt ledger.
//!
//! This crate provides:
//! - [`ReceiptLedger`], the state machine storing receipts at sequential ids
//!   and forwarding role changes to its [`RoleRegistry`](rrl_access::RoleRegistry)
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - [`InMemoryLedger`], which serializes all operations behind one lock
//! - Snapshots and state validation for persisted ledgers

pub mod error;
pub mod memory;
pub mod state;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use state::{LedgerSnapshot, ReceiptLedger};
pub use traits::{LedgerReader, LedgerWriter};
pub use validation::{StateValidator, ValidationReport, Violation, ViolationKind};
