use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rrl_types::{Account, LedgerEvent, Receipt, ReceiptId, Role};

use crate::error::LedgerError;
use crate::state::{LedgerSnapshot, ReceiptLedger};
use crate::traits::{LedgerReader, LedgerWriter};
use crate::validation::{StateValidator, ValidationReport};

/// Thread-safe ledger for embedding, tests and the CLI.
///
/// A single lock guards both the receipts and the role registry, so every
/// mutation is ordered against every other one and reads always observe a
/// fully applied state.
pub struct InMemoryLedger {
    inner: RwLock<ReceiptLedger>,
}

impl InMemoryLedger {
    /// Create a ledger bootstrapped with `initializer` as admin and writer.
    pub fn new(initializer: Account) -> Self {
        Self::from_ledger(ReceiptLedger::new(initializer))
    }

    pub fn from_ledger(ledger: ReceiptLedger) -> Self {
        Self {
            inner: RwLock::new(ledger),
        }
    }

    /// Rebuild from a snapshot, validating it first.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        ReceiptLedger::restore(snapshot).map(Self::from_ledger)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(self.read()?.snapshot())
    }

    pub fn state_hash(&self) -> Result<[u8; 32], LedgerError> {
        self.read()?.state_hash()
    }

    pub fn validate(&self) -> Result<ValidationReport, LedgerError> {
        let ledger = self.read()?;
        Ok(StateValidator::validate(&ledger))
    }

    pub fn event_count(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.event_count())
    }

    pub fn into_inner(self) -> Result<ReceiptLedger, LedgerError> {
        self.inner.into_inner().map_err(|_| LedgerError::LockPoisoned)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ReceiptLedger>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ReceiptLedger>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl LedgerWriter for InMemoryLedger {
    fn add_receipt(&self, caller: Account, receipt: Receipt) -> Result<ReceiptId, LedgerError> {
        self.write()?.add_receipt(caller, receipt)
    }

    fn grant_role(
        &self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        self.write()?.grant_role(role, account, caller)
    }

    fn revoke_role(
        &self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        self.write()?.revoke_role(role, account, caller)
    }

    fn renounce_role(
        &self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        self.write()?.renounce_role(role, account, caller)
    }
}

impl LedgerReader for InMemoryLedger {
    fn receipt(&self, id: u64) -> Result<Receipt, LedgerError> {
        self.read()?.get_receipt(id).cloned()
    }

    fn count(&self) -> Result<u64, LedgerError> {
        Ok(self.read()?.count())
    }

    fn receipts(&self, from: u64, to: u64) -> Result<Vec<Receipt>, LedgerError> {
        Ok(self.read()?.receipts(from, to)?.to_vec())
    }

    fn has_role(&self, role: &Role, account: &Account) -> Result<bool, LedgerError> {
        Ok(self.read()?.roles().has_role(role, account))
    }

    fn role_admin(&self, role: &Role) -> Result<Role, LedgerError> {
        Ok(self.read()?.roles().role_admin(role))
    }

    fn role_member_count(&self, role: &Role) -> Result<usize, LedgerError> {
        Ok(self.read()?.roles().role_member_count(role))
    }

    fn role_member(&self, role: &Role, index: usize) -> Result<Account, LedgerError> {
        Ok(self.read()?.roles().role_member(role, index)?)
    }

    fn role_members(&self, role: &Role) -> Result<Vec<Account>, LedgerError> {
        Ok(self.read()?.roles().role_members(role))
    }

    fn events(&self, from: usize) -> Result<Vec<LedgerEvent>, LedgerError> {
        Ok(self.read()?.events(from).to_vec())
    }
}
