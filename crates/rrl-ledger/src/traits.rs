use rrl_types::{Account, LedgerEvent, Receipt, ReceiptId, Role};

use crate::error::LedgerError;

/// Write boundary for ledger mutations.
///
/// Every call is atomic: it either applies its full effect (state change
/// plus event) or fails without changing anything.
pub trait LedgerWriter: Send + Sync {
    fn add_receipt(&self, caller: Account, receipt: Receipt) -> Result<ReceiptId, LedgerError>;

    fn grant_role(&self, role: Role, account: Account, caller: Account)
        -> Result<bool, LedgerError>;

    fn revoke_role(
        &self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError>;

    fn renounce_role(
        &self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError>;
}

/// Read boundary for ledger queries. Reads never require a role.
pub trait LedgerReader: Send + Sync {
    fn receipt(&self, id: u64) -> Result<Receipt, LedgerError>;

    fn count(&self) -> Result<u64, LedgerError>;

    fn receipts(&self, from: u64, to: u64) -> Result<Vec<Receipt>, LedgerError>;

    fn has_role(&self, role: &Role, account: &Account) -> Result<bool, LedgerError>;

    fn role_admin(&self, role: &Role) -> Result<Role, LedgerError>;

    fn role_member_count(&self, role: &Role) -> Result<usize, LedgerError>;

    fn role_member(&self, role: &Role, index: usize) -> Result<Account, LedgerError>;

    fn events(&self, from: usize) -> Result<Vec<LedgerEvent>, LedgerError>;

    fn role_members(&self, role: &Role) -> Result<Vec<Account>, LedgerError> {
        let count = self.role_member_count(role)?;
        (0..count).map(|index| self.role_member(role, index)).collect()
    }
}
