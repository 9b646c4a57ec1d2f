//! The receipt ledger state machine.

use rrl_access::RoleRegistry;
use rrl_types::{Account, LedgerEvent, Receipt, ReceiptId, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::validation::StateValidator;

/// Serializable form of the complete ledger state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub roles: RoleRegistry,
    pub receipts: Vec<Receipt>,
    pub events: Vec<LedgerEvent>,
}

/// Append-only receipt store gated by a [`RoleRegistry`].
///
/// Receipt `n` lives at `receipts[n - 1]`; ids start at 1 and are never
/// reused. Every state change appends to a single ordered event log, and
/// every failed operation leaves both the state and the log untouched.
///
/// `ReceiptLedger` itself is not synchronized. Wrap it in
/// [`InMemoryLedger`](crate::InMemoryLedger) to share it between threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceiptLedger {
    roles: RoleRegistry,
    receipts: Vec<Receipt>,
    events: Vec<LedgerEvent>,
}

impl ReceiptLedger {
    /// Create an empty ledger whose root of trust is `initializer`.
    pub fn new(initializer: Account) -> Self {
        let (roles, events) = RoleRegistry::bootstrap(initializer);
        Self {
            roles,
            receipts: Vec::new(),
            events,
        }
    }

    /// Rebuild a ledger from a snapshot, rejecting inconsistent state.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let ledger = Self::from_snapshot_unchecked(snapshot);
        let report = StateValidator::validate(&ledger);
        if let Some(violation) = report.violations.first() {
            return Err(LedgerError::Integrity {
                reason: violation.description.clone(),
            });
        }
        Ok(ledger)
    }

    /// Append a receipt on behalf of `caller`, who must hold the writer role.
    pub fn add_receipt(
        &mut self,
        caller: Account,
        receipt: Receipt,
    ) -> Result<ReceiptId, LedgerError> {
        let writer = Role::writer();
        if !self.roles.has_role(&writer, &caller) {
            warn!(caller = %caller, "receipt rejected: caller is not a writer");
            return Err(LedgerError::Unauthorized {
                account: caller,
                role: writer,
            });
        }

        let id = ReceiptId(self.count() + 1);
        self.events.push(LedgerEvent::receipt_stored(id, &receipt));
        self.receipts.push(receipt);
        debug!(%id, caller = %caller, "receipt stored");
        Ok(id)
    }

    /// The receipt stored at `id`.
    pub fn get_receipt(&self, id: u64) -> Result<&Receipt, LedgerError> {
        id.checked_sub(1)
            .and_then(|index| usize::try_from(index).ok())
            .and_then(|index| self.receipts.get(index))
            .ok_or(LedgerError::NotFound { id })
    }

    /// Number of receipts stored so far.
    pub fn count(&self) -> u64 {
        self.receipts.len() as u64
    }

    /// Receipts with ids in `from..=to`, clamped to the current count.
    pub fn receipts(&self, from: u64, to: u64) -> Result<&[Receipt], LedgerError> {
        if from == 0 || from > to {
            return Err(LedgerError::InvalidRange { from, to });
        }
        let start = (from - 1).min(self.count()) as usize;
        let end = to.min(self.count()) as usize;
        Ok(&self.receipts[start..end])
    }

    /// The role registry gating this ledger.
    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    /// Grant `role` to `account`. Returns whether membership changed.
    pub fn grant_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        let event = self.roles.grant_role(role, account, caller)?;
        Ok(self.record(event))
    }

    /// Revoke `role` from `account`. Returns whether membership changed.
    pub fn revoke_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        let event = self.roles.revoke_role(role, account, caller)?;
        Ok(self.record(event))
    }

    /// Renounce `role` for `account`; `caller` must be `account`.
    pub fn renounce_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<bool, LedgerError> {
        let event = self.roles.renounce_role(role, account, caller)?;
        Ok(self.record(event))
    }

    /// Events at log positions `from..`, in emission order.
    pub fn events(&self, from: usize) -> &[LedgerEvent] {
        self.events.get(from..).unwrap_or_default()
    }

    /// Total number of events emitted.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Copy of the full state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            roles: self.roles.clone(),
            receipts: self.receipts.clone(),
            events: self.events.clone(),
        }
    }

    /// BLAKE3 digest of the serialized state.
    pub fn state_hash(&self) -> Result<[u8; 32], LedgerError> {
        let encoded = serde_json::to_vec(&self.snapshot())
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"rrl-state-v1:");
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }

    pub(crate) fn from_snapshot_unchecked(snapshot: LedgerSnapshot) -> Self {
        Self {
            roles: snapshot.roles,
            receipts: snapshot.receipts,
            events: snapshot.events,
        }
    }

    pub(crate) fn stored_receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    fn record(&mut self, event: Option<LedgerEvent>) -> bool {
        match event {
            Some(event) => {
                self.events.push(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rrl_access::AccessError;
    use rrl_types::ACCOUNT_LEN;

    fn account(seed: u8) -> Account {
        Account::from_raw([seed; ACCOUNT_LEN])
    }

    fn receipt(recipient: Account, version: &str) -> Receipt {
        Receipt::new(
            recipient,
            "0x8f53e69ab059c1d1470278ef40a71762abe7211fc57d923fe046317402099ae0",
            version,
            1_700_000_000,
            "ipfs://my-receipt",
        )
    }

    #[test]
    fn new_ledger_is_empty_and_bootstrapped() {
        let ledger = ReceiptLedger::new(account(0));
        assert_eq!(ledger.count(), 0);
        assert!(ledger.roles().has_role(&Role::ADMIN, &account(0)));
        assert!(ledger.roles().has_role(&Role::writer(), &account(0)));
        assert_eq!(ledger.event_count(), 2);
    }

    #[test]
    fn first_receipt_gets_id_one() {
        let mut ledger = ReceiptLedger::new(account(0));
        let stored = Receipt::new(account(10), "0xabc", "v1", 1000, "ipfs://x");
        let id = ledger.add_receipt(account(0), stored.clone()).unwrap();

        assert_eq!(id, ReceiptId(1));
        assert_eq!(ledger.count(), 1);
        assert_eq!(
            ledger.get_receipt(1).unwrap().as_tuple(),
            (account(10), "0xabc", "v1", 1000, "ipfs://x")
        );
        assert_eq!(
            ledger.events(2),
            &[LedgerEvent::receipt_stored(ReceiptId(1), &stored)]
        );
    }

    #[test]
    fn ids_increase_with_each_receipt() {
        let mut ledger = ReceiptLedger::new(account(0));
        for n in 1..=3 {
            let id = ledger
                .add_receipt(account(0), receipt(account(2), &format!("core-app@1.3.{n}")))
                .unwrap();
            assert_eq!(id, ReceiptId(n));
        }
        assert_eq!(ledger.count(), 3);
        assert_eq!(ledger.get_receipt(3).unwrap().version, "core-app@1.3.3");
    }

    #[test]
    fn zero_and_past_end_are_not_found() {
        let mut ledger = ReceiptLedger::new(account(0));
        assert_eq!(ledger.get_receipt(0), Err(LedgerError::NotFound { id: 0 }));
        assert_eq!(ledger.get_receipt(1), Err(LedgerError::NotFound { id: 1 }));

        ledger.add_receipt(account(0), receipt(account(2), "v")).unwrap();
        assert_eq!(ledger.get_receipt(0), Err(LedgerError::NotFound { id: 0 }));
        assert_eq!(ledger.get_receipt(2), Err(LedgerError::NotFound { id: 2 }));
        assert_eq!(
            ledger.get_receipt(u64::MAX),
            Err(LedgerError::NotFound { id: u64::MAX })
        );
        assert!(LedgerError::NotFound { id: 2 }
            .to_string()
            .starts_with("ThriveCoinRewardReceipt: receipt not found"));
    }

    #[test]
    fn content_is_not_validated() {
        let mut ledger = ReceiptLedger::new(account(0));
        let empty = Receipt::new(Account::ZERO, "", "", 0, "");
        let id = ledger.add_receipt(account(0), empty.clone()).unwrap();
        assert_eq!(ledger.get_receipt(id.get()).unwrap(), &empty);
    }

    #[test]
    fn non_writer_cannot_add_and_nothing_changes() {
        let mut ledger = ReceiptLedger::new(account(0));
        let before = ledger.snapshot();

        let err = ledger
            .add_receipt(account(2), receipt(account(2), "v"))
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::Unauthorized {
                account: account(2),
                role: Role::writer(),
            }
        );
        assert!(err
            .to_string()
            .starts_with("ThriveCoinRewardReceipt: must have writer role to store receipt"));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn granted_writer_can_add_and_stranger_cannot() {
        let mut ledger = ReceiptLedger::new(account(0));
        assert!(ledger
            .grant_role(Role::writer(), account(1), account(0))
            .unwrap());
        ledger.add_receipt(account(1), receipt(account(2), "v")).unwrap();
        assert!(matches!(
            ledger.add_receipt(account(9), receipt(account(2), "v")),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn new_admin_revokes_writer() {
        let mut ledger = ReceiptLedger::new(account(0));
        ledger
            .grant_role(Role::writer(), account(1), account(0))
            .unwrap();
        ledger.grant_role(Role::ADMIN, account(4), account(0)).unwrap();
        assert!(ledger
            .revoke_role(Role::writer(), account(1), account(4))
            .unwrap());
        assert!(matches!(
            ledger.add_receipt(account(1), receipt(account(2), "v")),
            Err(LedgerError::Unauthorized { .. })
        ));
    }

    #[test]
    fn role_failures_surface_as_access_errors() {
        let mut ledger = ReceiptLedger::new(account(0));
        let events_before = ledger.event_count();
        assert_eq!(
            ledger.grant_role(Role::writer(), account(1), account(1)),
            Err(LedgerError::Access(AccessError::Unauthorized {
                account: account(1),
                role: Role::ADMIN,
            }))
        );
        assert!(matches!(
            ledger.renounce_role(Role::writer(), account(0), account(1)),
            Err(LedgerError::Access(AccessError::SelfOnly { .. }))
        ));
        assert_eq!(ledger.event_count(), events_before);
    }

    #[test]
    fn idempotent_role_changes_emit_nothing() {
        let mut ledger = ReceiptLedger::new(account(0));
        let before = ledger.event_count();
        assert!(!ledger
            .grant_role(Role::writer(), account(0), account(0))
            .unwrap());
        assert!(!ledger
            .revoke_role(Role::from_name("DUMMY_ROLE"), account(3), account(0))
            .unwrap());
        assert_eq!(ledger.event_count(), before);
    }

    #[test]
    fn events_are_ordered_across_components() {
        let mut ledger = ReceiptLedger::new(account(0));
        ledger
            .grant_role(Role::writer(), account(1), account(0))
            .unwrap();
        ledger.add_receipt(account(1), receipt(account(2), "v")).unwrap();
        ledger
            .renounce_role(Role::writer(), account(1), account(1))
            .unwrap();

        let names: Vec<&str> = ledger.events(0).iter().map(LedgerEvent::name).collect();
        assert_eq!(
            names,
            vec![
                "RoleGranted",
                "RoleGranted",
                "RoleGranted",
                "RewardReceiptStored",
                "RoleRevoked"
            ]
        );
        assert!(ledger.events(100).is_empty());
    }

    #[test]
    fn range_reads_are_inclusive_and_clamped() {
        let mut ledger = ReceiptLedger::new(account(0));
        for n in 0..3 {
            ledger
                .add_receipt(account(0), receipt(account(n), "v"))
                .unwrap();
        }
        assert_eq!(ledger.receipts(1, 2).unwrap().len(), 2);
        assert_eq!(ledger.receipts(2, 100).unwrap().len(), 2);
        assert!(ledger.receipts(5, 9).unwrap().is_empty());
        assert_eq!(
            ledger.receipts(0, 2),
            Err(LedgerError::InvalidRange { from: 0, to: 2 })
        );
        assert_eq!(
            ledger.receipts(3, 2),
            Err(LedgerError::InvalidRange { from: 3, to: 2 })
        );
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut ledger = ReceiptLedger::new(account(0));
        ledger.add_receipt(account(0), receipt(account(2), "v")).unwrap();
        let restored = ReceiptLedger::restore(ledger.snapshot()).unwrap();
        assert_eq!(restored, ledger);
        assert_eq!(restored.state_hash().unwrap(), ledger.state_hash().unwrap());
    }

    #[test]
    fn restore_rejects_missing_receipt_events() {
        let mut ledger = ReceiptLedger::new(account(0));
        ledger.add_receipt(account(0), receipt(account(2), "v")).unwrap();
        let mut snapshot = ledger.snapshot();
        snapshot.events.pop();
        assert!(matches!(
            ReceiptLedger::restore(snapshot),
            Err(LedgerError::Integrity { .. })
        ));
    }

    #[test]
    fn restore_rejects_member_added_outside_the_log() {
        let intruder = account(66);
        let mut snapshot = ReceiptLedger::new(account(0)).snapshot();
        snapshot
            .roles
            .grant_role(Role::ADMIN, intruder, account(0))
            .unwrap();
        assert!(snapshot.roles.has_role(&Role::ADMIN, &intruder));

        let err = ReceiptLedger::restore(snapshot).unwrap_err();
        assert!(matches!(err, LedgerError::Integrity { .. }));
        assert!(err.to_string().contains("differ from the role event log"));
    }

    #[test]
    fn restore_accepts_role_changes_made_through_the_ledger() {
        let mut ledger = ReceiptLedger::new(account(0));
        ledger.grant_role(Role::writer(), account(1), account(0)).unwrap();
        ledger.renounce_role(Role::writer(), account(0), account(0)).unwrap();
        ledger.add_receipt(account(1), receipt(account(2), "v")).unwrap();

        let restored = ReceiptLedger::restore(ledger.snapshot()).unwrap();
        assert_eq!(restored, ledger);
    }

    #[test]
    fn state_hash_changes_with_state() {
        let mut ledger = ReceiptLedger::new(account(0));
        let before = ledger.state_hash().unwrap();
        ledger.add_receipt(account(0), receipt(account(2), "v")).unwrap();
        assert_ne!(ledger.state_hash().unwrap(), before);
    }

    proptest! {
        #[test]
        fn receipts_are_returned_in_call_order(
            entries in proptest::collection::vec(
                (any::<u8>(), ".{0,12}", ".{0,12}", any::<u64>(), ".{0,12}"),
                0..40,
            )
        ) {
            let mut ledger = ReceiptLedger::new(account(0));
            let mut added = Vec::new();
            for (seed, tx, version, timestamp, uri) in entries {
                let r = Receipt::new(account(seed), tx, version, timestamp, uri);
                let id = ledger.add_receipt(account(0), r.clone()).unwrap();
                prop_assert_eq!(id, ReceiptId(added.len() as u64 + 1));
                added.push(r);
            }
            prop_assert_eq!(ledger.count(), added.len() as u64);
            for (index, r) in added.iter().enumerate() {
                prop_assert_eq!(ledger.get_receipt(index as u64 + 1).unwrap(), r);
            }
            prop_assert!(ledger.get_receipt(0).is_err());
            prop_assert!(ledger.get_receipt(ledger.count() + 1).is_err());
        }
    }
}
