use rrl_access::RoleRegistry;
use rrl_types::{LedgerEvent, Receipt};

use crate::state::ReceiptLedger;

/// Result of ledger state validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub receipt_count: u64,
    pub stored_event_count: u64,
    pub sequence_monotonic: bool,
    pub payloads_match: bool,
    pub roles_match: bool,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if all checks passed.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific integrity violation detected during validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Receipt id the violation refers to (0 when it concerns the whole log).
    pub id: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    PayloadMismatch,
    EventCountMismatch,
    RoleMismatch,
}

/// Cross-checks stored state against the event log.
///
/// Receipts must match their `RewardReceiptStored` events, and role
/// membership must equal what replaying the `RoleGranted` and `RoleRevoked`
/// events through the registry's own access checks produces.
pub struct StateValidator;

impl StateValidator {
    /// Validate receipts and roles, collecting every violation.
    pub fn validate(ledger: &ReceiptLedger) -> ValidationReport {
        let receipts = ledger.stored_receipts();
        let stored: Vec<_> = ledger
            .events(0)
            .iter()
            .filter(|event| matches!(event, LedgerEvent::RewardReceiptStored { .. }))
            .collect();

        let mut violations = Vec::new();
        let mut sequence_monotonic = true;
        let mut payloads_match = true;

        if stored.len() != receipts.len() {
            violations.push(Violation {
                id: 0,
                kind: ViolationKind::EventCountMismatch,
                description: format!(
                    "{} receipts stored but {} RewardReceiptStored events logged",
                    receipts.len(),
                    stored.len()
                ),
            });
        }

        for (index, event) in stored.iter().enumerate() {
            let expected_id = index as u64 + 1;
            let LedgerEvent::RewardReceiptStored { id, .. } = event else {
                continue;
            };

            if id.get() != expected_id {
                sequence_monotonic = false;
                violations.push(Violation {
                    id: id.get(),
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected receipt id {expected_id}, got {}", id.get()),
                });
            }

            if let Some(receipt) = receipts.get(index) {
                if !event_matches(event, receipt) {
                    payloads_match = false;
                    violations.push(Violation {
                        id: expected_id,
                        kind: ViolationKind::PayloadMismatch,
                        description: format!(
                            "receipt {expected_id} differs from its RewardReceiptStored event"
                        ),
                    });
                }
            }
        }

        let role_violations = check_roles(ledger.roles(), ledger.events(0));
        let roles_match = role_violations.is_empty();
        violations.extend(role_violations);

        ValidationReport {
            receipt_count: receipts.len() as u64,
            stored_event_count: stored.len() as u64,
            sequence_monotonic,
            payloads_match,
            roles_match,
            violations,
        }
    }
}

fn role_violation(description: String) -> Violation {
    Violation {
        id: 0,
        kind: ViolationKind::RoleMismatch,
        description,
    }
}

fn check_roles(stored: &RoleRegistry, events: &[LedgerEvent]) -> Vec<Violation> {
    let replayed = match replay_roles(events) {
        Ok(replayed) => replayed,
        Err(reason) => return vec![role_violation(reason)],
    };

    let mut roles: Vec<_> = stored.roles().chain(replayed.roles()).copied().collect();
    roles.sort();
    roles.dedup();

    roles
        .into_iter()
        .filter_map(|role| {
            if stored.role_members(&role) != replayed.role_members(&role) {
                Some(role_violation(format!(
                    "members of role {role} differ from the role event log"
                )))
            } else if stored.role_admin(&role) != replayed.role_admin(&role) {
                Some(role_violation(format!(
                    "admin of role {role} differs from the bootstrap configuration"
                )))
            } else {
                None
            }
        })
        .collect()
}

/// Rebuild the registry from the role events, re-running every access check.
///
/// The log must open with the bootstrap grants; a revocation whose sender is
/// the revoked account replays as a renounce.
fn replay_roles(events: &[LedgerEvent]) -> Result<RoleRegistry, String> {
    let mut role_events = events.iter().filter(|event| {
        matches!(
            event,
            LedgerEvent::RoleGranted { .. } | LedgerEvent::RoleRevoked { .. }
        )
    });

    let Some(first) = role_events.next() else {
        return Ok(RoleRegistry::default());
    };
    let initializer = match first {
        LedgerEvent::RoleGranted {
            account, sender, ..
        } if account == sender => *account,
        event => return Err(format!("role log opens with {event} instead of bootstrap")),
    };

    let (mut registry, bootstrap) = RoleRegistry::bootstrap(initializer);
    let opening = std::iter::once(first)
        .chain(role_events.by_ref().take(bootstrap.len().saturating_sub(1)));
    if !opening.eq(bootstrap.iter()) {
        return Err(format!(
            "role log does not open with the bootstrap of {initializer}"
        ));
    }

    for event in role_events {
        let replayed = match event {
            LedgerEvent::RoleGranted {
                role,
                account,
                sender,
            } => registry.grant_role(*role, *account, *sender),
            LedgerEvent::RoleRevoked {
                role,
                account,
                sender,
            } if account == sender => registry.renounce_role(*role, *account, *sender),
            LedgerEvent::RoleRevoked {
                role,
                account,
                sender,
            } => registry.revoke_role(*role, *account, *sender),
            LedgerEvent::RewardReceiptStored { .. } => continue,
        };
        match replayed {
            Ok(Some(ref emitted)) if emitted == event => {}
            Ok(_) => return Err(format!("{event} does not change role membership on replay")),
            Err(e) => return Err(format!("{event} is not authorized on replay: {e}")),
        }
    }
    Ok(registry)
}

fn event_matches(event: &LedgerEvent, receipt: &Receipt) -> bool {
    match event {
        LedgerEvent::RewardReceiptStored {
            recipient,
            transfer_tx,
            version,
            timestamp,
            metadata_uri,
            ..
        } => {
            *recipient == receipt.recipient
                && *transfer_tx == receipt.transfer_tx
                && *version == receipt.version
                && *timestamp == receipt.timestamp
                && *metadata_uri == receipt.metadata_uri
        }
        _ => false,
    }
}
