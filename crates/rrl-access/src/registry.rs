//! Role membership and the admin-role hierarchy.
//!
//! Every role is an independent [`MemberSet`] with a pointer to the role whose
//! members may grant and revoke it. Roles come into existence empty on first
//! reference and are never deleted.

use std::collections::BTreeMap;

use rrl_types::{Account, LedgerEvent, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AccessError, Result};
use crate::member_set::MemberSet;

/// Membership and administration of a single role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    /// Current holders, in insertion order until the first removal.
    pub members: MemberSet,
    /// The role whose holders may grant and revoke this one.
    pub admin_role: Role,
}

/// Registry of role memberships, gated by itself.
///
/// Mutations check their precondition before touching state, so a failed
/// call leaves the registry unchanged. A successful call that changes
/// membership returns the event to publish; an idempotent no-op returns
/// `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    roles: BTreeMap<Role, RoleState>,
}

impl RoleRegistry {
    /// Create a registry rooted at `initializer`.
    ///
    /// The initializer receives the admin and writer roles, and the admin role
    /// is configured as the admin of both. Returns the `RoleGranted` events of
    /// the bootstrap in emission order.
    pub fn bootstrap(initializer: Account) -> (Self, Vec<LedgerEvent>) {
        let mut registry = Self::default();
        registry.set_role_admin(Role::ADMIN, Role::ADMIN);
        registry.set_role_admin(Role::writer(), Role::ADMIN);

        let events: Vec<LedgerEvent> = [Role::ADMIN, Role::writer()]
            .into_iter()
            .filter_map(|role| registry.insert_member(role, initializer, initializer))
            .collect();

        info!(initializer = %initializer, "role registry bootstrapped");
        (registry, events)
    }

    /// Whether `account` currently holds `role`.
    pub fn has_role(&self, role: &Role, account: &Account) -> bool {
        self.roles
            .get(role)
            .is_some_and(|state| state.members.contains(account))
    }

    /// The role that administers `role`; the admin role unless configured.
    pub fn role_admin(&self, role: &Role) -> Role {
        self.roles
            .get(role)
            .map(|state| state.admin_role)
            .unwrap_or(Role::ADMIN)
    }

    /// Fail with [`AccessError::Unauthorized`] unless `account` holds `role`.
    pub fn check_role(&self, role: &Role, account: &Account) -> Result<()> {
        if self.has_role(role, account) {
            return Ok(());
        }
        warn!(account = %account, role = %role.label(), "access check failed");
        Err(AccessError::Unauthorized {
            account: *account,
            role: *role,
        })
    }

    /// Add `account` to `role`. `caller` must hold the role's admin role.
    pub fn grant_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<Option<LedgerEvent>> {
        self.check_role(&self.role_admin(&role), &caller)?;
        Ok(self.insert_member(role, account, caller))
    }

    /// Remove `account` from `role`. `caller` must hold the role's admin role.
    pub fn revoke_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<Option<LedgerEvent>> {
        self.check_role(&self.role_admin(&role), &caller)?;
        Ok(self.remove_member(role, account, caller))
    }

    /// Remove `account` from `role` on its own behalf.
    ///
    /// Only `account` itself may renounce, whatever roles the caller holds.
    /// Nothing stops the last admin from renouncing the admin role, after
    /// which no account can grant or revoke roles administered by it.
    pub fn renounce_role(
        &mut self,
        role: Role,
        account: Account,
        caller: Account,
    ) -> Result<Option<LedgerEvent>> {
        if caller != account {
            warn!(account = %account, caller = %caller, "renounce for another account");
            return Err(AccessError::SelfOnly { account, caller });
        }
        Ok(self.remove_member(role, account, account))
    }

    /// Number of current holders of `role`.
    pub fn role_member_count(&self, role: &Role) -> usize {
        self.roles.get(role).map_or(0, |state| state.members.len())
    }

    /// Holder of `role` at `index`.
    ///
    /// Positions are stable only while no member is removed.
    pub fn role_member(&self, role: &Role, index: usize) -> Result<Account> {
        let len = self.role_member_count(role);
        self.roles
            .get(role)
            .and_then(|state| state.members.get(index))
            .ok_or(AccessError::IndexOutOfRange {
                role: *role,
                index,
                len,
            })
    }

    /// All current holders of `role`, in enumeration order.
    pub fn role_members(&self, role: &Role) -> Vec<Account> {
        self.roles
            .get(role)
            .map(|state| state.members.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Every role that has been configured or granted at least once.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.keys()
    }

    fn set_role_admin(&mut self, role: Role, admin_role: Role) {
        self.roles.entry(role).or_default().admin_role = admin_role;
    }

    fn insert_member(
        &mut self,
        role: Role,
        account: Account,
        sender: Account,
    ) -> Option<LedgerEvent> {
        let state = self.roles.entry(role).or_default();
        if !state.members.insert(account) {
            return None;
        }
        debug!(role = %role.label(), account = %account, sender = %sender, "role granted");
        Some(LedgerEvent::RoleGranted {
            role,
            account,
            sender,
        })
    }

    fn remove_member(
        &mut self,
        role: Role,
        account: Account,
        sender: Account,
    ) -> Option<LedgerEvent> {
        let removed = self
            .roles
            .get_mut(&role)
            .is_some_and(|state| state.members.remove(&account));
        if !removed {
            return None;
        }
        debug!(role = %role.label(), account = %account, sender = %sender, "role revoked");
        Some(LedgerEvent::RoleRevoked {
            role,
            account,
            sender,
        })
    }
}
