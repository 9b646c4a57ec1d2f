//! Insertion-ordered account set with O(1) add, remove and lookup.

use std::collections::HashMap;

use rrl_types::Account;
use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Dense vector of members plus an account → position index.
///
/// Removal swaps the last member into the vacated slot, so the order of the
/// remaining members is not stable across removals. Membership and count
/// are always exact.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Account>", into = "Vec<Account>")]
pub struct MemberSet {
    members: Vec<Account>,
    index: HashMap<Account, usize>,
}

impl MemberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `account`. Returns `false` if it was already present.
    pub fn insert(&mut self, account: Account) -> bool {
        if self.index.contains_key(&account) {
            return false;
        }
        self.index.insert(account, self.members.len());
        self.members.push(account);
        true
    }

    /// Remove `account`. Returns `false` if it was not present.
    pub fn remove(&mut self, account: &Account) -> bool {
        let Some(position) = self.index.remove(account) else {
            return false;
        };
        self.members.swap_remove(position);
        if let Some(moved) = self.members.get(position) {
            self.index.insert(*moved, position);
        }
        true
    }

    pub fn contains(&self, account: &Account) -> bool {
        self.index.contains_key(account)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member at `position`, if any.
    pub fn get(&self, position: usize) -> Option<Account> {
        self.members.get(position).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.members.iter()
    }

    pub fn as_slice(&self) -> &[Account] {
        &self.members
    }
}

impl TryFrom<Vec<Account>> for MemberSet {
    type Error = AccessError;

    fn try_from(members: Vec<Account>) -> Result<Self, Self::Error> {
        let mut set = MemberSet::new();
        for account in members {
            if !set.insert(account) {
                return Err(AccessError::DuplicateMember { account });
            }
        }
        Ok(set)
    }
}

impl From<MemberSet> for Vec<Account> {
    fn from(set: MemberSet) -> Self {
        set.members
    }
}
