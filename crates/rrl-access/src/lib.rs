//! Role-based access control for the reward receipt ledger.
//!
//! [`RoleRegistry`] tracks which accounts hold which roles and which role
//! administers each of them. The registry gates its own mutations: granting
//! or revoking a role requires holding that role's admin role, and renouncing
//! is only allowed for oneself.

pub mod error;
pub mod member_set;
pub mod registry;

pub use error::AccessError;
pub use member_set::MemberSet;
pub use registry::{RoleRegistry, RoleState};
