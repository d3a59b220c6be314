//! Moderator capability and a reference role registry.
//!
//! The engine needs exactly one answer from access control: may this account
//! unwind a frozen match? [`RoleRegistry`] answers it with two roles, where
//! the deploying admin holds both from the start.

use std::collections::{HashMap, HashSet};

use moneymatch_types::{AccountId, MoneymatchError, Result};
use serde::{Deserialize, Serialize};

/// The capability query consumed before emergency resolution.
pub trait ModeratorCheck {
    fn is_moderator(&self, account: &AccountId) -> bool;
}

/// Roles known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May grant and revoke roles.
    Admin,
    /// May unwind frozen matches.
    MatchModerator,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::MatchModerator => write!(f, "MATCH_MODERATOR"),
        }
    }
}

/// Role-based access control.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    members: HashMap<Role, HashSet<AccountId>>,
}

impl RoleRegistry {
    /// Create a registry where `admin` holds both `Admin` and `MatchModerator`.
    ///
    /// # Errors
    /// Returns `Configuration` if `admin` is null.
    pub fn new(admin: AccountId) -> Result<Self> {
        if admin.is_null() {
            return Err(MoneymatchError::Configuration(
                "role registry admin must not be null".into(),
            ));
        }
        let mut members: HashMap<Role, HashSet<AccountId>> = HashMap::new();
        members.entry(Role::Admin).or_default().insert(admin);
        members.entry(Role::MatchModerator).or_default().insert(admin);
        Ok(Self { members })
    }

    #[must_use]
    pub fn has_role(&self, role: Role, account: &AccountId) -> bool {
        self.members
            .get(&role)
            .is_some_and(|set| set.contains(account))
    }

    /// Grant `role` to `account`. Granting a held role is a no-op.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` is not an admin
    /// - `NullAccount` if `account` is null
    pub fn grant_role(&mut self, caller: &AccountId, role: Role, account: AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if account.is_null() {
            return Err(MoneymatchError::NullAccount);
        }
        if self.members.entry(role).or_default().insert(account) {
            tracing::info!(%role, account = %account, granted_by = %caller, "role granted");
        }
        Ok(())
    }

    /// Revoke `role` from `account`. Revoking an unheld role is a no-op.
    ///
    /// # Errors
    /// Returns `Unauthorized` if `caller` is not an admin.
    pub fn revoke_role(&mut self, caller: &AccountId, role: Role, account: &AccountId) -> Result<()> {
        self.require_admin(caller)?;
        if let Some(set) = self.members.get_mut(&role) {
            if set.remove(account) {
                tracing::info!(%role, account = %account, revoked_by = %caller, "role revoked");
            }
        }
        Ok(())
    }

    /// Number of accounts holding `role`.
    #[must_use]
    pub fn member_count(&self, role: Role) -> usize {
        self.members.get(&role).map_or(0, HashSet::len)
    }

    fn require_admin(&self, caller: &AccountId) -> Result<()> {
        if self.has_role(Role::Admin, caller) {
            Ok(())
        } else {
            Err(MoneymatchError::Unauthorized(*caller))
        }
    }
}

impl ModeratorCheck for RoleRegistry {
    fn is_moderator(&self, account: &AccountId) -> bool {
        self.has_role(Role::MatchModerator, account)
    }
}
