use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tracing::debug;

use keyward_auth::{CredentialStore, IdentityRecord};
use keyward_core::{DomainError, IdentitySource, RoleId, StoreError, UserId};

use super::password::PasswordDigest;

/// Failure while provisioning accounts into a store.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
struct Account {
    record: IdentityRecord,
    password: PasswordDigest,
    roles: HashSet<RoleId>,
}

/// In-memory credential store for tests/dev.
///
/// Enforces the uniqueness rules of account records: `user_id` globally,
/// `(username, source)` and `(email, source)` per source.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<HashMap<UserId, Account>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<UserId, Account>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::unavailable("credential store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<UserId, Account>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::unavailable("credential store lock poisoned"))
    }

    /// Add a validated account with its plaintext password.
    pub fn insert(&self, record: IdentityRecord, password: &str) -> Result<(), ProvisionError> {
        record.validate()?;
        let password = PasswordDigest::derive(password)?;

        let mut map = self.write()?;
        if map.contains_key(&record.user_id) {
            return Err(DomainError::conflict(format!("user id '{}' already exists", record.user_id)).into());
        }
        for existing in map.values().map(|a| &a.record) {
            if existing.source != record.source {
                continue;
            }
            if existing.username == record.username {
                return Err(DomainError::conflict(format!(
                    "username '{}' already exists in {}",
                    record.username, record.source
                ))
                .into());
            }
            if existing.email == record.email {
                return Err(DomainError::conflict(format!(
                    "email '{}' already exists in {}",
                    record.email, record.source
                ))
                .into());
            }
        }

        debug!(user_id = %record.user_id, source = %record.source, "account provisioned");
        map.insert(
            record.user_id.clone(),
            Account {
                record,
                password,
                roles: HashSet::new(),
            },
        );
        Ok(())
    }

    pub fn set_password(&self, user_id: &UserId, password: &str) -> Result<(), ProvisionError> {
        let digest = PasswordDigest::derive(password)?;
        let mut map = self.write()?;
        let account = map.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        account.password = digest;
        Ok(())
    }

    pub fn assign_role(&self, user_id: &UserId, role: impl Into<RoleId>) -> Result<(), ProvisionError> {
        let mut map = self.write()?;
        let account = map.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        account.roles.insert(role.into());
        Ok(())
    }

    pub fn revoke_role(&self, user_id: &UserId, role: &RoleId) -> Result<(), ProvisionError> {
        let mut map = self.write()?;
        let account = map.get_mut(user_id).ok_or_else(|| missing(user_id))?;
        account.roles.remove(role);
        Ok(())
    }

    /// Remove an account; returns whether it existed.
    pub fn remove(&self, user_id: &UserId) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(user_id).is_some())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// First match in `sources` order.
    fn find_in(
        &self,
        sources: &[IdentitySource],
        matches: impl Fn(&IdentityRecord) -> bool,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        let map = self.read()?;
        Ok(sources.iter().find_map(|source| {
            map.values()
                .map(|a| &a.record)
                .find(|r| r.source == *source && matches(r))
                .cloned()
        }))
    }
}

fn missing(user_id: &UserId) -> DomainError {
    DomainError::invalid_id(format!("no account with id '{user_id}'"))
}

impl CredentialStore for InMemoryCredentialStore {
    fn find_by_id(&self, user_id: &UserId) -> Result<Option<IdentityRecord>, StoreError> {
        Ok(self.read()?.get(user_id).map(|a| a.record.clone()))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        self.find_in(&IdentitySource::ALL, |r| r.username == username)
    }

    fn find_by_username_in_sources(
        &self,
        username: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.find_in(sources, |r| r.username == username)
    }

    fn find_by_email_in_sources(
        &self,
        email: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.find_in(sources, |r| r.email == email)
    }

    fn verify_password(&self, user_id: &UserId, password: &str) -> Result<bool, StoreError> {
        Ok(self
            .read()?
            .get(user_id)
            .is_some_and(|a| a.password.matches(password)))
    }

    fn roles_for(&self, user_id: &UserId) -> Result<HashSet<RoleId>, StoreError> {
        Ok(self
            .read()?
            .get(user_id)
            .map(|a| a.roles.clone())
            .unwrap_or_default())
    }
}
