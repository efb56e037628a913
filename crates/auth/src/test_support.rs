//! Scripted collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use keyward_core::{IdentitySource, RoleId, StoreError, UserId};

use crate::i18n::MessageCatalog;
use crate::principal::Principal;
use crate::record::IdentityRecord;
use crate::session::SessionContext;
use crate::store::CredentialStore;

/// Credential store double that counts calls and can simulate an outage.
#[derive(Default)]
pub struct ScriptedStore {
    accounts: Vec<(IdentityRecord, String)>,
    roles: HashMap<UserId, HashSet<RoleId>>,
    outage: bool,
    lookups: AtomicUsize,
    verifications: AtomicUsize,
}

impl ScriptedStore {
    pub fn with_account(
        mut self,
        user_id: &str,
        username: &str,
        email: &str,
        source: IdentitySource,
        password: &str,
    ) -> Self {
        let record = IdentityRecord::new(UserId::parse(user_id).unwrap(), username, email, source);
        self.accounts.push((record, password.to_string()));
        self
    }

    pub fn with_roles(mut self, user_id: &str, roles: &[&'static str]) -> Self {
        self.roles.insert(
            UserId::parse(user_id).unwrap(),
            roles.iter().map(|r| RoleId::new(*r)).collect(),
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.outage = true;
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.outage {
            return Err(StoreError::unavailable("scripted outage"));
        }
        Ok(())
    }

    fn lookup(
        &self,
        sources: &[IdentitySource],
        matches: impl Fn(&IdentityRecord) -> bool,
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(sources.iter().find_map(|source| {
            self.accounts
                .iter()
                .map(|(record, _)| record)
                .find(|record| record.source == *source && matches(record))
                .cloned()
        }))
    }
}

impl CredentialStore for ScriptedStore {
    fn find_by_id(&self, user_id: &UserId) -> Result<Option<IdentityRecord>, StoreError> {
        self.lookup(&IdentitySource::ALL, |r| &r.user_id == user_id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        self.lookup(&IdentitySource::ALL, |r| r.username == username)
    }

    fn find_by_username_in_sources(
        &self,
        username: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.lookup(sources, |r| r.username == username)
    }

    fn find_by_email_in_sources(
        &self,
        email: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        self.lookup(sources, |r| r.email == email)
    }

    fn verify_password(&self, user_id: &UserId, password: &str) -> Result<bool, StoreError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self
            .accounts
            .iter()
            .any(|(record, stored)| &record.user_id == user_id && stored == password))
    }

    fn roles_for(&self, user_id: &UserId) -> Result<HashSet<RoleId>, StoreError> {
        self.check()?;
        Ok(self.roles.get(user_id).cloned().unwrap_or_default())
    }
}

/// Session double recording every principal bound to it.
#[derive(Default)]
pub struct ScriptedSession {
    attributes: HashMap<String, String>,
    bound: Mutex<Vec<Principal>>,
    reject_binds: bool,
}

impl ScriptedSession {
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Every `bind_principal` call fails as if the session backend were down.
    pub fn rejecting_binds(mut self) -> Self {
        self.reject_binds = true;
        self
    }

    pub fn bound(&self) -> Vec<Principal> {
        self.bound.lock().unwrap().clone()
    }
}

impl SessionContext for ScriptedSession {
    fn get(&self, key: &str) -> Option<String> {
        self.attributes.get(key).cloned()
    }

    fn bind_principal(&self, principal: Principal) -> Result<(), StoreError> {
        if self.reject_binds {
            return Err(StoreError::unavailable("scripted session outage"));
        }
        self.bound.lock().unwrap().push(principal);
        Ok(())
    }
}

#[derive(Default)]
pub struct ScriptedCatalog {
    entries: HashMap<(String, String), String>,
}

impl ScriptedCatalog {
    pub fn with(mut self, locale: &str, key: &str, text: &str) -> Self {
        self.entries
            .insert((locale.to_string(), key.to_string()), text.to_string());
        self
    }
}

impl MessageCatalog for ScriptedCatalog {
    fn message(&self, key: &str, locale: &str) -> Option<String> {
        self.entries
            .get(&(locale.to_string(), key.to_string()))
            .cloned()
    }
}
