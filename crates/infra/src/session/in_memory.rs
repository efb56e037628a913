use std::collections::HashMap;
use std::sync::{RwLock, RwLockWriteGuard};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};
use uuid::Uuid;

use keyward_auth::{Principal, SessionContext, StoreError, session_keys};

/// Process-local login session (tests/dev).
///
/// Attribute writes and principal binding are last-writer-wins. The bound
/// principal is also readable as JSON under [`session_keys::PRINCIPAL`].
#[derive(Debug)]
pub struct InMemorySession {
    id: Uuid,
    attributes: RwLock<HashMap<String, String>>,
    principal: RwLock<Option<Principal>>,
    binds: AtomicUsize,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            attributes: RwLock::new(HashMap::new()),
            principal: RwLock::new(None),
            binds: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn attributes_mut(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>, StoreError> {
        self.attributes
            .write()
            .map_err(|_| StoreError::unavailable("session attributes lock poisoned"))
    }

    fn principal_mut(&self) -> Result<RwLockWriteGuard<'_, Option<Principal>>, StoreError> {
        self.principal
            .write()
            .map_err(|_| StoreError::unavailable("session principal lock poisoned"))
    }

    pub fn put_attribute(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StoreError> {
        self.attributes_mut()?.insert(key.into(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.attributes_mut()?.remove(key))
    }

    pub fn principal(&self) -> Option<Principal> {
        self.principal.read().ok()?.clone()
    }

    /// How many times a principal was bound to this session.
    pub fn bind_count(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }

    /// Logout: drop every attribute and the bound principal.
    pub fn invalidate(&self) -> Result<(), StoreError> {
        self.attributes_mut()?.clear();
        *self.principal_mut()? = None;
        debug!(session_id = %self.id, "session invalidated");
        Ok(())
    }
}

impl Default for InMemorySession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext for InMemorySession {
    fn get(&self, key: &str) -> Option<String> {
        if key == session_keys::PRINCIPAL {
            let principal = self.principal()?;
            return serde_json::to_string(&principal).ok();
        }
        self.attributes.read().ok()?.get(key).cloned()
    }

    fn bind_principal(&self, principal: Principal) -> Result<(), StoreError> {
        let mut slot = self.principal_mut().inspect_err(|_| {
            warn!(session_id = %self.id, "session lock poisoned; principal not bound");
        })?;
        debug!(session_id = %self.id, user_id = %principal.user_id(), "principal bound");
        *slot = Some(principal);
        self.binds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_auth::{
        AuthSettings, Authenticate, Authenticator, FailureKind, IdentityRecord, LoginAttempt,
    };
    use keyward_core::{IdentitySource, UserId};

    use crate::InMemoryCredentialStore;

    fn principal() -> Principal {
        Principal::from(&record())
    }

    fn record() -> IdentityRecord {
        IdentityRecord::new(
            UserId::parse("u1").unwrap(),
            "alice",
            "alice@co.com",
            IdentitySource::Local,
        )
    }

    /// Leaves the principal slot poisoned, as a writer that panicked mid-update would.
    fn poison_principal_slot(session: &InMemorySession) {
        std::thread::scope(|s| {
            let writer = s.spawn(|| {
                let _slot = session.principal.write().unwrap();
                panic!("writer died while holding the principal slot");
            });
            assert!(writer.join().is_err());
        });
        assert!(session.principal.is_poisoned());
    }

    #[test]
    fn attributes_round_trip_through_session_context() {
        let session = InMemorySession::new();
        session.put_attribute(session_keys::DECLARED_SOURCE, "LOCAL").unwrap();

        assert_eq!(session.get(session_keys::DECLARED_SOURCE).as_deref(), Some("LOCAL"));
        assert_eq!(session.get(session_keys::EMAIL), None);
        assert_eq!(
            session.remove_attribute(session_keys::DECLARED_SOURCE).unwrap().as_deref(),
            Some("LOCAL")
        );
        assert_eq!(session.get(session_keys::DECLARED_SOURCE), None);
    }

    #[test]
    fn bound_principal_is_readable_as_json() {
        let session = InMemorySession::new();
        assert_eq!(session.get(session_keys::PRINCIPAL), None);

        session.bind_principal(principal()).unwrap();

        let json = session.get(session_keys::PRINCIPAL).unwrap();
        let decoded: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, principal());
        assert_eq!(session.bind_count(), 1);
    }

    #[test]
    fn invalidate_clears_everything() {
        let session = InMemorySession::new();
        session.put_attribute(session_keys::EMAIL, "alice@co.com").unwrap();
        session.bind_principal(principal()).unwrap();

        session.invalidate().unwrap();

        assert!(session.principal().is_none());
        assert_eq!(session.get(session_keys::EMAIL), None);
    }

    #[test]
    fn poisoned_session_rejects_the_bind() {
        let session = InMemorySession::new();
        poison_principal_slot(&session);

        let err = session.bind_principal(principal()).unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(session.bind_count(), 0);
        assert!(session.invalidate().is_err());
    }

    #[test]
    fn login_fails_when_the_session_cannot_store_the_principal() {
        let store = InMemoryCredentialStore::new();
        store.insert(record(), "pw123").unwrap();
        let auth = Authenticator::new(store, AuthSettings::default());

        let session = InMemorySession::new();
        poison_principal_slot(&session);
        let attempt = LoginAttempt::new("alice", "pw123").with_declared_source("LOCAL");

        let err = auth.authenticate(&attempt, &session).unwrap_err();

        assert_eq!(err.kind(), FailureKind::Infrastructure);
        assert_eq!(session.bind_count(), 0);
    }
}
