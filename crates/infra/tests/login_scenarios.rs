//! End-to-end login scenarios against the in-memory adapters.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use keyward_auth::{
    AuthError, AuthSettings, Authenticate, Authenticator, Authorize, AuthorizationResolver,
    IdentityRecord, IdentitySource, LoginAttempt, Permission, RoleId, SessionContext, UserId,
    session_keys,
};
use keyward_infra::{InMemoryCredentialStore, InMemorySession, JsonMessageCatalog};

fn id(raw: &str) -> UserId {
    UserId::parse(raw).unwrap()
}

fn store() -> Arc<InMemoryCredentialStore> {
    let store = InMemoryCredentialStore::new();
    store
        .insert(
            IdentityRecord::new(id("u1"), "alice", "alice@co.com", IdentitySource::Local),
            "pw123",
        )
        .unwrap();
    store
        .insert(
            IdentityRecord::new(id("u2"), "bob", "bob@co.com", IdentitySource::Ldap),
            "",
        )
        .unwrap();
    store.assign_role(&id("u1"), "admin").unwrap();
    Arc::new(store)
}

fn session(declared: &str) -> InMemorySession {
    let session = InMemorySession::new();
    session.put_attribute(session_keys::DECLARED_SOURCE, declared).unwrap();
    session
}

#[test]
fn local_account_with_correct_password() {
    let auth = Authenticator::new(store(), AuthSettings::default());
    let session = session("LOCAL");

    let attempt = LoginAttempt::from_session("alice", "pw123", &session);
    let principal = auth.authenticate(&attempt, &session).unwrap();

    assert_eq!(principal.user_id(), &id("u1"));
    assert_eq!(principal.source(), IdentitySource::Local);
    assert_eq!(session.principal(), Some(principal));
    assert_eq!(session.bind_count(), 1);
}

#[test]
fn local_account_with_wrong_password() {
    let auth = Authenticator::new(store(), AuthSettings::default());
    let session = session("LOCAL");

    let attempt = LoginAttempt::from_session("alice", "wrong", &session);
    let err = auth.authenticate(&attempt, &session).unwrap_err();

    assert!(matches!(err, AuthError::IncorrectCredentials));
    assert!(session.principal().is_none());
    assert_eq!(session.get(session_keys::PRINCIPAL), None);
}

#[test]
fn unknown_account_is_reported_and_localized() {
    let auth = Authenticator::new(store(), AuthSettings::default());
    let session = session("LOCAL");

    let attempt = LoginAttempt::from_session("ghost", "x", &session);
    let err = auth.authenticate(&attempt, &session).unwrap_err();

    assert!(matches!(err, AuthError::UnknownAccount { ref identifier } if identifier == "ghost"));
    let catalog = JsonMessageCatalog::builtin();
    assert_eq!(err.localized(&catalog, "en_US"), "User does not exist: ghost");
    assert_eq!(err.localized(&catalog, "zh_CN"), "用户不存在：ghost");
}

#[test]
fn ldap_account_resolved_by_session_email_binds_canonical_id() {
    let auth = Authenticator::new(store(), AuthSettings::default());
    let session = session("LDAP");
    session.put_attribute(session_keys::EMAIL, "bob@co.com").unwrap();

    let attempt = LoginAttempt::from_session("b.smith", "whatever", &session);
    let principal = auth.authenticate(&attempt, &session).unwrap();

    assert_eq!(principal.user_id(), &id("u2"));
    assert_eq!(principal.username(), "bob");
    assert_eq!(principal.source(), IdentitySource::Ldap);
}

#[test]
fn trusted_local_mode_binds_without_password() {
    let auth = Authenticator::new(store(), AuthSettings::trusted_local());
    let session = InMemorySession::new();

    let principal = auth
        .authenticate(&LoginAttempt::new("alice", ""), &session)
        .unwrap();
    assert_eq!(principal.user_id(), &id("u1"));
}

#[test]
fn roles_and_default_permission_policy() {
    let store = store();
    let auth = Authenticator::new(store.clone(), AuthSettings::default());
    let resolver = AuthorizationResolver::new(store);
    let session = session("LOCAL");

    let alice = auth
        .authenticate(&LoginAttempt::from_session("alice@co.com", "pw123", &session), &session)
        .unwrap();

    let roles = resolver.roles_of(alice.user_id()).unwrap();
    assert_eq!(roles, HashSet::from([RoleId::new("admin")]));
    assert!(resolver.roles_of(&id("u2")).unwrap().is_empty());
    assert!(matches!(
        resolver.roles_of(&id("nope")),
        Err(AuthError::UnknownAccount { .. })
    ));
    assert!(resolver.is_permitted(&alice, &Permission::new("project.delete")));
}

#[test]
fn concurrent_logins_for_distinct_sessions_are_independent() {
    let auth = Arc::new(Authenticator::new(store(), AuthSettings::default()));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = Arc::clone(&auth);
            thread::spawn(move || {
                let session = session("LOCAL");
                let password = if i % 2 == 0 { "pw123" } else { "bad" };
                let attempt = LoginAttempt::from_session("alice", password, &session);
                (i, auth.authenticate(&attempt, &session).is_ok(), session.bind_count())
            })
        })
        .collect();

    for handle in handles {
        let (i, ok, binds) = handle.join().unwrap();
        assert_eq!(ok, i % 2 == 0);
        assert_eq!(binds, usize::from(ok));
    }
}

#[test]
fn bundled_demo_fixtures_load_and_authenticate() {
    let store = InMemoryCredentialStore::from_fixtures(include_str!("../../../demos/accounts.json")).unwrap();
    let auth = Authenticator::new(store, AuthSettings::default());
    let session = session("LOCAL");

    let principal = auth
        .authenticate(&LoginAttempt::from_session("carol", "carol-pw", &session), &session)
        .unwrap();
    assert_eq!(principal.user_id(), &id("u3"));
}
