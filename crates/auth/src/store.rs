//! Credential store port.

use std::collections::HashSet;
use std::sync::Arc;

use keyward_core::{IdentitySource, RoleId, StoreError, UserId};

use crate::record::IdentityRecord;

/// Lookup and verification operations the login procedure depends on.
///
/// Every call may block on IO. `Ok(None)` means "no such account"; `Err`
/// means the store itself failed and must not be read as a missing account.
///
/// When several sources are given and the key exists in more than one of
/// them, implementations return the match from the earliest source in
/// `sources`.
pub trait CredentialStore: Send + Sync {
    fn find_by_id(&self, user_id: &UserId) -> Result<Option<IdentityRecord>, StoreError>;

    /// Lookup by username across every source.
    fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError>;

    fn find_by_username_in_sources(
        &self,
        username: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError>;

    fn find_by_email_in_sources(
        &self,
        email: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError>;

    /// Check `password` against the stored credential of `user_id`.
    ///
    /// Unknown ids verify as `false`.
    fn verify_password(&self, user_id: &UserId, password: &str) -> Result<bool, StoreError>;

    /// Role assignments; empty when the account has none.
    fn roles_for(&self, user_id: &UserId) -> Result<HashSet<RoleId>, StoreError>;
}

impl<S> CredentialStore for Arc<S>
where
    S: CredentialStore + ?Sized,
{
    fn find_by_id(&self, user_id: &UserId) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_id(user_id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_username(username)
    }

    fn find_by_username_in_sources(
        &self,
        username: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_username_in_sources(username, sources)
    }

    fn find_by_email_in_sources(
        &self,
        email: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_email_in_sources(email, sources)
    }

    fn verify_password(&self, user_id: &UserId, password: &str) -> Result<bool, StoreError> {
        (**self).verify_password(user_id, password)
    }

    fn roles_for(&self, user_id: &UserId) -> Result<HashSet<RoleId>, StoreError> {
        (**self).roles_for(user_id)
    }
}

impl<S> CredentialStore for &S
where
    S: CredentialStore + ?Sized,
{
    fn find_by_id(&self, user_id: &UserId) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_id(user_id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_username(username)
    }

    fn find_by_username_in_sources(
        &self,
        username: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_username_in_sources(username, sources)
    }

    fn find_by_email_in_sources(
        &self,
        email: &str,
        sources: &[IdentitySource],
    ) -> Result<Option<IdentityRecord>, StoreError> {
        (**self).find_by_email_in_sources(email, sources)
    }

    fn verify_password(&self, user_id: &UserId, password: &str) -> Result<bool, StoreError> {
        (**self).verify_password(user_id, password)
    }

    fn roles_for(&self, user_id: &UserId) -> Result<HashSet<RoleId>, StoreError> {
        (**self).roles_for(user_id)
    }
}
