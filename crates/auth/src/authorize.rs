//! Role resolution and the permission-check extension point.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use keyward_core::{RoleId, UserId};

use crate::error::AuthError;
use crate::permissions::Permission;
use crate::principal::Principal;
use crate::store::CredentialStore;

/// Decides whether a principal holds a permission.
///
/// Deployments plug their own logic in here; the resolver never hard-codes
/// a decision.
pub trait PermissionPolicy: Send + Sync {
    fn is_permitted(&self, principal: &Principal, permission: &Permission) -> bool;
}

/// Default policy: every check passes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllowAll;

impl PermissionPolicy for AllowAll {
    fn is_permitted(&self, _principal: &Principal, _permission: &Permission) -> bool {
        true
    }
}

impl<F> PermissionPolicy for F
where
    F: Fn(&Principal, &Permission) -> bool + Send + Sync,
{
    fn is_permitted(&self, principal: &Principal, permission: &Permission) -> bool {
        self(principal, permission)
    }
}

/// Role-based policy: a principal holds a permission when one of its roles
/// is granted it (or the wildcard `"*"`).
///
/// Roles are looked up on every check. A store fault denies.
#[derive(Debug, Clone)]
pub struct RolePermissionPolicy<S> {
    store: S,
    grants: HashMap<RoleId, HashSet<Permission>>,
}

impl<S> RolePermissionPolicy<S>
where
    S: CredentialStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            grants: HashMap::new(),
        }
    }

    pub fn grant(
        mut self,
        role: impl Into<RoleId>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        self.grants
            .entry(role.into())
            .or_default()
            .extend(permissions);
        self
    }

    /// Union of the permissions granted to `roles`.
    pub fn effective_permissions<'a>(
        &self,
        roles: impl IntoIterator<Item = &'a RoleId>,
    ) -> HashSet<Permission> {
        roles
            .into_iter()
            .filter_map(|role| self.grants.get(role))
            .flatten()
            .cloned()
            .collect()
    }
}

impl<S> PermissionPolicy for RolePermissionPolicy<S>
where
    S: CredentialStore,
{
    fn is_permitted(&self, principal: &Principal, permission: &Permission) -> bool {
        let roles = match self.store.roles_for(principal.user_id()) {
            Ok(roles) => roles,
            Err(err) => {
                warn!(user_id = %principal.user_id(), error = %err, "role lookup failed; denying");
                return false;
            }
        };

        let effective = self.effective_permissions(&roles);
        let granted = effective.iter().any(|p| p.is_wildcard() || p == permission);
        debug!(user_id = %principal.user_id(), %permission, granted, "permission check");
        granted
    }
}

/// Role and permission queries for authenticated principals.
pub trait Authorize {
    /// Role assignments of `user_id`; empty when it has none.
    fn roles_of(&self, user_id: &UserId) -> Result<HashSet<RoleId>, AuthError>;

    fn is_permitted(&self, principal: &Principal, permission: &Permission) -> bool;
}

/// Resolves roles through a [`CredentialStore`] and delegates permission
/// checks to a [`PermissionPolicy`] ([`AllowAll`] unless replaced).
#[derive(Debug, Clone)]
pub struct AuthorizationResolver<S, P = AllowAll> {
    store: S,
    policy: P,
}

impl<S> AuthorizationResolver<S>
where
    S: CredentialStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            policy: AllowAll,
        }
    }
}

impl<S, P> AuthorizationResolver<S, P>
where
    S: CredentialStore,
    P: PermissionPolicy,
{
    pub fn with_policy<Q: PermissionPolicy>(self, policy: Q) -> AuthorizationResolver<S, Q> {
        AuthorizationResolver {
            store: self.store,
            policy,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

impl<S, P> Authorize for AuthorizationResolver<S, P>
where
    S: CredentialStore,
    P: PermissionPolicy,
{
    fn roles_of(&self, user_id: &UserId) -> Result<HashSet<RoleId>, AuthError> {
        if self.store.find_by_id(user_id)?.is_none() {
            warn!(%user_id, "role lookup for unknown account");
            return Err(AuthError::unknown_account(user_id.as_str()));
        }
        Ok(self.store.roles_for(user_id)?)
    }

    fn is_permitted(&self, principal: &Principal, permission: &Permission) -> bool {
        self.policy.is_permitted(principal, permission)
    }
}
