//! Session port and the explicit inputs of one login attempt.

use std::sync::Arc;

use keyward_core::{IdentitySource, StoreError};

use crate::principal::Principal;

/// Attribute keys the login flow shares through the session.
pub mod session_keys {
    /// Declared identity source marker (`"LOCAL"` / `"LDAP"`), written by an
    /// earlier step of the login flow.
    pub const DECLARED_SOURCE: &str = "authenticate";
    /// Email captured by the directory login step.
    pub const EMAIL: &str = "email";
    /// Where the bound principal lives.
    pub const PRINCIPAL: &str = "principal";
}

/// Per-login session state owned by an external session layer.
///
/// Writes are expected to be atomic last-writer-wins; callers add no locking
/// of their own.
pub trait SessionContext: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Store the authenticated principal under [`session_keys::PRINCIPAL`].
    ///
    /// A failed write is an infrastructure fault; the login that triggered it
    /// must not report success.
    fn bind_principal(&self, principal: Principal) -> Result<(), StoreError>;
}

impl<T> SessionContext for Arc<T>
where
    T: SessionContext + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn bind_principal(&self, principal: Principal) -> Result<(), StoreError> {
        (**self).bind_principal(principal)
    }
}

/// Plaintext password in transit. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Everything one `authenticate` call looks at.
///
/// The session markers are carried as plain fields so the decision
/// procedure is a function of its inputs; [`LoginAttempt::from_session`]
/// fills them from a live session.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    username: String,
    password: Password,
    declared_source: Option<String>,
    email: Option<String>,
}

impl LoginAttempt {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Password::new(password),
            declared_source: None,
            email: None,
        }
    }

    pub fn from_session<S>(username: impl Into<String>, password: impl Into<String>, session: &S) -> Self
    where
        S: SessionContext + ?Sized,
    {
        Self {
            declared_source: session.get(session_keys::DECLARED_SOURCE),
            email: session.get(session_keys::EMAIL),
            ..Self::new(username, password)
        }
    }

    pub fn with_declared_source(mut self, marker: impl Into<String>) -> Self {
        self.declared_source = Some(marker.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Raw declared-source marker, as found in the session.
    pub fn declared_source(&self) -> Option<&str> {
        self.declared_source.as_deref()
    }

    /// Declared source, if present and recognized.
    pub fn declared(&self) -> Option<IdentitySource> {
        self.declared_source.as_deref()?.parse().ok()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}
