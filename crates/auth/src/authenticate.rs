//! Login decision procedure.
//!
//! A login attempt moves `UNAUTHENTICATED -> RESOLVING(strategy)` and ends in
//! exactly one of:
//! - `AUTHENTICATED`: a [`Principal`] is returned and bound to the session once.
//! - `FAILED(kind)`: an [`AuthError`] is returned and the session is untouched.
//!
//! There is no retry inside a call. The strategy is picked from the operating
//! mode and the declared identity source of the attempt.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use keyward_core::IdentitySource;

use crate::error::AuthError;
use crate::principal::Principal;
use crate::record::IdentityRecord;
use crate::session::{LoginAttempt, SessionContext};
use crate::store::CredentialStore;

const LOCAL_ONLY: &[IdentitySource] = &[IdentitySource::Local];
const DIRECTORY_THEN_LOCAL: &[IdentitySource] = &[IdentitySource::Ldap, IdentitySource::Local];

/// Deployment-wide operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    #[default]
    Normal,
    /// Accounts resolve by name alone and passwords are never checked.
    ///
    /// Only for isolated local/dev deployments; it is selected once at
    /// construction and cannot be requested per attempt.
    TrustedLocal,
}

/// Settings an [`Authenticator`] is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    pub mode: OperatingMode,
}

impl AuthSettings {
    pub fn trusted_local() -> Self {
        Self {
            mode: OperatingMode::TrustedLocal,
        }
    }
}

/// Resolution strategy chosen for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginStrategy {
    /// Operating mode bypass: resolve without verification.
    TrustedLocal,
    /// No (or an unrecognized) declared source: resolve across all sources
    /// and bind without verifying the password.
    SourceAgnostic,
    /// Local accounts only; the password is verified.
    Local,
    /// Directory accounts (falling back to local ones); the directory has
    /// already checked the password.
    Ldap,
}

/// Turns a login attempt into a bound principal.
pub trait Authenticate {
    /// Resolve `attempt` and, on success, bind the principal to `session`.
    ///
    /// On failure nothing is written to the session.
    fn authenticate<C>(&self, attempt: &LoginAttempt, session: &C) -> Result<Principal, AuthError>
    where
        C: SessionContext + ?Sized;
}

/// Multi-strategy authenticator over a [`CredentialStore`].
///
/// Stateless apart from its settings; share it freely across sessions.
#[derive(Debug, Clone)]
pub struct Authenticator<S> {
    store: S,
    settings: AuthSettings,
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    pub fn new(store: S, settings: AuthSettings) -> Self {
        if settings.mode == OperatingMode::TrustedLocal {
            warn!("trusted-local mode enabled: passwords will not be verified");
        }
        Self { store, settings }
    }

    pub fn settings(&self) -> AuthSettings {
        self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn strategy_for(&self, attempt: &LoginAttempt) -> LoginStrategy {
        if self.settings.mode == OperatingMode::TrustedLocal {
            return LoginStrategy::TrustedLocal;
        }
        match attempt.declared() {
            Some(IdentitySource::Local) => LoginStrategy::Local,
            Some(IdentitySource::Ldap) => LoginStrategy::Ldap,
            None => LoginStrategy::SourceAgnostic,
        }
    }

    /// Run the decision procedure without touching any session.
    pub fn resolve(&self, attempt: &LoginAttempt) -> Result<Principal, AuthError> {
        let strategy = self.strategy_for(attempt);
        let span = tracing::debug_span!("resolve_login", ?strategy, username = %attempt.username());
        let _entered = span.enter();

        let record = match strategy {
            LoginStrategy::TrustedLocal => self.resolve_any_source(attempt.username())?,
            LoginStrategy::SourceAgnostic => {
                // Kept for compatibility with flows that never declare a
                // source. This path binds without any password check.
                warn!(
                    marker = attempt.declared_source().unwrap_or("<none>"),
                    "no recognized identity source declared; binding without password verification"
                );
                self.resolve_any_source(attempt.username())?
            }
            LoginStrategy::Local => self.login_local(attempt)?,
            LoginStrategy::Ldap => self.login_ldap(attempt)?,
        };

        Ok(Principal::from(&record))
    }

    /// Username across all sources, then the same identifier as an email.
    fn resolve_any_source(&self, identifier: &str) -> Result<IdentityRecord, AuthError> {
        if let Some(record) = self.store.find_by_username(identifier)? {
            return Ok(record);
        }
        debug!("username miss; retrying as email");
        self.store
            .find_by_email_in_sources(identifier, &IdentitySource::ALL)?
            .ok_or_else(|| unknown_account(identifier))
    }

    fn login_local(&self, attempt: &LoginAttempt) -> Result<IdentityRecord, AuthError> {
        let username = attempt.username();
        let record = match self.store.find_by_username_in_sources(username, LOCAL_ONLY)? {
            Some(record) => record,
            None => {
                debug!("local username miss; retrying as email");
                self.store
                    .find_by_email_in_sources(username, LOCAL_ONLY)?
                    .ok_or_else(|| unknown_account(username))?
            }
        };

        if !self
            .store
            .verify_password(&record.user_id, attempt.password().expose())?
        {
            warn!(user_id = %record.user_id, "password verification failed");
            return Err(AuthError::IncorrectCredentials);
        }
        Ok(record)
    }

    fn login_ldap(&self, attempt: &LoginAttempt) -> Result<IdentityRecord, AuthError> {
        let username = attempt.username();
        if let Some(record) = self
            .store
            .find_by_username_in_sources(username, DIRECTORY_THEN_LOCAL)?
        {
            return Ok(record);
        }

        // The fallback key is the email the directory step left in the
        // session, not the submitted username.
        let Some(email) = attempt.email() else {
            debug!("directory username miss and no session email");
            return Err(unknown_account(username));
        };
        debug!(email, "directory username miss; retrying by session email");
        self.store
            .find_by_email_in_sources(email, DIRECTORY_THEN_LOCAL)?
            .ok_or_else(|| unknown_account(username))
    }
}

impl<S> Authenticate for Authenticator<S>
where
    S: CredentialStore,
{
    fn authenticate<C>(&self, attempt: &LoginAttempt, session: &C) -> Result<Principal, AuthError>
    where
        C: SessionContext + ?Sized,
    {
        let principal = self.resolve(attempt)?;
        session.bind_principal(principal.clone())?;
        info!(
            user_id = %principal.user_id(),
            source = %principal.source(),
            "principal bound to session"
        );
        Ok(principal)
    }
}

fn unknown_account(identifier: &str) -> AuthError {
    warn!(identifier, "account does not exist");
    AuthError::unknown_account(identifier)
}
