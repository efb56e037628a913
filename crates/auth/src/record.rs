//! Account records as handed out by a credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use keyward_core::{DomainError, DomainResult, IdentitySource, UserId};

const NAME_LEN: core::ops::RangeInclusive<usize> = 2..=50;
const PHONE_LEN: usize = 11;

/// One resolvable account.
///
/// The password credential is deliberately absent: it stays inside the
/// credential store and is only ever checked through
/// [`crate::CredentialStore::verify_password`]. Role assignments are not
/// carried either; they are fetched lazily with
/// [`crate::CredentialStore::roles_for`].
///
/// # Invariants
/// - `user_id` is globally unique.
/// - `(username, source)` and `(email, source)` are unique within a source,
///   but the same username/email may exist under several sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub user_id: UserId,
    pub username: String,
    /// Display name.
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Preferred message locale (e.g. `zh_CN`).
    #[serde(default)]
    pub language: Option<String>,
    pub source: IdentitySource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityRecord {
    pub fn new(
        user_id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        source: IdentitySource,
    ) -> Self {
        let username = username.into();
        let now = Utc::now();
        Self {
            user_id,
            name: username.clone(),
            username,
            email: email.into(),
            phone: None,
            language: None,
            source,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check the field constraints account records are created with.
    pub fn validate(&self) -> DomainResult<()> {
        if !NAME_LEN.contains(&self.username.chars().count()) {
            return Err(DomainError::validation("username must be 2-50 characters"));
        }
        if !NAME_LEN.contains(&self.name.chars().count()) {
            return Err(DomainError::validation("name must be 2-50 characters"));
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(DomainError::validation("email must be a valid address"));
        }
        if let Some(phone) = &self.phone {
            if phone.chars().count() != PHONE_LEN {
                return Err(DomainError::validation("phone must be 11 characters"));
            }
        }
        Ok(())
    }
}
