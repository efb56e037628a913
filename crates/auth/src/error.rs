//! Authentication failures.

use serde::Serialize;
use thiserror::Error;

use keyward_core::StoreError;

use crate::i18n::{MessageCatalog, message_keys};

/// Why an `authenticate` (or `roles_of`) call ended without a result.
///
/// Both authentication failures are terminal for the call; the caller decides
/// whether to prompt again. Store faults are passed through untouched.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Nothing resolved after the whole identifier-then-email chain.
    #[error("unknown account: {identifier}")]
    UnknownAccount { identifier: String },

    /// The account resolved but the password did not verify.
    #[error("incorrect credentials")]
    IncorrectCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse classification, handy for metrics and response mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnknownAccount,
    IncorrectCredentials,
    Infrastructure,
}

impl AuthError {
    pub fn unknown_account(identifier: impl Into<String>) -> Self {
        Self::UnknownAccount {
            identifier: identifier.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            AuthError::UnknownAccount { .. } => FailureKind::UnknownAccount,
            AuthError::IncorrectCredentials => FailureKind::IncorrectCredentials,
            AuthError::Store(_) => FailureKind::Infrastructure,
        }
    }

    /// `true` for failures caused by what the user submitted.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AuthError::Store(_))
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            AuthError::UnknownAccount { .. } => message_keys::USER_NOT_EXIST,
            AuthError::IncorrectCredentials => message_keys::PASSWORD_IS_INCORRECT,
            AuthError::Store(_) => message_keys::STORE_UNAVAILABLE,
        }
    }

    /// Render the failure for an end user.
    ///
    /// Falls back to the bare key when the catalog has no entry. Unknown
    /// accounts get the offending identifier appended. Store details are
    /// never included.
    pub fn localized<C>(&self, catalog: &C, locale: &str) -> String
    where
        C: MessageCatalog + ?Sized,
    {
        let key = self.message_key();
        let text = catalog
            .message(key, locale)
            .unwrap_or_else(|| key.to_string());

        match self {
            AuthError::UnknownAccount { identifier } => format!("{text}{identifier}"),
            _ => text,
        }
    }
}
