//! `keyward-auth` — login decision procedure and role resolution.
//!
//! This crate is intentionally decoupled from HTTP, storage and session
//! persistence: those are reached only through the [`CredentialStore`],
//! [`SessionContext`] and [`MessageCatalog`] traits.

pub mod authenticate;
pub mod authorize;
pub mod error;
pub mod i18n;
pub mod permissions;
pub mod principal;
pub mod record;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use authenticate::{Authenticate, AuthSettings, Authenticator, LoginStrategy, OperatingMode};
pub use authorize::{AllowAll, Authorize, AuthorizationResolver, PermissionPolicy, RolePermissionPolicy};
pub use error::{AuthError, FailureKind};
pub use i18n::{MessageCatalog, message_keys};
pub use permissions::Permission;
pub use principal::Principal;
pub use record::IdentityRecord;
pub use session::{LoginAttempt, Password, SessionContext, session_keys};
pub use store::CredentialStore;

pub use keyward_core::{IdentitySource, RoleId, StoreError, UserId};
