//! Infrastructure layer: configuration, in-memory adapters for the auth ports.

pub mod config;
pub mod credential_store;
pub mod i18n;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use credential_store::{InMemoryCredentialStore, ProvisionError};
pub use i18n::JsonMessageCatalog;
pub use session::InMemorySession;
