//! Credential store adapters.

pub mod fixtures;
pub mod in_memory;
pub mod password;

pub use in_memory::{InMemoryCredentialStore, ProvisionError};
pub use password::PasswordDigest;
