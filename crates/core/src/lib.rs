//! `keyward-core` — identity building blocks shared by every keyward crate.
//!
//! This crate contains **pure** primitives (no IO, no logging).

pub mod error;
pub mod id;
pub mod source;

pub use error::{DomainError, DomainResult, StoreError};
pub use id::{RoleId, UserId};
pub use source::IdentitySource;
