//! The authenticated identity a successful login binds to its session.

use serde::{Deserialize, Serialize};

use keyward_core::{IdentitySource, UserId};

use crate::record::IdentityRecord;

/// The identity bound to a session after a successful login.
///
/// Only built from a resolved [`IdentityRecord`], so `user_id` is always the
/// canonical id, never whatever string the user typed. Fields are private:
/// a principal does not change once bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    user_id: UserId,
    username: String,
    source: IdentitySource,
}

impl Principal {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }
}

impl From<&IdentityRecord> for Principal {
    fn from(record: &IdentityRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            username: record.username.clone(),
            source: record.source,
        }
    }
}

impl core::fmt::Display for Principal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({}, {})", self.username, self.user_id, self.source)
    }
}
