//! Identity provenance.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Which identity provider owns an account.
///
/// The same username or email may exist once per source, which is why
/// lookups take an explicit set of sources.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentitySource {
    /// Accounts whose password is held by the local credential store.
    Local,
    /// Accounts provisioned from (and authenticated by) a directory server.
    Ldap,
}

impl IdentitySource {
    pub const ALL: [IdentitySource; 2] = [IdentitySource::Local, IdentitySource::Ldap];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdentitySource::Local => "LOCAL",
            IdentitySource::Ldap => "LDAP",
        }
    }
}

impl core::fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsing is exact: the login flow writes these markers verbatim, and any
/// other value is treated as "no declared source" by callers.
impl FromStr for IdentitySource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(IdentitySource::Local),
            "LDAP" => Ok(IdentitySource::Ldap),
            other => Err(DomainError::validation(format!(
                "unknown identity source '{other}'"
            ))),
        }
    }
}
