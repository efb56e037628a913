//! JSON account fixtures for seeding an [`InMemoryCredentialStore`].
//!
//! ```json
//! { "accounts": [
//!   { "user_id": "u1", "username": "alice", "email": "alice@co.com",
//!     "source": "LOCAL", "password": "pw123", "roles": ["admin"] }
//! ] }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use keyward_auth::IdentityRecord;
use keyward_core::{IdentitySource, RoleId, UserId};

use super::in_memory::InMemoryCredentialStore;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    accounts: Vec<AccountFixture>,
}

#[derive(Debug, Deserialize)]
struct AccountFixture {
    user_id: Option<String>,
    username: String,
    name: Option<String>,
    email: String,
    source: IdentitySource,
    #[serde(default)]
    password: String,
    phone: Option<String>,
    language: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl InMemoryCredentialStore {
    /// Build a store from a fixture document. Accounts without a `user_id`
    /// get a freshly minted one.
    pub fn from_fixtures(json: &str) -> anyhow::Result<Self> {
        let file: FixtureFile = serde_json::from_str(json).context("malformed account fixtures")?;
        let store = Self::new();

        for fixture in file.accounts {
            let user_id = match fixture.user_id {
                Some(raw) => UserId::parse(raw)?,
                None => UserId::new(),
            };

            let mut record = IdentityRecord::new(user_id.clone(), fixture.username, fixture.email, fixture.source);
            if let Some(name) = fixture.name {
                record = record.with_name(name);
            }
            if let Some(phone) = fixture.phone {
                record = record.with_phone(phone);
            }
            if let Some(language) = fixture.language {
                record = record.with_language(language);
            }

            let username = record.username.clone();
            store
                .insert(record, &fixture.password)
                .with_context(|| format!("cannot load fixture account '{username}'"))?;
            for role in fixture.roles {
                store.assign_role(&user_id, RoleId::from(role))?;
            }
        }

        tracing::info!(accounts = store.len()?, "credential fixtures loaded");
        Ok(store)
    }

    pub fn from_fixture_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read fixtures from {}", path.display()))?;
        Self::from_fixtures(&json)
    }
}
