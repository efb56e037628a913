//! `keyward-login` — run one login against the configured in-memory store.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use keyward_auth::{
    Authenticate, Authenticator, Authorize, AuthorizationResolver, LoginAttempt, Principal,
    session_keys,
};
use keyward_infra::{AppConfig, InMemoryCredentialStore, InMemorySession, JsonMessageCatalog};

#[derive(Debug, Parser, PartialEq, Eq)]
#[command(name = "keyward-login", about = "Run one login against the configured credential store")]
struct Args {
    username: String,

    password: String,

    /// Declared identity source marker; anything but LOCAL/LDAP selects the unrestricted lookup.
    #[arg(long, value_name = "LOCAL|LDAP")]
    source: Option<String>,

    /// Email captured by the directory login step.
    #[arg(long)]
    email: Option<String>,
}

#[derive(Serialize)]
struct LoginReport<'a> {
    principal: &'a Principal,
    roles: Vec<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    let config = AppConfig::from_env()?;
    keyward_observability::init(config.log_format);

    let store = Arc::new(match &config.fixtures {
        Some(path) => InMemoryCredentialStore::from_fixture_file(path)?,
        None => {
            tracing::warn!("KEYWARD_FIXTURES not set; starting with an empty credential store");
            InMemoryCredentialStore::new()
        }
    });

    let authenticator = Authenticator::new(Arc::clone(&store), config.auth_settings());
    let resolver = AuthorizationResolver::new(store);

    // Stand-in for the earlier login-flow steps that set the session markers.
    let session = InMemorySession::new();
    if let Some(source) = &args.source {
        session.put_attribute(session_keys::DECLARED_SOURCE, source.as_str())?;
    }
    if let Some(email) = &args.email {
        session.put_attribute(session_keys::EMAIL, email.as_str())?;
    }

    let attempt = LoginAttempt::from_session(args.username, args.password, &session);
    match authenticator.authenticate(&attempt, &session) {
        Ok(principal) => {
            let mut roles: Vec<String> = resolver
                .roles_of(principal.user_id())?
                .into_iter()
                .map(|r| r.to_string())
                .collect();
            roles.sort();

            let report = LoginReport {
                principal: &principal,
                roles,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_rejection() => {
            let catalog = JsonMessageCatalog::builtin();
            eprintln!("{}", err.localized(&catalog, &config.locale));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
