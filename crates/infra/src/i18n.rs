//! Message catalogs for user-facing auth failures.

use std::collections::HashMap;

use serde::Deserialize;

use keyward_auth::{MessageCatalog, message_keys};

pub const DEFAULT_LOCALE: &str = "en_US";

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        "en_US",
        &[
            (message_keys::USER_NOT_EXIST, "User does not exist: "),
            (message_keys::PASSWORD_IS_INCORRECT, "Incorrect password"),
            (
                message_keys::STORE_UNAVAILABLE,
                "Login is temporarily unavailable, please try again later",
            ),
        ],
    ),
    (
        "zh_CN",
        &[
            (message_keys::USER_NOT_EXIST, "用户不存在："),
            (message_keys::PASSWORD_IS_INCORRECT, "密码错误"),
            (message_keys::STORE_UNAVAILABLE, "登录服务暂不可用，请稍后重试"),
        ],
    ),
];

/// Locale → key → text tables with a fallback locale.
///
/// Locales are matched after normalizing `-` to `_` (`zh-CN` == `zh_CN`).
#[derive(Debug, Clone, Deserialize)]
pub struct JsonMessageCatalog {
    #[serde(default = "default_locale")]
    fallback: String,
    tables: HashMap<String, HashMap<String, String>>,
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn normalize(locale: &str) -> String {
    locale.replace('-', "_")
}

impl JsonMessageCatalog {
    /// English and Simplified Chinese tables for the auth message keys.
    pub fn builtin() -> Self {
        let tables = BUILTIN
            .iter()
            .map(|(locale, entries)| {
                let table = entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (locale.to_string(), table)
            })
            .collect();
        Self {
            fallback: default_locale(),
            tables,
        }
    }

    /// Parse `{ "fallback": "en_US", "tables": { "en_US": { "key": "text" } } }`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog: Self = serde_json::from_str(json)?;
        catalog.fallback = normalize(&catalog.fallback);
        catalog.tables = catalog
            .tables
            .into_iter()
            .map(|(locale, table)| (normalize(&locale), table))
            .collect();
        Ok(catalog)
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merged(mut self, other: JsonMessageCatalog) -> Self {
        for (locale, table) in other.tables {
            self.tables.entry(locale).or_default().extend(table);
        }
        self
    }

    pub fn with_fallback(mut self, locale: &str) -> Self {
        self.fallback = normalize(locale);
        self
    }

    pub fn locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }
}

impl MessageCatalog for JsonMessageCatalog {
    fn message(&self, key: &str, locale: &str) -> Option<String> {
        let lookup = |locale: &str| self.tables.get(locale)?.get(key).cloned();
        lookup(&normalize(locale)).or_else(|| lookup(&self.fallback))
    }
}
