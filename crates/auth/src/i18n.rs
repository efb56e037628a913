//! Message lookup port for user-facing failure text.

use std::sync::Arc;

/// Stable keys for messages the auth layer can surface.
pub mod message_keys {
    pub const USER_NOT_EXIST: &str = "user_not_exist";
    pub const PASSWORD_IS_INCORRECT: &str = "password_is_incorrect";
    pub const STORE_UNAVAILABLE: &str = "store_unavailable";
}

/// Translates a message key for a locale (e.g. `en_US`, `zh_CN`).
pub trait MessageCatalog: Send + Sync {
    fn message(&self, key: &str, locale: &str) -> Option<String>;
}

impl<T> MessageCatalog for Arc<T>
where
    T: MessageCatalog + ?Sized,
{
    fn message(&self, key: &str, locale: &str) -> Option<String> {
        (**self).message(key, locale)
    }
}
