//! Structured cookie stores.
//!
//! A **cookie store** is the cookie surface a component-based server renderer
//! hands out on its request and response objects, or through an accessor
//! function. It can enumerate every cookie and set one cookie at a time.
//!
//! - The read path only ever calls [`CookieStore::get_all`].
//! - The write path only ever calls [`CookieStore::set`], with a
//!   [`CookiePayload`] carrying the name, the coerced value and the caller's
//!   options verbatim.
//!
//! Stores are shared behind a [`CookieStoreHandle`]. Implementations must be
//! `Send + Sync` and internally synchronized, since callers only hold `&self`.
//!
//! Implementations: [`MemoryCookieStore`] (process memory), [`JsonCookieStore`]
//! (a JSON file) and, with the `sqlite_cookie_store` feature,
//! `SqliteCookieStore`.
mod in_memory;
mod json;
#[cfg(feature = "sqlite_cookie_store")]
mod sqlite;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::options::CookieOptions;

pub use in_memory::MemoryCookieStore;
pub use json::JsonCookieStore;
#[cfg(feature = "sqlite_cookie_store")]
pub use sqlite::SqliteCookieStore;

/// A handle to a cookie store trait.
pub type CookieStoreHandle = Arc<dyn CookieStore + Send + Sync>;

/// One `{name, value}` record as enumerated by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieEntry {
    pub name: String,
    pub value: String,
}

impl CookieEntry {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A single write handed to [`CookieStore::set`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CookiePayload {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

impl CookiePayload {
    pub fn new<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options: CookieOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CookieOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether this payload asks for the cookie to be dropped.
    pub fn is_removal(&self) -> bool {
        self.options.max_age.is_some_and(|secs| secs <= 0)
    }
}

/// Applies one payload to an ordered record list: upsert, or drop on removal.
pub(crate) fn apply_payload(entries: &mut Vec<CookieEntry>, payload: &CookiePayload) {
    if payload.is_removal() {
        entries.retain(|c| c.name != payload.name);
    } else if let Some(existing) = entries.iter_mut().find(|c| c.name == payload.name) {
        existing.value = payload.value.clone();
    } else {
        entries.push(CookieEntry::new(payload.name.clone(), payload.value.clone()));
    }
}

/// Enumerate-all / set-one cookie store.
pub trait CookieStore: Send + Sync {
    /// Returns every cookie the store currently holds.
    ///
    /// A name may repeat; readers let later records overwrite earlier ones.
    fn get_all(&self) -> Vec<CookieEntry>;

    /// Sets (or, for a removal payload, drops) one cookie.
    fn set(&self, payload: CookiePayload);

    /// Returns the last record for `name`, if any.
    fn get(&self, name: &str) -> Option<CookieEntry> {
        self.get_all().into_iter().rev().find(|c| c.name == name)
    }

    fn has(&self, name: &str) -> bool {
        self.get_all().iter().any(|c| c.name == name)
    }

    /// Drops `name` by writing an immediately expiring empty value.
    fn delete(&self, name: &str) {
        self.set(CookiePayload::new(name, "").with_options(CookieOptions::new().for_deletion()));
    }
}
