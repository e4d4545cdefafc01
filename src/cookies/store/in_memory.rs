use std::sync::{Mutex, PoisonError};

use crate::cookies::store::{apply_payload, CookieEntry, CookiePayload, CookieStore};

/// In-memory cookie store. Keeps insertion order and records every payload
/// it receives, so callers can inspect what was written.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    entries: Mutex<Vec<CookieEntry>>,
    writes: Mutex<Vec<CookiePayload>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `name`/`value` pairs.
    pub fn with_entries<I, N, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(entries.into_iter().map(|(n, v)| CookieEntry::new(n, v)));
        store
    }

    /// Every payload handed to [`CookieStore::set`], oldest first.
    pub fn writes(&self) -> Vec<CookiePayload> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CookieStore for MemoryCookieStore {
    fn get_all(&self) -> Vec<CookieEntry> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, payload: CookiePayload) {
        apply_payload(&mut self.entries.lock().unwrap_or_else(PoisonError::into_inner), &payload);
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).push(payload);
    }
}
