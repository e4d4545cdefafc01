//! Ambient (browser-like) cookie sink.
//!
//! In a browser the ambient sink is `document.cookie`: reading it yields every
//! visible cookie as `"name=value; name2=value2"`, and assigning one
//! `Set-Cookie` string to it adds, updates or removes exactly that one cookie.
//!
//! The sink is an injected capability ([`AmbientCookies`]) so the crate is
//! testable without a browser. [`DocumentCookies`] models the `document.cookie`
//! semantics in memory: cookies are keyed by `(name, path, domain)`, so a
//! deletion only takes effect with a matching path and domain.

use std::sync::{Arc, Mutex, PoisonError};

use cookie::Cookie;
use time::OffsetDateTime;

/// Get-all-as-string / set-one-string cookie sink.
pub trait AmbientCookies: Send + Sync {
    /// All visible cookies as `"name=value; name2=value2"`.
    fn cookie_string(&self) -> String;

    /// Adds, updates or removes the single cookie described by `set_cookie`.
    fn set_cookie_string(&self, set_cookie: &str);
}

/// A handle to an ambient sink.
pub type AmbientHandle = Arc<dyn AmbientCookies + Send + Sync>;

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    domain: Option<String>,
    expires: Option<OffsetDateTime>,
}

impl StoredCookie {
    fn same_slot(&self, other: &StoredCookie) -> bool {
        self.name == other.name && self.path == other.path && self.domain == other.domain
    }

    fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires.map_or(true, |at| at > now)
    }
}

/// In-memory model of `document.cookie`.
#[derive(Debug, Default)]
pub struct DocumentCookies {
    jar: Mutex<Vec<StoredCookie>>,
}

impl DocumentCookies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink holding the `name=value` pairs of `cookie_string`, all on path `/`.
    pub fn seeded(cookie_string: &str) -> Self {
        let doc = Self::new();
        for pair in cookie_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            doc.set_cookie_string(pair);
        }
        doc
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        let now = OffsetDateTime::now_utc();
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).iter().filter(|c| c.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl AmbientCookies for DocumentCookies {
    fn cookie_string(&self) -> String {
        let now = OffsetDateTime::now_utc();
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        jar.retain(|c| c.is_live(now));
        jar.iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn set_cookie_string(&self, set_cookie: &str) {
        let cookie = match Cookie::parse(set_cookie) {
            Ok(cookie) => cookie,
            Err(e) => {
                log::debug!("ignoring unparsable cookie string {set_cookie:?}: {e}");
                return;
            }
        };

        let now = OffsetDateTime::now_utc();
        let expires = match cookie.max_age() {
            // Past the representable range: never expires, or already has.
            Some(max_age) => match now.checked_add(max_age) {
                Some(at) => Some(at),
                None if max_age.is_positive() => None,
                None => Some(now),
            },
            None => cookie.expires_datetime(),
        };

        let stored = StoredCookie {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            path: cookie.path().unwrap_or("/").to_string(),
            domain: cookie.domain().map(str::to_string),
            expires,
        };

        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = jar.iter().position(|c| c.same_slot(&stored));

        match (slot, stored.is_live(now)) {
            (Some(i), true) => jar[i] = stored,
            (Some(i), false) => {
                jar.remove(i);
            }
            (None, true) => jar.push(stored),
            (None, false) => {}
        }
    }
}
