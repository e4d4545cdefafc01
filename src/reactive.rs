//! Reactive cookie state for client code.
//!
//! [`ReactiveCookies`] keeps a snapshot of the ambient cookies that UI code
//! can observe. Writes go through to the sink and update the snapshot in the
//! same call; [`revalidate`](ReactiveCookies::revalidate) picks up changes
//! made behind its back.

use serde::Serialize;
use tokio::sync::watch;

use crate::access::read;
use crate::client::ClientCookies;
use crate::context::CookieContext;
use crate::cookies::codec;
use crate::cookies::value::{self, CookieValue};
use crate::cookies::{CookieMap, CookieOptions};
use crate::errors::CookieError;
use crate::watch::{revalidate, CookieChange};

#[derive(Debug)]
pub struct ReactiveCookies {
    client: ClientCookies,
    state: watch::Sender<CookieMap>,
}

impl ReactiveCookies {
    /// Seeds the snapshot from the client's current cookies.
    pub fn new(client: ClientCookies) -> Result<Self, CookieError> {
        let initial = client.get_cookies(&CookieContext::ambient())?;
        let (state, _rx) = watch::channel(initial);
        Ok(Self { client, state })
    }

    /// Receives every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CookieMap> {
        self.state.subscribe()
    }

    pub fn get(&self, key: &str) -> Option<CookieValue> {
        read::lookup(&self.state.borrow(), key, self.client.config().value_policy)
    }

    pub fn get_all(&self) -> CookieMap {
        self.state.borrow().clone()
    }

    pub fn has(&self, key: &str) -> bool {
        !key.is_empty() && self.state.borrow().contains_key(key)
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T, options: &CookieOptions) -> Result<(), CookieError> {
        let stored = value::stringify(data)?;
        self.client.set_cookie(key, &stored, &CookieContext::ambient(), options)?;

        // Snapshot holds what the sink holds, so `revalidate` sees no change.
        let encoded = codec::encode_value(&stored);
        self.state.send_modify(|m| {
            m.insert(key.to_string(), encoded);
        });
        Ok(())
    }

    pub fn delete(&self, key: &str, options: &CookieOptions) -> Result<(), CookieError> {
        self.client.delete_cookie(key, &CookieContext::ambient(), options)?;
        self.state.send_if_modified(|m| m.remove(key).is_some());
        Ok(())
    }

    /// Re-reads the sink and publishes the result when it differs.
    pub fn revalidate(&self) -> Result<Vec<CookieChange>, CookieError> {
        let next = self.client.get_cookies(&CookieContext::ambient())?;
        let changes = revalidate(&self.state.borrow(), &next);
        if !changes.is_empty() {
            self.state.send_replace(next);
        }
        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CookieConfig;
    use crate::cookies::{AmbientCookies, DocumentCookies};
    use crate::env::Environment;
    use serde_json::json;
    use std::sync::Arc;

    fn reactive(doc: Arc<DocumentCookies>) -> ReactiveCookies {
        ReactiveCookies::new(ClientCookies::new(Environment::browser(doc), CookieConfig::default())).unwrap()
    }

    #[test]
    fn seeded_from_sink() {
        let cookies = reactive(Arc::new(DocumentCookies::seeded("a=1; b=2")));
        assert_eq!(cookies.get_all().len(), 2);
        assert!(cookies.has("a"));
        assert!(!cookies.has(""));
        assert_eq!(cookies.get("b"), Some(CookieValue::Text("2".into())));
    }

    #[test]
    fn set_writes_through_and_updates_snapshot() {
        let doc = Arc::new(DocumentCookies::new());
        let cookies = reactive(doc.clone());
        let mut rx = cookies.subscribe();

        cookies.set("user", &json!({"name": "ada lovelace"}), &CookieOptions::new()).unwrap();

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert!(snapshot["user"].contains("%22"), "{}", snapshot["user"]);

        let value = cookies.get("user").unwrap();
        assert_eq!(value.json::<serde_json::Value>().unwrap(), json!({"name": "ada lovelace"}));
        assert!(doc.cookie_string().starts_with("user="));
    }

    #[test]
    fn snapshot_matches_sink_for_reserved_characters() {
        let doc = Arc::new(DocumentCookies::new());
        let cookies = reactive(doc.clone());

        cookies.set("q", "a&b(c)", &CookieOptions::new()).unwrap();

        let sink = read::parse_ambient(&doc.cookie_string());
        assert_eq!(cookies.get_all()["q"], sink["q"]);
        assert!(cookies.revalidate().unwrap().is_empty());
        assert_eq!(cookies.get("q"), Some(CookieValue::Text("a&b(c)".into())));
    }

    #[test]
    fn delete_removes_from_both() {
        let doc = Arc::new(DocumentCookies::seeded("gone=1"));
        let cookies = reactive(doc.clone());
        cookies.delete("gone", &CookieOptions::new()).unwrap();
        assert!(!cookies.has("gone"));
        assert!(doc.is_empty());
    }

    #[test]
    fn revalidate_picks_up_external_writes() {
        let doc = Arc::new(DocumentCookies::seeded("a=1"));
        let cookies = reactive(doc.clone());
        let rx = cookies.subscribe();

        assert!(cookies.revalidate().unwrap().is_empty());
        assert!(!rx.has_changed().unwrap());

        doc.set_cookie_string("a=2");
        let changes = cookies.revalidate().unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].new_value.as_deref(), Some("2"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(cookies.get("a"), Some(CookieValue::Text("2".into())));
    }
}
