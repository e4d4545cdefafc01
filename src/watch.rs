//! Change detection for the ambient sink.
//!
//! Browsers do not announce cookie changes, so the poller re-reads the sink on
//! an interval and diffs the result against the previous snapshot. Changes go
//! out on a broadcast channel and, optionally, to a callback that receives the
//! new mapping.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::ClientCookies;
use crate::context::CookieContext;
use crate::cookies::CookieMap;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A handle for receiving cookie change notifications.
pub type Subscription = broadcast::Receiver<CookieChange>;

/// Called with the full new mapping whenever a poll finds changes.
pub type ChangeCallback = Arc<dyn Fn(&CookieMap) + Send + Sync>;

/// One key that differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieChange {
    pub key: String,
    /// `None` when the cookie was added.
    pub old_value: Option<String>,
    /// `None` when the cookie was removed.
    pub new_value: Option<String>,
}

impl CookieChange {
    pub fn is_added(&self) -> bool {
        self.old_value.is_none()
    }

    pub fn is_removed(&self) -> bool {
        self.new_value.is_none()
    }
}

/// Diffs two snapshots key by key. The result is sorted by key.
pub fn revalidate(prev: &CookieMap, next: &CookieMap) -> Vec<CookieChange> {
    let mut changes: Vec<CookieChange> = next
        .iter()
        .filter(|(k, v)| prev.get(*k) != Some(*v))
        .map(|(k, v)| CookieChange {
            key: k.clone(),
            old_value: prev.get(k).cloned(),
            new_value: Some(v.clone()),
        })
        .collect();

    changes.extend(prev.iter().filter(|(k, _)| !next.contains_key(*k)).map(|(k, v)| CookieChange {
        key: k.clone(),
        old_value: Some(v.clone()),
        new_value: None,
    }));

    changes.sort_by(|a, b| a.key.cmp(&b.key));
    changes
}

/// Polls the ambient sink of a [`ClientCookies`] for changes.
///
/// Interval and on/off come from the client's
/// [`PollingOptions`](crate::config::PollingOptions); polling is off unless
/// enabled there. The background task is aborted on [`stop`](Self::stop) or
/// drop.
pub struct CookiePoller {
    client: ClientCookies,
    interval: Duration,
    enabled: bool,
    tx: broadcast::Sender<CookieChange>,
    callback: Option<ChangeCallback>,
    task: Option<JoinHandle<()>>,
}

impl fmt::Debug for CookiePoller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookiePoller")
            .field("interval", &self.interval)
            .field("enabled", &self.enabled)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CookiePoller {
    pub fn new(client: ClientCookies) -> Self {
        let polling = client.config().polling;
        let (tx, _rx) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            client,
            interval: polling.interval,
            enabled: polling.enabled,
            tx,
            callback: None,
            task: None,
        }
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&CookieMap) + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }

    pub fn subscribe(&self) -> Subscription {
        self.tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Takes the current mapping as baseline and starts polling.
    ///
    /// Returns `false` when polling is disabled. Must be called from within a
    /// tokio runtime.
    pub fn start(&mut self) -> bool {
        if !self.enabled {
            log::debug!("cookie polling disabled; not starting");
            return false;
        }
        if self.is_running() {
            return true;
        }

        let client = self.client.clone();
        let tx = self.tx.clone();
        let callback = self.callback.clone();
        let period = self.interval;
        let mut prev = snapshot(&client);

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let next = snapshot(&client);
                let changes = revalidate(&prev, &next);
                if changes.is_empty() {
                    continue;
                }
                log::debug!("cookie poll found {} change(s)", changes.len());
                for change in changes {
                    // Fails only when nobody is subscribed.
                    let _ = tx.send(change);
                }
                if let Some(cb) = &callback {
                    cb(&next);
                }
                prev = next;
            }
        }));
        true
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CookiePoller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn snapshot(client: &ClientCookies) -> CookieMap {
    client.get_cookies(&CookieContext::ambient()).unwrap_or_else(|e| {
        log::warn!("cookie poll could not read the ambient sink: {e}");
        CookieMap::new()
    })
}
