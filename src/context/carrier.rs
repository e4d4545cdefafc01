use crate::cookies::CookieStoreHandle;

use super::{CookieRequest, CookieResponse};

/// A request or response object exposing a structured cookie store, the way
/// component-based renderers hand out `req.cookies` / `res.cookies`.
#[derive(Clone)]
pub struct StoreCarrier {
    store: CookieStoreHandle,
}

impl StoreCarrier {
    pub fn new(store: CookieStoreHandle) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CookieStoreHandle {
        &self.store
    }
}

impl std::fmt::Debug for StoreCarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCarrier").finish_non_exhaustive()
    }
}

impl CookieRequest for StoreCarrier {
    fn cookie_store(&self) -> Option<CookieStoreHandle> {
        Some(self.store.clone())
    }
}

impl CookieResponse for StoreCarrier {
    fn cookie_store(&self) -> Option<CookieStoreHandle> {
        Some(self.store.clone())
    }
}
