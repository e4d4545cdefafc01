use std::future::Future;

use futures::future::BoxFuture;

use crate::cookies::CookieStoreHandle;
use crate::errors::CookieError;

/// Future resolving an accessor's store.
pub type StoreFuture<'a> = BoxFuture<'a, Result<CookieStoreHandle, CookieError>>;

/// A function-style accessor that resolves a cookie store, possibly asynchronously.
///
/// Any `Fn() -> impl Future<Output = Result<CookieStoreHandle, CookieError>>`
/// closure is an accessor.
pub trait CookieAccessor: Send + Sync {
    fn cookies(&self) -> StoreFuture<'_>;
}

impl<F, Fut> CookieAccessor for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<CookieStoreHandle, CookieError>> + Send + 'static,
{
    fn cookies(&self) -> StoreFuture<'_> {
        Box::pin(self())
    }
}

/// An accessor that resolves immediately to `store`.
pub fn ready(store: CookieStoreHandle) -> impl CookieAccessor {
    move || {
        let store = store.clone();
        async move { Ok::<_, CookieError>(store) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::{CookieStore, MemoryCookieStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn ready_accessor_yields_the_same_store() {
        let store: CookieStoreHandle = Arc::new(MemoryCookieStore::with_entries([("a", "1")]));
        let accessor = ready(store.clone());

        let resolved = accessor.cookies().await.unwrap();
        assert!(Arc::ptr_eq(&resolved, &store));
        assert!(resolved.has("a"));
    }

    #[tokio::test]
    async fn failing_accessor_reports_error() {
        let accessor = || async { Err::<CookieStoreHandle, _>(CookieError::Accessor("no request scope".into())) };
        assert!(matches!(accessor.cookies().await, Err(CookieError::Accessor(_))));
    }
}
