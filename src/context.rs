//! Call context and its classification.
//!
//! A [`CookieContext`] is what callers pass to every operation. It may hold
//! a request, a response and a store accessor, all optional. Before any
//! operation touches a backend, [`classify`] turns the context into exactly
//! one [`ContextKind`], and the read and write paths dispatch on that tag.
//!
//! # Classification
//!
//! 1. **Structured** when the accessor is present, or when the request or the
//!    response exposes a cookie store.
//! 2. **Classic** when a request and/or a response is present.
//! 3. **Ambient** otherwise.
//!
//! Detection is capability probing through the [`CookieRequest`] and
//! [`CookieResponse`] methods, never the concrete type. A request carrying
//! both a store and classic fields is structured.
//!
//! ```rust
//! use gosub_cookies::context::{ClassicRequest, ContextKind, CookieContext};
//!
//! let mut req = ClassicRequest::new().with_cookie_header("x=y");
//! let ctx = CookieContext::new().with_req(&mut req);
//! assert_eq!(ctx.kind(), ContextKind::Classic);
//! assert_eq!(CookieContext::ambient().kind(), ContextKind::Ambient);
//! ```

pub mod accessor;
mod carrier;
mod request;
mod response;

pub use accessor::{CookieAccessor, StoreFuture};
pub use carrier::StoreCarrier;
pub use request::{ClassicRequest, CookieHeader, CookieRequest};
pub use response::CookieResponse;

/// Which backend is authoritative for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// No request/response: the ambient (browser) sink.
    Ambient,
    /// Classic request/response headers or a pre-parsed map.
    Classic,
    /// Request-, response- or accessor-bound cookie stores.
    Structured,
}

/// Optional request, response and store accessor for one call.
#[derive(Default)]
pub struct CookieContext<'a> {
    req: Option<&'a mut dyn CookieRequest>,
    res: Option<&'a mut dyn CookieResponse>,
    cookies: Option<&'a dyn CookieAccessor>,
}

impl std::fmt::Debug for CookieContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieContext")
            .field("req", &self.req.is_some())
            .field("res", &self.res.is_some())
            .field("cookies", &self.cookies.is_some())
            .field("kind", &self.kind())
            .finish()
    }
}

impl<'a> CookieContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context with nothing in it: operations use the ambient sink.
    pub fn ambient() -> Self {
        Self::default()
    }

    pub fn with_req(mut self, req: &'a mut dyn CookieRequest) -> Self {
        self.req = Some(req);
        self
    }

    pub fn with_res(mut self, res: &'a mut dyn CookieResponse) -> Self {
        self.res = Some(res);
        self
    }

    pub fn with_cookies(mut self, accessor: &'a dyn CookieAccessor) -> Self {
        self.cookies = Some(accessor);
        self
    }

    pub fn req(&self) -> Option<&(dyn CookieRequest + 'a)> {
        self.req.as_deref()
    }

    pub fn res(&self) -> Option<&(dyn CookieResponse + 'a)> {
        self.res.as_deref()
    }

    pub fn accessor(&self) -> Option<&'a dyn CookieAccessor> {
        self.cookies
    }

    /// Both halves at once, for writes that touch request and response together.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (Option<&mut (dyn CookieRequest + 'a)>, Option<&mut (dyn CookieResponse + 'a)>) {
        (self.req.as_deref_mut(), self.res.as_deref_mut())
    }

    /// Whether the context carries anything only a server can provide.
    pub fn carries_server_objects(&self) -> bool {
        self.req.is_some() || self.res.is_some() || self.cookies.is_some()
    }

    pub fn kind(&self) -> ContextKind {
        classify(self)
    }
}

/// Decides which backend is authoritative for `ctx`. Pure; never fails.
pub fn classify(ctx: &CookieContext<'_>) -> ContextKind {
    let req_store = ctx.req().is_some_and(|r| r.cookie_store().is_some());
    let res_store = ctx.res().is_some_and(|r| r.cookie_store().is_some());

    if ctx.cookies.is_some() || req_store || res_store {
        ContextKind::Structured
    } else if ctx.req.is_some() || ctx.res.is_some() {
        ContextKind::Classic
    } else {
        ContextKind::Ambient
    }
}
