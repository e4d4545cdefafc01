use std::sync::OnceLock;

use http::header::COOKIE;
use http::{HeaderMap, HeaderValue};

use crate::cookies::codec;
use crate::cookies::{CookieMap, CookieStoreHandle};

/// The request half of a context.
///
/// Every method is a capability check with a "not supported" default, so a
/// request type implements only the shapes it actually carries. A type may
/// carry both a structured store and classic fields; the store wins.
pub trait CookieRequest: Send + Sync {
    /// Structured store bound to this request, if any.
    fn cookie_store(&self) -> Option<CookieStoreHandle> {
        None
    }

    /// Cookies already parsed by an upstream middleware.
    fn parsed_cookies(&self) -> Option<&CookieMap> {
        None
    }

    fn parsed_cookies_mut(&mut self) -> Option<&mut CookieMap> {
        None
    }

    /// The raw `Cookie` header, for reads.
    fn cookie_header(&self) -> Option<&dyn CookieHeader> {
        None
    }

    /// The raw `Cookie` header, for the write path. Must be the same object
    /// [`cookie_header`](Self::cookie_header) hands out.
    fn cookie_header_mut(&mut self) -> Option<&mut dyn CookieHeader> {
        None
    }
}

/// A raw `Cookie` request header together with its parsed view.
///
/// Reading and updating live on one trait so a header cannot be readable
/// without also taking the write path's updates.
pub trait CookieHeader: Send + Sync {
    /// The header as sent, if present.
    fn header_value(&self) -> Option<&str>;

    /// The parsed view. `None` when there is no non-empty header.
    fn cookies(&self) -> Option<CookieMap> {
        self.header_value().filter(|h| !h.is_empty()).map(codec::parse)
    }

    /// Called by the write path after it applied a write.
    ///
    /// `cookies` is the updated mapping and must be what [`cookies`](Self::cookies)
    /// returns from now on; `header` is the rebuilt raw header, or `None` when
    /// the header itself should be left as it is.
    fn update_cookies(&mut self, cookies: CookieMap, header: Option<String>);
}

/// A classic server request: a `Cookie` header and, optionally, a mapping
/// parsed by an upstream middleware.
///
/// Parsing the header is cached for the lifetime of the value; the cache is
/// replaced whenever the write path updates the header view, so reads issued
/// after a write within the same request see that write.
#[derive(Debug, Default)]
pub struct ClassicRequest {
    headers: HeaderMap,
    cookies: Option<CookieMap>,
    cache: OnceLock<Option<CookieMap>>,
}

impl ClassicRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_headers(headers: HeaderMap) -> Self {
        Self {
            headers,
            ..Self::default()
        }
    }

    /// Sets the raw `Cookie` header. Values that are not valid header values are dropped.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.store_header(header);
        self
    }

    /// Attaches a mapping parsed by an upstream middleware.
    pub fn with_parsed_cookies(mut self, cookies: CookieMap) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    fn store_header(&mut self, header: &str) {
        match HeaderValue::from_str(header) {
            Ok(value) => {
                self.headers.insert(COOKIE, value);
            }
            Err(e) => log::warn!("cannot store cookie header {header:?}: {e}"),
        }
        self.cache = OnceLock::new();
    }
}

impl<B> From<&http::Request<B>> for ClassicRequest {
    fn from(req: &http::Request<B>) -> Self {
        Self::from_headers(req.headers().clone())
    }
}

impl From<&http::request::Parts> for ClassicRequest {
    fn from(parts: &http::request::Parts) -> Self {
        Self::from_headers(parts.headers.clone())
    }
}

impl CookieRequest for ClassicRequest {
    fn parsed_cookies(&self) -> Option<&CookieMap> {
        self.cookies.as_ref()
    }

    fn parsed_cookies_mut(&mut self) -> Option<&mut CookieMap> {
        self.cookies.as_mut()
    }

    fn cookie_header(&self) -> Option<&dyn CookieHeader> {
        Some(self)
    }

    fn cookie_header_mut(&mut self) -> Option<&mut dyn CookieHeader> {
        Some(self)
    }
}

impl CookieHeader for ClassicRequest {
    fn header_value(&self) -> Option<&str> {
        // Raw bytes, not `to_str`: rewritten headers may carry non-ASCII values.
        self.headers.get(COOKIE).and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
    }

    fn cookies(&self) -> Option<CookieMap> {
        self.cache
            .get_or_init(|| self.header_value().filter(|h| !h.is_empty()).map(codec::parse))
            .clone()
    }

    fn update_cookies(&mut self, cookies: CookieMap, header: Option<String>) {
        if let Some(header) = header {
            self.store_header(&header);
        }
        self.cache = OnceLock::from(Some(cookies));
    }
}
