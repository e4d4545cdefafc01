use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue};

use crate::cookies::CookieStoreHandle;

/// The response half of a context.
///
/// As with [`CookieRequest`](super::CookieRequest), every method is a
/// capability check with a "not supported" default.
///
/// `Set-Cookie` values travel as [`HeaderValue`]s so values that are not
/// visible ASCII survive the read-append-replace round trip unchanged.
pub trait CookieResponse: Send + Sync {
    /// Structured store bound to this response, if any.
    fn cookie_store(&self) -> Option<CookieStoreHandle> {
        None
    }

    /// Current `Set-Cookie` values, or `None` when this response has no
    /// header access. A missing header reads as an empty list.
    fn set_cookie_headers(&self) -> Option<Vec<HeaderValue>> {
        None
    }

    /// Replaces every `Set-Cookie` value with `values`.
    fn replace_set_cookie_headers(&mut self, values: Vec<HeaderValue>) {
        let _ = values;
    }
}

impl CookieResponse for HeaderMap {
    fn set_cookie_headers(&self) -> Option<Vec<HeaderValue>> {
        Some(self.get_all(SET_COOKIE).iter().cloned().collect())
    }

    fn replace_set_cookie_headers(&mut self, values: Vec<HeaderValue>) {
        self.remove(SET_COOKIE);
        for value in values {
            self.append(SET_COOKIE, value);
        }
    }
}

impl<B: Send + Sync> CookieResponse for http::Response<B> {
    fn set_cookie_headers(&self) -> Option<Vec<HeaderValue>> {
        self.headers().set_cookie_headers()
    }

    fn replace_set_cookie_headers(&mut self, values: Vec<HeaderValue>) {
        self.headers_mut().replace_set_cookie_headers(values)
    }
}
