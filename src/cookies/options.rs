use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::errors::CookieError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `SameSite` attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// When a cookie expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Expires {
    /// Absolute point in time.
    At(OffsetDateTime),
    /// Number of days from the moment of the write. Converted to [`Expires::At`]
    /// before serialization.
    Days(f64),
}

/// Options applied to a single cookie write.
///
/// Everything is passed through to the codec or the structured store verbatim,
/// except [`Expires::Days`], which is turned into an absolute timestamp first.
///
/// ```rust
/// use gosub_cookies::cookies::{CookieOptions, SameSite};
///
/// let opts = CookieOptions::new()
///     .path("/account")
///     .max_age(3600)
///     .http_only(true)
///     .same_site(SameSite::Lax);
/// assert_eq!(opts.path.as_deref(), Some("/account"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieOptions {
    pub path: Option<String>,
    pub domain: Option<String>,
    pub expires: Option<Expires>,
    /// Seconds. A negative value asks the user agent to drop the cookie at once.
    pub max_age: Option<i64>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
    pub partitioned: bool,
}

impl CookieOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn expires_at(mut self, at: OffsetDateTime) -> Self {
        self.expires = Some(Expires::At(at));
        self
    }

    pub fn expires_in_days(mut self, days: f64) -> Self {
        self.expires = Some(Expires::Days(days));
        self
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, on: bool) -> Self {
        self.secure = on;
        self
    }

    pub fn http_only(mut self, on: bool) -> Self {
        self.http_only = on;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    pub fn partitioned(mut self, on: bool) -> Self {
        self.partitioned = on;
        self
    }

    /// Returns a copy where a day-count `expires` is resolved against `now`.
    ///
    /// Fails when the day count is not finite or the resulting instant is not
    /// representable.
    pub fn normalized(&self, now: OffsetDateTime) -> Result<Self, CookieError> {
        let mut out = self.clone();
        if let Some(Expires::Days(days)) = self.expires {
            let at = Duration::checked_seconds_f64(days * SECONDS_PER_DAY)
                .and_then(|offset| now.checked_add(offset))
                .ok_or_else(|| CookieError::Expiry(format!("{days} days from {now}")))?;
            out.expires = Some(Expires::At(at));
        }
        Ok(out)
    }

    /// Returns a copy that requests immediate deletion, keeping path and domain.
    pub fn for_deletion(&self) -> Self {
        let mut out = self.clone();
        out.max_age = Some(-1);
        out
    }

    /// Returns a copy with `path` filled in from `default` when the caller left it empty.
    pub fn with_default_path(&self, default: Option<&str>) -> Self {
        let mut out = self.clone();
        if out.path.is_none() {
            out.path = default.map(str::to_string);
        }
        out
    }

    /// The absolute expiry, if it has already been normalized or was given absolute.
    pub fn expires_at_time(&self) -> Option<OffsetDateTime> {
        match self.expires {
            Some(Expires::At(at)) => Some(at),
            _ => None,
        }
    }
}
