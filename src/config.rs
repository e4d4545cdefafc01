//! Cookie access configuration.
//!
//! `CookieConfig` controls the policies the read and write paths apply on
//! every call: which default `Path` a serialized cookie receives, whether
//! single-key reads coerce sentinel strings, how a classic request's raw
//! `Cookie` header is rebuilt after a write, and what client-side entry
//! points do while the client is being rendered on the server.
//!
//! `CookieConfig` provides defaults via [`Default`] and a fluent
//! [`CookieConfig::builder()`] with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_cookies::config::{CookieConfig, ValuePolicy};
//! let cfg = CookieConfig::default();
//! assert_eq!(cfg.default_path.as_deref(), Some("/"));
//! assert_eq!(cfg.value_policy, ValuePolicy::Verbatim);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_cookies::config::{CookieConfig, HeaderRewrite, ValuePolicy};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = CookieConfig::builder()
//!     .default_path("/app")
//!     .value_policy(ValuePolicy::Legacy)
//!     .header_rewrite(HeaderRewrite::Encoded)
//!     .build()?; // returns Result<CookieConfig, CookieConfigError>
//! # Ok(()) }
//! ```
//!
//! # Errors
//!
//! Builder validation returns [`CookieConfigError`] when the default path is
//! not absolute or the polling interval is zero while polling is enabled.

use std::fmt;
use std::time::Duration;

/// How a stored string is handed back by single-key reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuePolicy {
    /// Always return the stored string.
    #[default]
    Verbatim,
    /// Coerce `"true"`, `"false"` and `"null"` to typed values and treat
    /// `"undefined"` as absent.
    Legacy,
}

/// How the raw `Cookie` header of a classic request is rebuilt after a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderRewrite {
    /// Flat `name=value;` concatenation, values neither escaped nor spaced.
    #[default]
    Legacy,
    /// `name=value; name2=value2` with values percent-encoded by the codec.
    Encoded,
    /// Leave the header alone; only the request's parse cache sees the write.
    Off,
}

/// What client entry points do while the client renders on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhasePolicy {
    /// Reads come back empty, writes do nothing.
    #[default]
    Skip,
    /// Fail with [`CookieError::RenderPhase`](crate::errors::CookieError::RenderPhase).
    Fail,
}

/// Interval polling of the ambient cookie string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingOptions {
    pub interval: Duration,
    pub enabled: bool,
}

impl Default for PollingOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// `Path` applied to serialized cookies when the caller gives none.
    pub default_path: Option<String>,
    pub value_policy: ValuePolicy,
    pub header_rewrite: HeaderRewrite,
    pub render_phase_policy: RenderPhasePolicy,
    pub polling: PollingOptions,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            default_path: Some("/".to_string()),
            value_policy: ValuePolicy::Verbatim,
            header_rewrite: HeaderRewrite::Legacy,
            render_phase_policy: RenderPhasePolicy::Skip,
            polling: PollingOptions::default(),
        }
    }
}

impl CookieConfig {
    pub fn builder() -> CookieConfigBuilder {
        CookieConfigBuilder::default()
    }
}

/// Builder for [`CookieConfig`].
#[derive(Debug, Clone, Default)]
pub struct CookieConfigBuilder {
    inner: CookieConfig,
}

impl CookieConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut CookieConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn default_path<S: Into<String>>(self, path: S) -> Self { self.map(|c| c.default_path = Some(path.into())) }
    pub fn no_default_path(self) -> Self { self.map(|c| c.default_path = None) }
    pub fn value_policy(self, policy: ValuePolicy) -> Self { self.map(|c| c.value_policy = policy) }
    pub fn header_rewrite(self, rewrite: HeaderRewrite) -> Self { self.map(|c| c.header_rewrite = rewrite) }
    pub fn render_phase_policy(self, policy: RenderPhasePolicy) -> Self { self.map(|c| c.render_phase_policy = policy) }
    pub fn polling_interval(self, interval: Duration) -> Self { self.map(|c| c.polling.interval = interval) }
    pub fn polling_enabled(self, on: bool) -> Self { self.map(|c| c.polling.enabled = on) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut CookieConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<CookieConfig, CookieConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieConfigError {
    RelativeDefaultPath(String),
    ZeroPollingInterval,
}

impl fmt::Display for CookieConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieConfigError::RelativeDefaultPath(p) =>
                write!(f, "default_path {p:?} must start with '/'"),
            CookieConfigError::ZeroPollingInterval =>
                write!(f, "polling interval must be greater than zero when polling is enabled"),
        }
    }
}
impl std::error::Error for CookieConfigError {}

fn validate(c: &CookieConfig) -> Result<(), CookieConfigError> {
    if let Some(path) = &c.default_path {
        if !path.starts_with('/') {
            return Err(CookieConfigError::RelativeDefaultPath(path.clone()));
        }
    }
    if c.polling.enabled && c.polling.interval.is_zero() {
        return Err(CookieConfigError::ZeroPollingInterval);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_latest_behaviour() {
        let cfg = CookieConfig::default();
        assert_eq!(cfg.default_path.as_deref(), Some("/"));
        assert_eq!(cfg.value_policy, ValuePolicy::Verbatim);
        assert_eq!(cfg.header_rewrite, HeaderRewrite::Legacy);
        assert_eq!(cfg.render_phase_policy, RenderPhasePolicy::Skip);
        assert!(!cfg.polling.enabled);
        assert_eq!(cfg.polling.interval, Duration::from_secs(1));
    }

    #[test]
    fn builder_applies_settings() {
        let cfg = CookieConfig::builder()
            .default_path("/shop")
            .value_policy(ValuePolicy::Legacy)
            .render_phase_policy(RenderPhasePolicy::Fail)
            .polling_enabled(true)
            .polling_interval(Duration::from_millis(250))
            .build()
            .unwrap();

        assert_eq!(cfg.default_path.as_deref(), Some("/shop"));
        assert_eq!(cfg.value_policy, ValuePolicy::Legacy);
        assert_eq!(cfg.render_phase_policy, RenderPhasePolicy::Fail);
        assert_eq!(cfg.polling.interval, Duration::from_millis(250));
    }

    #[test]
    fn relative_default_path_is_rejected() {
        let err = CookieConfig::builder().default_path("shop").build().unwrap_err();
        assert_eq!(err, CookieConfigError::RelativeDefaultPath("shop".into()));
    }

    #[test]
    fn zero_interval_only_matters_when_polling() {
        assert!(CookieConfig::builder().polling_interval(Duration::ZERO).build().is_ok());
        let err = CookieConfig::builder()
            .polling_enabled(true)
            .polling_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, CookieConfigError::ZeroPollingInterval);
    }
}
