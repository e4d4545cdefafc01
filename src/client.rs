//! Client-tier entry point.
//!
//! Only the ambient sink is reachable from here, so every operation is
//! synchronous. Passing a request, response or store accessor is an error:
//! those belong to [`ServerCookies`](crate::server::ServerCookies).
//!
//! While the client is rendered on the server (no sink yet) reads come back
//! empty and writes do nothing, unless
//! [`RenderPhasePolicy::Fail`](crate::config::RenderPhasePolicy::Fail) is set.

use serde::Serialize;

use crate::access::{read, write};
use crate::config::CookieConfig;
use crate::context::CookieContext;
use crate::cookies::value::{self, CookieValue};
use crate::cookies::{CookieMap, CookieOptions};
use crate::env::{ensure_client_side, ClientGate, Environment};
use crate::errors::CookieError;

#[derive(Debug, Clone)]
pub struct ClientCookies {
    env: Environment,
    config: CookieConfig,
}

impl ClientCookies {
    pub fn new(env: Environment, config: CookieConfig) -> Self {
        Self { env, config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    fn gate(&self, ctx: &CookieContext<'_>) -> Result<ClientGate, CookieError> {
        ensure_client_side(&self.env, ctx, self.config.render_phase_policy)
    }

    pub fn get_cookies(&self, ctx: &CookieContext<'_>) -> Result<CookieMap, CookieError> {
        match self.gate(ctx)? {
            ClientGate::Open => Ok(read::ambient_cookies(&self.env)),
            ClientGate::Skip => Ok(CookieMap::new()),
        }
    }

    pub fn get_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<Option<CookieValue>, CookieError> {
        let cookies = self.get_cookies(ctx)?;
        Ok(read::lookup(&cookies, key, self.config.value_policy))
    }

    pub fn set_cookie<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ctx: &CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        if self.gate(ctx)? == ClientGate::Skip {
            return Ok(());
        }
        let value = value::stringify(data)?;
        write::write_ambient(&self.env, &self.config, key, &value, options)
    }

    /// Expires `key` in the ambient sink. The sink only drops the cookie when
    /// `path` and `domain` match the ones it was set with.
    pub fn delete_cookie(&self, key: &str, ctx: &CookieContext<'_>, options: &CookieOptions) -> Result<(), CookieError> {
        self.set_cookie(key, "", ctx, &options.for_deletion())
    }

    pub fn has_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<bool, CookieError> {
        if key.is_empty() {
            return Ok(false);
        }
        Ok(self.get_cookies(ctx)?.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderPhasePolicy;
    use crate::context::ClassicRequest;
    use crate::cookies::{AmbientCookies, DocumentCookies};
    use crate::env::RenderPhase;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn client_with(doc: Arc<DocumentCookies>) -> ClientCookies {
        ClientCookies::new(Environment::browser(doc), CookieConfig::default())
    }

    fn ctx() -> CookieContext<'static> {
        CookieContext::ambient()
    }

    #[test]
    fn reads_ambient_string() {
        let client = client_with(Arc::new(DocumentCookies::seeded("a=1; b=2")));
        let cookies = client.get_cookies(&ctx()).unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["a"], "1");
        assert_eq!(cookies["b"], "2");
    }

    #[test]
    fn set_then_get_round_trips() {
        let client = client_with(Arc::new(DocumentCookies::new()));
        client.set_cookie("msg", "hi there; ok", &ctx(), &CookieOptions::new()).unwrap();
        assert_eq!(
            client.get_cookie("msg", &ctx()).unwrap(),
            Some(CookieValue::Text("hi there; ok".into()))
        );
    }

    #[test]
    fn structured_data_round_trips_as_json() {
        let client = client_with(Arc::new(DocumentCookies::new()));
        let mut prefs = BTreeMap::new();
        prefs.insert("theme", "dark");
        client.set_cookie("prefs", &prefs, &ctx(), &CookieOptions::new()).unwrap();

        let value = client.get_cookie("prefs", &ctx()).unwrap().unwrap();
        assert_eq!(value.as_str(), Some(r#"{"theme":"dark"}"#));
        assert_eq!(value.json::<BTreeMap<String, String>>().unwrap()["theme"], "dark");
    }

    #[test]
    fn repeated_set_is_idempotent() {
        let doc = Arc::new(DocumentCookies::new());
        let client = client_with(doc.clone());
        client.set_cookie("k", "v", &ctx(), &CookieOptions::new()).unwrap();
        client.set_cookie("k", "v", &ctx(), &CookieOptions::new()).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(client.get_cookies(&ctx()).unwrap()["k"], "v");
    }

    #[test]
    fn delete_needs_matching_path() {
        let doc = Arc::new(DocumentCookies::new());
        let client = client_with(doc.clone());
        let scoped = CookieOptions::new().path("/app");
        client.set_cookie("token", "t", &ctx(), &scoped).unwrap();

        client.delete_cookie("token", &ctx(), &CookieOptions::new()).unwrap();
        assert!(client.has_cookie("token", &ctx()).unwrap());

        client.delete_cookie("token", &ctx(), &scoped).unwrap();
        assert!(!client.has_cookie("token", &ctx()).unwrap());
        assert_eq!(client.get_cookie("token", &ctx()).unwrap(), None);
    }

    #[test]
    fn empty_key_short_circuits() {
        let client = client_with(Arc::new(DocumentCookies::seeded("a=1")));
        assert!(!client.has_cookie("", &ctx()).unwrap());
    }

    #[test]
    fn server_objects_are_rejected() {
        let client = client_with(Arc::new(DocumentCookies::new()));
        let mut req = ClassicRequest::new().with_cookie_header("a=1");
        let ctx = CookieContext::new().with_req(&mut req);
        let err = client.get_cookies(&ctx).unwrap_err();
        assert!(matches!(err, CookieError::ServerSide));
        assert!(matches!(
            client.set_cookie("a", "1", &ctx, &CookieOptions::new()),
            Err(CookieError::ServerSide)
        ));
    }

    #[test]
    fn server_render_reads_empty_and_skips_writes() {
        let doc = Arc::new(DocumentCookies::seeded("a=1"));
        let env = Environment::browser(doc.clone()).with_render_phase(RenderPhase::Server);
        let client = ClientCookies::new(env.clone(), CookieConfig::default());

        assert!(client.get_cookies(&ctx()).unwrap().is_empty());
        assert!(!client.has_cookie("a", &ctx()).unwrap());
        client.set_cookie("b", "2", &ctx(), &CookieOptions::new()).unwrap();
        assert_eq!(doc.cookie_string(), "a=1");

        let strict = CookieConfig::builder()
            .render_phase_policy(RenderPhasePolicy::Fail)
            .build()
            .unwrap();
        let client = ClientCookies::new(env, strict);
        assert!(matches!(client.get_cookies(&ctx()), Err(CookieError::RenderPhase)));
    }

    #[test]
    fn out_of_range_expiry_fails_before_writing() {
        let doc = Arc::new(DocumentCookies::new());
        let client = client_with(doc.clone());
        let options = CookieOptions::new().expires_in_days(5_000_000.0);

        let result = client.set_cookie("k", "v", &ctx(), &options);
        assert!(matches!(result, Err(CookieError::Expiry(_))));
        assert!(doc.is_empty());
    }

    #[test]
    fn enum_values_round_trip_as_json() {
        #[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq)]
        enum Theme {
            Dark,
        }

        let client = client_with(Arc::new(DocumentCookies::new()));
        client.set_cookie("t", &Theme::Dark, &ctx(), &CookieOptions::new()).unwrap();
        let value = client.get_cookie("t", &ctx()).unwrap().unwrap();
        assert_eq!(value.json::<Theme>().unwrap(), Theme::Dark);
    }

    #[test]
    fn unencodable_value_fails_before_writing() {
        let doc = Arc::new(DocumentCookies::new());
        let client = client_with(doc.clone());
        let mut bad = BTreeMap::new();
        bad.insert((1, 2), "x");
        let err = client.set_cookie("bad", &bad, &ctx(), &CookieOptions::new()).unwrap_err();
        assert!(matches!(err, CookieError::Value(_)));
        assert!(doc.is_empty());
    }
}
