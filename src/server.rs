//! Server-tier entry point.
//!
//! Every operation first checks that it is not running on the client tier,
//! then reads or writes whichever backend the context selects.

use serde::Serialize;

use crate::access::{read, write};
use crate::config::CookieConfig;
use crate::context::CookieContext;
use crate::cookies::value::{self, CookieValue};
use crate::cookies::{CookieMap, CookieOptions};
use crate::env::{ensure_server_side, Environment};
use crate::errors::CookieError;

#[derive(Debug, Clone)]
pub struct ServerCookies {
    env: Environment,
    config: CookieConfig,
}

impl Default for ServerCookies {
    fn default() -> Self {
        Self::new(Environment::server(), CookieConfig::default())
    }
}

impl ServerCookies {
    pub fn new(env: Environment, config: CookieConfig) -> Self {
        Self { env, config }
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub async fn get_cookies(&self, ctx: &CookieContext<'_>) -> Result<CookieMap, CookieError> {
        ensure_server_side(&self.env)?;
        read::read_all(&self.env, ctx).await
    }

    /// `Ok(None)` when the cookie is absent; an empty value is `Some("")`.
    pub async fn get_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<Option<CookieValue>, CookieError> {
        let cookies = self.get_cookies(ctx).await?;
        Ok(read::lookup(&cookies, key, self.config.value_policy))
    }

    /// Stores `data` under `key`. Strings are stored as-is, anything else as JSON.
    pub async fn set_cookie<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        ensure_server_side(&self.env)?;
        let value = value::stringify(data)?;
        write::write(&self.env, &self.config, ctx, key, value, options).await
    }

    /// Expires `key` immediately. Pass the same `path`/`domain` the cookie was set with.
    pub async fn delete_cookie(
        &self,
        key: &str,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        self.set_cookie(key, "", ctx, &options.for_deletion()).await
    }

    pub async fn has_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<bool, CookieError> {
        if key.is_empty() {
            return Ok(false);
        }
        Ok(self.get_cookies(ctx).await?.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValuePolicy;
    use crate::context::{accessor, ClassicRequest, StoreCarrier};
    use crate::cookies::{CookieStore, CookieStoreHandle, DocumentCookies, MemoryCookieStore};
    use http::header::SET_COOKIE;
    use http::HeaderMap;
    use serde_json::json;
    use std::sync::Arc;

    fn server() -> ServerCookies {
        ServerCookies::default()
    }

    fn set_cookie_values(res: &HeaderMap) -> Vec<String> {
        res.get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn reads_request_header() {
        let mut req = ClassicRequest::new().with_cookie_header("x=y");
        let ctx = CookieContext::new().with_req(&mut req);
        let cookies = server().get_cookies(&ctx).await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["x"], "y");
    }

    #[tokio::test]
    async fn no_context_on_server_is_empty() {
        let cookies = server().get_cookies(&CookieContext::ambient()).await.unwrap();
        assert!(cookies.is_empty());
        assert_eq!(server().get_cookie("x", &CookieContext::ambient()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn written_value_reads_back() {
        let cookies = server();
        let mut req = ClassicRequest::new().with_cookie_header("other=1");
        let mut res = HeaderMap::new();
        let mut ctx = CookieContext::new().with_req(&mut req).with_res(&mut res);

        cookies.set_cookie("greeting", "hello world", &mut ctx, &CookieOptions::new()).await.unwrap();
        let value = cookies.get_cookie("greeting", &ctx).await.unwrap();
        assert_eq!(value, Some(CookieValue::Text("hello world".into())));
        assert!(cookies.has_cookie("greeting", &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn json_data_is_serialized() {
        let store = Arc::new(MemoryCookieStore::new());
        let handle: CookieStoreHandle = store.clone();
        let mut req = StoreCarrier::new(handle);
        let mut ctx = CookieContext::new().with_req(&mut req);

        server().set_cookie("obj", &json!({"n": 1}), &mut ctx, &CookieOptions::new()).await.unwrap();
        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, r#"{"n":1}"#);

        let read = server().get_cookie("obj", &ctx).await.unwrap().unwrap();
        assert_eq!(read.json::<serde_json::Value>().unwrap(), json!({"n": 1}));
    }

    #[tokio::test]
    async fn setting_twice_keeps_one_cookie() {
        let store: CookieStoreHandle = Arc::new(MemoryCookieStore::new());
        let mut req = StoreCarrier::new(store.clone());
        let mut ctx = CookieContext::new().with_req(&mut req);

        for _ in 0..2 {
            server().set_cookie("k", "v", &mut ctx, &CookieOptions::new()).await.unwrap();
        }
        let cookies = server().get_cookies(&ctx).await.unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["k"], "v");
    }

    #[tokio::test]
    async fn delete_sends_removal_with_callers_path() {
        let store = Arc::new(MemoryCookieStore::with_entries([("session", "abc")]));
        let handle: CookieStoreHandle = store.clone();
        let mut res = StoreCarrier::new(handle);
        let mut ctx = CookieContext::new().with_res(&mut res);

        let options = CookieOptions::new().path("/app");
        server().delete_cookie("session", &mut ctx, &options).await.unwrap();

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].is_removal());
        assert_eq!(writes[0].value, "");
        assert_eq!(writes[0].options.path.as_deref(), Some("/app"));
        assert!(!store.has("session"));
        assert!(!server().has_cookie("session", &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn classic_delete_emits_expiring_header() {
        let mut req = ClassicRequest::new().with_cookie_header("a=1; b=2");
        let mut res = HeaderMap::new();
        {
            let mut ctx = CookieContext::new().with_req(&mut req).with_res(&mut res);
            server().delete_cookie("a", &mut ctx, &CookieOptions::new()).await.unwrap();
            assert!(!server().has_cookie("a", &ctx).await.unwrap());
            assert!(server().has_cookie("b", &ctx).await.unwrap());
        }
        let values = set_cookie_values(&res);
        assert_eq!(values.len(), 1);
        assert!(values[0].starts_with("a=;"), "{}", values[0]);
        assert!(values[0].contains("Max-Age=-1"), "{}", values[0]);
        assert!(values[0].contains("Path=/"), "{}", values[0]);
    }

    #[tokio::test]
    async fn empty_key_is_never_present() {
        let mut req = ClassicRequest::new().with_cookie_header("=odd; a=1");
        let ctx = CookieContext::new().with_req(&mut req);
        assert!(!server().has_cookie("", &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn empty_value_is_not_absent() {
        let store: CookieStoreHandle = Arc::new(MemoryCookieStore::with_entries([("blank", "")]));
        let accessor = accessor::ready(store);
        let ctx = CookieContext::new().with_cookies(&accessor);
        assert_eq!(
            server().get_cookie("blank", &ctx).await.unwrap(),
            Some(CookieValue::Text(String::new()))
        );
        assert_eq!(server().get_cookie("missing", &ctx).await.unwrap(), None);
    }

    #[tokio::test]
    async fn legacy_policy_coerces_sentinels() {
        let config = CookieConfig::builder().value_policy(ValuePolicy::Legacy).build().unwrap();
        let cookies = ServerCookies::new(Environment::server(), config);
        let mut req = ClassicRequest::new().with_cookie_header("on=true; gone=undefined; raw=x");
        let ctx = CookieContext::new().with_req(&mut req);

        assert_eq!(cookies.get_cookie("on", &ctx).await.unwrap(), Some(CookieValue::Bool(true)));
        assert_eq!(cookies.get_cookie("gone", &ctx).await.unwrap(), None);
        assert_eq!(cookies.get_cookie("raw", &ctx).await.unwrap(), Some(CookieValue::Text("x".into())));
    }

    #[tokio::test]
    async fn refuses_to_run_on_client_tier() {
        let env = Environment::browser(Arc::new(DocumentCookies::new()));
        let cookies = ServerCookies::new(env, CookieConfig::default());
        let err = cookies.get_cookies(&CookieContext::ambient()).await.unwrap_err();
        assert!(matches!(err, CookieError::ClientSide));
        assert!(err.to_string().contains("ServerCookies"));
    }
}
