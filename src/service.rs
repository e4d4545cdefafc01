//! Unified entry point.
//!
//! [`Cookies`] forwards each call to [`ClientCookies`] on the client tier and
//! to [`ServerCookies`] everywhere else, so shared code can use one handle.

use serde::Serialize;

use crate::client::ClientCookies;
use crate::config::CookieConfig;
use crate::context::CookieContext;
use crate::cookies::{CookieMap, CookieOptions, CookieValue};
use crate::env::Environment;
use crate::errors::CookieError;
use crate::server::ServerCookies;

#[derive(Debug, Clone)]
pub struct Cookies {
    client: ClientCookies,
    server: ServerCookies,
    client_side: bool,
}

impl Cookies {
    pub fn new(env: Environment) -> Self {
        Self::with_config(env, CookieConfig::default())
    }

    pub fn with_config(env: Environment, config: CookieConfig) -> Self {
        Self {
            client_side: env.is_client_side(),
            client: ClientCookies::new(env.clone(), config.clone()),
            server: ServerCookies::new(env, config),
        }
    }

    pub fn client(&self) -> &ClientCookies {
        &self.client
    }

    pub fn server(&self) -> &ServerCookies {
        &self.server
    }

    pub fn is_client_side(&self) -> bool {
        self.client_side
    }

    pub async fn get_cookies(&self, ctx: &CookieContext<'_>) -> Result<CookieMap, CookieError> {
        if self.client_side {
            self.client.get_cookies(ctx)
        } else {
            self.server.get_cookies(ctx).await
        }
    }

    pub async fn get_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<Option<CookieValue>, CookieError> {
        if self.client_side {
            self.client.get_cookie(key, ctx)
        } else {
            self.server.get_cookie(key, ctx).await
        }
    }

    pub async fn set_cookie<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        if self.client_side {
            self.client.set_cookie(key, data, ctx, options)
        } else {
            self.server.set_cookie(key, data, ctx, options).await
        }
    }

    pub async fn delete_cookie(
        &self,
        key: &str,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        if self.client_side {
            self.client.delete_cookie(key, ctx, options)
        } else {
            self.server.delete_cookie(key, ctx, options).await
        }
    }

    pub async fn has_cookie(&self, key: &str, ctx: &CookieContext<'_>) -> Result<bool, CookieError> {
        if self.client_side {
            self.client.has_cookie(key, ctx)
        } else {
            self.server.has_cookie(key, ctx).await
        }
    }
}
