//! Old operation names, kept so existing callers keep compiling.

use serde::Serialize;

use crate::context::CookieContext;
use crate::cookies::CookieOptions;
use crate::errors::CookieError;
use crate::service::Cookies;

impl Cookies {
    #[deprecated(note = "use `Cookies::set_cookie`")]
    pub async fn set_cookies<T: Serialize + ?Sized>(
        &self,
        key: &str,
        data: &T,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        log::warn!("`set_cookies` is deprecated; use `set_cookie`");
        self.set_cookie(key, data, ctx, options).await
    }

    #[deprecated(note = "use `Cookies::delete_cookie`")]
    pub async fn remove_cookies(
        &self,
        key: &str,
        ctx: &mut CookieContext<'_>,
        options: &CookieOptions,
    ) -> Result<(), CookieError> {
        log::warn!("`remove_cookies` is deprecated; use `delete_cookie`");
        self.delete_cookie(key, ctx, options).await
    }

    #[deprecated(note = "use `Cookies::has_cookie`")]
    pub async fn check_cookies(&self, key: &str, ctx: &CookieContext<'_>) -> Result<bool, CookieError> {
        log::warn!("`check_cookies` is deprecated; use `has_cookie`");
        self.has_cookie(key, ctx).await
    }
}
