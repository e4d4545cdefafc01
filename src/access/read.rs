use crate::config::ValuePolicy;
use crate::context::{classify, ContextKind, CookieContext};
use crate::cookies::value::{self, CookieValue};
use crate::cookies::{CookieEntry, CookieMap, CookieStoreHandle};
use crate::env::Environment;
use crate::errors::CookieError;

/// Builds the canonical mapping from whichever backend `ctx` selects.
pub(crate) async fn read_all(env: &Environment, ctx: &CookieContext<'_>) -> Result<CookieMap, CookieError> {
    let kind = classify(ctx);
    log::debug!("reading cookies from {kind:?} context");

    match kind {
        ContextKind::Structured => structured_cookies(ctx).await,
        ContextKind::Classic => Ok(classic_cookies(ctx)),
        ContextKind::Ambient => Ok(ambient_cookies(env)),
    }
}

/// Reads the ambient sink, or nothing when no sink is installed.
pub(crate) fn ambient_cookies(env: &Environment) -> CookieMap {
    match env.ambient() {
        Some(sink) => parse_ambient(&sink.cookie_string()),
        None => CookieMap::new(),
    }
}

/// Splits a `document.cookie` style string.
///
/// The name is everything before the first `=`; the value is the rest, which
/// may itself contain `=`. Values are left encoded.
pub(crate) fn parse_ambient(cookie_string: &str) -> CookieMap {
    let mut cookies = CookieMap::new();
    if cookie_string.is_empty() {
        return cookies;
    }

    for segment in cookie_string.split("; ") {
        let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
        cookies.insert(name.to_string(), value.to_string());
    }
    cookies
}

/// Pre-parsed request map, else the parsed `Cookie` header, else nothing.
pub(crate) fn classic_cookies(ctx: &CookieContext<'_>) -> CookieMap {
    let Some(req) = ctx.req() else {
        return CookieMap::new();
    };
    if let Some(parsed) = req.parsed_cookies() {
        return parsed.clone();
    }
    req.cookie_header().and_then(|h| h.cookies()).unwrap_or_default()
}

/// Enumerates the first store present: request, then response, then accessor.
pub(crate) async fn structured_cookies(ctx: &CookieContext<'_>) -> Result<CookieMap, CookieError> {
    let store = match read_store(ctx) {
        Some(store) => Some(store),
        None => match ctx.accessor() {
            Some(accessor) => Some(accessor.cookies().await?),
            None => None,
        },
    };

    Ok(store.map(|s| fold_entries(s.get_all())).unwrap_or_default())
}

fn read_store(ctx: &CookieContext<'_>) -> Option<CookieStoreHandle> {
    ctx.req()
        .and_then(|r| r.cookie_store())
        .or_else(|| ctx.res().and_then(|r| r.cookie_store()))
}

/// Later records for a repeated name overwrite earlier ones.
pub(crate) fn fold_entries(entries: Vec<CookieEntry>) -> CookieMap {
    entries.into_iter().map(|e| (e.name, e.value)).collect()
}

/// Single-key lookup: percent-decoded, then shaped by `policy`.
pub(crate) fn lookup(cookies: &CookieMap, key: &str, policy: ValuePolicy) -> Option<CookieValue> {
    let raw = cookies.get(key)?;
    value::coerce(value::decode(raw), policy)
}
