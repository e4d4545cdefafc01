use http::HeaderValue;
use time::OffsetDateTime;

use crate::config::{CookieConfig, HeaderRewrite};
use crate::context::{classify, ContextKind, CookieContext, CookieRequest};
use crate::cookies::codec;
use crate::cookies::{CookieMap, CookieOptions, CookiePayload, CookieStoreHandle};
use crate::env::Environment;
use crate::errors::CookieError;

/// Applies one already-coerced write to the backend `ctx` selects.
///
/// An empty `value` is the deletion sentinel.
pub(crate) async fn write(
    env: &Environment,
    config: &CookieConfig,
    ctx: &mut CookieContext<'_>,
    key: &str,
    value: String,
    options: &CookieOptions,
) -> Result<(), CookieError> {
    let options = options.normalized(OffsetDateTime::now_utc())?;
    let kind = classify(ctx);
    log::debug!("writing cookie {key:?} to {kind:?} context");

    match kind {
        ContextKind::Structured => {
            let payload = CookiePayload::new(key, value).with_options(options);
            write_structured(ctx, payload).await
        }
        ContextKind::Classic => {
            write_classic(config, ctx, key, &value, &options);
            Ok(())
        }
        ContextKind::Ambient => write_ambient(env, config, key, &value, &options),
    }
}

/// Sends `payload` to every store present: request, response, accessor.
///
/// All stores are resolved before the first one is written, so a failing
/// accessor leaves every store untouched.
async fn write_structured(ctx: &CookieContext<'_>, payload: CookiePayload) -> Result<(), CookieError> {
    let mut targets: Vec<CookieStoreHandle> = Vec::with_capacity(3);
    if let Some(store) = ctx.req().and_then(|r| r.cookie_store()) {
        targets.push(store);
    }
    if let Some(store) = ctx.res().and_then(|r| r.cookie_store()) {
        targets.push(store);
    }
    if let Some(accessor) = ctx.accessor() {
        targets.push(accessor.cookies().await?);
    }

    for store in targets {
        store.set(payload.clone());
    }
    Ok(())
}

/// Appends a `Set-Cookie` value to the response and keeps the request's own
/// view of its cookies in step with the write.
fn write_classic(config: &CookieConfig, ctx: &mut CookieContext<'_>, key: &str, value: &str, options: &CookieOptions) {
    let (Some(req), Some(res)) = ctx.parts_mut() else {
        log::debug!("classic write of {key:?} needs both a request and a response; skipped");
        return;
    };

    let set_cookie = codec::serialize(key, value, &options.with_default_path(config.default_path.as_deref()));

    match (res.set_cookie_headers(), HeaderValue::from_str(&set_cookie)) {
        (Some(mut current), Ok(header)) => {
            current.push(header);
            res.replace_set_cookie_headers(current);
        }
        (None, _) => log::debug!("response exposes no Set-Cookie header access"),
        (_, Err(e)) => log::warn!("cannot emit Set-Cookie {set_cookie:?}: {e}"),
    }

    sync_request(config.header_rewrite, req, key, value);
}

/// Applies the write to the request's pre-parsed map and its header view.
///
/// The header view's parsed cookies are authoritative; the raw header only
/// contributes the order in which existing names are rebuilt.
fn sync_request(rewrite: HeaderRewrite, req: &mut dyn CookieRequest, key: &str, value: &str) {
    let deleting = value.is_empty();

    if let Some(parsed) = req.parsed_cookies_mut() {
        if deleting {
            parsed.remove(key);
        } else {
            parsed.insert(key.to_string(), value.to_string());
        }
    }

    let readable = req.cookie_header().is_some();
    let Some(header) = req.cookie_header_mut() else {
        if readable {
            log::warn!("request exposes a read-only Cookie header; later reads will not see {key:?}");
        }
        return;
    };
    let Some(current) = header.cookies() else {
        return;
    };

    let order = header.header_value().map(codec::parse_pairs).unwrap_or_default();
    let mut pairs = ordered(current, order);
    apply(&mut pairs, key, value, deleting);

    let rebuilt = match rewrite {
        HeaderRewrite::Legacy => Some(pairs.iter().map(|(k, v)| format!("{k}={v};")).collect::<String>()),
        HeaderRewrite::Encoded => Some(codec::render_header(&pairs)),
        HeaderRewrite::Off => None,
    };
    header.update_cookies(pairs.into_iter().collect(), rebuilt);
}

/// `cookies` as pairs: names in raw-header order first, the rest sorted.
fn ordered(mut cookies: CookieMap, raw_order: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = raw_order
        .into_iter()
        .filter_map(|(k, _)| cookies.remove_entry(&k))
        .collect();
    let mut rest: Vec<(String, String)> = cookies.into_iter().collect();
    rest.sort();
    pairs.extend(rest);
    pairs
}

fn apply(pairs: &mut Vec<(String, String)>, key: &str, value: &str, deleting: bool) {
    if deleting {
        pairs.retain(|(k, _)| k != key);
    } else if let Some(slot) = pairs.iter_mut().find(|(k, _)| k == key) {
        slot.1 = value.to_string();
    } else {
        pairs.push((key.to_string(), value.to_string()));
    }
}

/// Hands one serialized cookie to the ambient sink.
pub(crate) fn write_ambient(
    env: &Environment,
    config: &CookieConfig,
    key: &str,
    value: &str,
    options: &CookieOptions,
) -> Result<(), CookieError> {
    let options = options
        .normalized(OffsetDateTime::now_utc())?
        .with_default_path(config.default_path.as_deref());
    let Some(sink) = env.ambient() else {
        log::debug!("no ambient cookie sink; write of {key:?} skipped");
        return Ok(());
    };
    sink.set_cookie_string(&codec::serialize(key, value, &options));
    Ok(())
}
