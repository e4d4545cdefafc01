use gosub_cookies::context::{accessor, ClassicRequest, StoreCarrier};
use gosub_cookies::cookies::{CookieStoreHandle, DocumentCookies, MemoryCookieStore};
use gosub_cookies::{
    ClientCookies, CookieConfig, CookieContext, CookieError, CookieOptions, CookiePoller, Cookies, Environment,
    SameSite, ServerCookies,
};
use http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Serialize)]
struct Prefs {
    theme: &'static str,
    font_size: u8,
}

#[tokio::main]
async fn main() -> Result<(), CookieError> {
    env_logger::init();

    let config = CookieConfig::builder()
        .polling_enabled(true)
        .polling_interval(Duration::from_millis(250))
        .build()?;

    // Browser tier: everything goes through the document sink.
    let document = Arc::new(DocumentCookies::new());
    let client = ClientCookies::new(Environment::browser(document.clone()), config.clone());

    let mut poller = CookiePoller::new(client.clone());
    let mut changes = poller.subscribe();
    poller.start();

    let ctx = CookieContext::ambient();
    client.set_cookie("prefs", &Prefs { theme: "dark", font_size: 14 }, &ctx, &CookieOptions::new())?;
    println!("client cookies: {:?}", client.get_cookies(&ctx)?);

    if let Ok(Ok(change)) = tokio::time::timeout(Duration::from_secs(1), changes.recv()).await {
        println!("poller saw {} change to {:?}", change.key, change.new_value);
    }
    poller.stop();

    // Server tier, classic request/response.
    let server = ServerCookies::new(Environment::server(), config);
    let mut req = ClassicRequest::new().with_cookie_header("session=abc123; seen=1");
    let mut res = HeaderMap::new();
    {
        let mut ctx = CookieContext::new().with_req(&mut req).with_res(&mut res);
        let options = CookieOptions::new().http_only(true).same_site(SameSite::Lax).expires_in_days(7.0);
        server.set_cookie("visits", &2, &mut ctx, &options).await?;
        server.delete_cookie("seen", &mut ctx, &CookieOptions::new()).await?;
        println!("request now carries: {:?}", server.get_cookies(&ctx).await?);
    }
    for value in res.get_all(http::header::SET_COOKIE) {
        println!("Set-Cookie: {}", value.to_str().unwrap_or("<binary>"));
    }

    // Server tier, structured stores.
    let store: CookieStoreHandle = Arc::new(MemoryCookieStore::new());
    let mut carrier = StoreCarrier::new(store.clone());
    let lazy = accessor::ready(store);
    let unified = Cookies::new(Environment::server());
    let mut ctx = CookieContext::new().with_req(&mut carrier).with_cookies(&lazy);
    unified.set_cookie("cart", "3 items", &mut ctx, &CookieOptions::new()).await?;
    println!("cart = {:?}", unified.get_cookie("cart", &ctx).await?);

    Ok(())
}
