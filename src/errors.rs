use crate::config::CookieConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    #[error("You are trying to access cookies on the client side. Please, use the server-side entry point `ServerCookies` instead.")]
    ClientSide,

    #[error("You are trying to access cookies on the server side. Please, use the client-side entry point `ClientCookies` instead.")]
    ServerSide,

    #[error("Cookies are not reachable while the client is rendered on the server")]
    RenderPhase,

    #[error("Cookie value cannot be encoded: {0}")]
    Value(String),

    #[error("Cookie expiry out of range: {0}")]
    Expiry(String),

    #[error("Cookie store accessor failed: {0}")]
    Accessor(String),

    #[error("Cookie store unavailable: {0}")]
    Store(String),

    #[error("Invalid cookie configuration: {0}")]
    Config(#[from] CookieConfigError),
}
