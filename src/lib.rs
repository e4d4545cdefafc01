pub mod client;
pub mod compat;
pub mod config;
pub mod context;
pub mod cookies;
pub mod env;
pub mod errors;
pub mod reactive;
pub mod server;
pub mod service;
pub mod watch;

mod access;

pub use client::ClientCookies;
pub use config::{CookieConfig, HeaderRewrite, PollingOptions, RenderPhasePolicy, ValuePolicy};
pub use context::{
    classify, ClassicRequest, ContextKind, CookieAccessor, CookieContext, CookieHeader, CookieRequest,
    CookieResponse,
};
pub use cookies::{CookieMap, CookieOptions, CookieStore, CookieValue, Expires, SameSite};
pub use env::{Environment, RenderPhase};
pub use errors::CookieError;
pub use reactive::ReactiveCookies;
pub use server::ServerCookies;
pub use service::Cookies;
pub use watch::{CookieChange, CookiePoller};
