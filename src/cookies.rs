//! Cookies: the canonical [`CookieMap`], value coercion, the codec adapter,
//! write options and the two storage capabilities ([`CookieStore`] and
//! [`AmbientCookies`]).

pub mod ambient;
pub mod codec;
mod options;
pub mod store;
pub mod value;

use std::collections::HashMap;

/// Canonical cookie mapping every read converges to.
///
/// Built fresh on each read; keys are unique and the last write for a key wins.
pub type CookieMap = HashMap<String, String>;

pub use ambient::{AmbientCookies, AmbientHandle, DocumentCookies};
pub use options::{CookieOptions, Expires, SameSite};
pub use store::{CookieEntry, CookiePayload, CookieStore, CookieStoreHandle, MemoryCookieStore};
pub use value::CookieValue;
