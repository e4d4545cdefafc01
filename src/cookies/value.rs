//! Value coercion.
//!
//! Writes accept any `Serialize` data and turn it into the string that is
//! actually stored. Reads hand that string back, percent-decoded, either
//! verbatim or (under [`ValuePolicy::Legacy`]) with the old sentinel coercion.

use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use serde::ser::{self, Impossible};
use serde::{Serialize, Serializer};

use crate::config::ValuePolicy;
use crate::errors::CookieError;

/// A cookie value as returned by single-key reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    Text(String),
    Bool(bool),
    Null,
}

impl CookieValue {
    /// The stored string, if this value was not coerced.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The stored string form, re-rendering coerced sentinels.
    pub fn into_string(self) -> String {
        match self {
            CookieValue::Text(s) => s,
            CookieValue::Bool(b) => b.to_string(),
            CookieValue::Null => "null".to_string(),
        }
    }

    /// Parses the value as JSON, for cookies written from structured data.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            CookieValue::Text(s) => serde_json::from_str(s),
            CookieValue::Bool(b) => serde_json::from_value(serde_json::Value::Bool(*b)),
            CookieValue::Null => serde_json::from_value(serde_json::Value::Null),
        }
    }
}

impl From<String> for CookieValue {
    fn from(s: String) -> Self {
        CookieValue::Text(s)
    }
}

impl PartialEq<&str> for CookieValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Turns arbitrary data into the string that gets stored.
///
/// Strings are used as-is, everything else is JSON encoded, including enum
/// variants and chars that JSON renders as strings. Encoding failures (e.g.
/// maps with non-string keys) are reported as [`CookieError::Value`].
pub fn stringify<T: Serialize + ?Sized>(data: &T) -> Result<String, CookieError> {
    if let Ok(s) = data.serialize(PlainStr) {
        return Ok(s);
    }
    serde_json::to_string(data).map_err(|e| {
        log::warn!("cookie value could not be JSON encoded: {e}");
        CookieError::Value(e.to_string())
    })
}

/// Accepts exactly one top-level `str` and rejects everything else.
struct PlainStr;

#[derive(Debug)]
struct NotPlainStr;

impl std::fmt::Display for NotPlainStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("not a plain string")
    }
}

impl std::error::Error for NotPlainStr {}

impl ser::Error for NotPlainStr {
    fn custom<T: std::fmt::Display>(_: T) -> Self {
        NotPlainStr
    }
}

macro_rules! reject {
    ($($name:ident($($arg:ty),*) -> $ret:ty;)*) => {
        $(fn $name(self, $(_: $arg),*) -> Result<$ret, NotPlainStr> {
            Err(NotPlainStr)
        })*
    };
}

impl Serializer for PlainStr {
    type Ok = String;
    type Error = NotPlainStr;
    type SerializeSeq = Impossible<String, NotPlainStr>;
    type SerializeTuple = Impossible<String, NotPlainStr>;
    type SerializeTupleStruct = Impossible<String, NotPlainStr>;
    type SerializeTupleVariant = Impossible<String, NotPlainStr>;
    type SerializeMap = Impossible<String, NotPlainStr>;
    type SerializeStruct = Impossible<String, NotPlainStr>;
    type SerializeStructVariant = Impossible<String, NotPlainStr>;

    fn serialize_str(self, v: &str) -> Result<String, NotPlainStr> {
        Ok(v.to_owned())
    }

    reject! {
        serialize_bool(bool) -> String;
        serialize_i8(i8) -> String;
        serialize_i16(i16) -> String;
        serialize_i32(i32) -> String;
        serialize_i64(i64) -> String;
        serialize_u8(u8) -> String;
        serialize_u16(u16) -> String;
        serialize_u32(u32) -> String;
        serialize_u64(u64) -> String;
        serialize_f32(f32) -> String;
        serialize_f64(f64) -> String;
        serialize_char(char) -> String;
        serialize_bytes(&[u8]) -> String;
        serialize_none() -> String;
        serialize_unit() -> String;
        serialize_unit_struct(&'static str) -> String;
        serialize_unit_variant(&'static str, u32, &'static str) -> String;
        serialize_seq(Option<usize>) -> Self::SerializeSeq;
        serialize_tuple(usize) -> Self::SerializeTuple;
        serialize_tuple_struct(&'static str, usize) -> Self::SerializeTupleStruct;
        serialize_tuple_variant(&'static str, u32, &'static str, usize) -> Self::SerializeTupleVariant;
        serialize_map(Option<usize>) -> Self::SerializeMap;
        serialize_struct(&'static str, usize) -> Self::SerializeStruct;
        serialize_struct_variant(&'static str, u32, &'static str, usize) -> Self::SerializeStructVariant;
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> Result<String, NotPlainStr> {
        Err(NotPlainStr)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, _: &T) -> Result<String, NotPlainStr> {
        Err(NotPlainStr)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<String, NotPlainStr> {
        Err(NotPlainStr)
    }
}

/// Percent-decodes every run of `%XX` escapes (uppercase hex) in `s`.
///
/// Runs that do not decode to valid UTF-8 are kept verbatim.
pub fn decode(s: &str) -> String {
    if s.is_empty() || !s.contains('%') {
        return s.to_string();
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;

    while i < bytes.len() {
        let run_start = i;
        while is_escape(bytes, i) {
            i += 3;
        }
        if i > run_start {
            let run = &s[run_start..i];
            match percent_decode_str(run).decode_utf8() {
                Ok(decoded) => out.push_str(&decoded),
                Err(_) => out.push_str(run),
            }
            continue;
        }

        let ch = s[i..].chars().next().unwrap_or_default();
        out.push(ch);
        i += ch.len_utf8().max(1);
    }

    out
}

fn is_escape(bytes: &[u8], at: usize) -> bool {
    let upper_hex = |b: u8| b.is_ascii_digit() || b.is_ascii_uppercase();
    bytes.get(at) == Some(&b'%')
        && bytes.get(at + 1).copied().is_some_and(upper_hex)
        && bytes.get(at + 2).copied().is_some_and(upper_hex)
}

/// Applies `policy` to a decoded stored string.
///
/// `None` means the value reads as absent (`"undefined"` under the legacy policy).
pub fn coerce(value: String, policy: ValuePolicy) -> Option<CookieValue> {
    match policy {
        ValuePolicy::Verbatim => Some(CookieValue::Text(value)),
        ValuePolicy::Legacy => match value.as_str() {
            "true" => Some(CookieValue::Bool(true)),
            "false" => Some(CookieValue::Bool(false)),
            "null" => Some(CookieValue::Null),
            "undefined" => None,
            _ => Some(CookieValue::Text(value)),
        },
    }
}
