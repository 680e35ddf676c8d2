//! Header merging and normalization

use std::collections::{BTreeMap, HashMap};

use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::body::RequestData;
use crate::error::{Error, Result};
use crate::state::ClientState;

/// Caller-supplied headers in any of the accepted shapes
///
/// Every shape converts with `From`, so callers can pass an
/// [`http::HeaderMap`], a `HashMap`/`BTreeMap` of strings, a list of pairs or
/// a JSON object without caring which one is canonical.
#[derive(Debug, Clone, PartialEq)]
pub enum Headers {
    /// Header collection; repeated names are kept
    Map(HeaderMap),
    /// Name/value pairs from a map or list
    Pairs(Vec<(String, String)>),
    /// Plain JSON object; non-string values use their JSON text
    Object(serde_json::Map<String, Value>),
}

impl Default for Headers {
    fn default() -> Self {
        Headers::Pairs(Vec::new())
    }
}

impl Headers {
    /// Build from an arbitrary JSON value
    ///
    /// `null` means no headers; anything other than an object is rejected.
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Headers::default()),
            Value::Object(map) => Ok(Headers::Object(map)),
            other => Err(Error::InvalidHeader(format!(
                "expected a JSON object of headers, got {}",
                other
            ))),
        }
    }

    /// Append every entry to `target`
    fn append_to(self, target: &mut HeaderMap) -> Result<()> {
        match self {
            Headers::Map(map) => {
                for (name, value) in map.iter() {
                    target.append(name.clone(), value.clone());
                }
            }
            Headers::Pairs(pairs) => {
                for (name, value) in pairs {
                    target.append(header_name(&name)?, HeaderValue::from_str(&value)?);
                }
            }
            Headers::Object(map) => {
                for (name, value) in map {
                    let value = match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    target.append(header_name(&name)?, HeaderValue::from_str(&value)?);
                }
            }
        }
        Ok(())
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(Error::from)
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Self {
        Headers::Map(map)
    }
}

impl<K: Into<String>, V: Into<String>> From<HashMap<K, V>> for Headers {
    fn from(map: HashMap<K, V>) -> Self {
        Headers::Pairs(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<BTreeMap<K, V>> for Headers {
    fn from(map: BTreeMap<K, V>) -> Self {
        Headers::Pairs(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for Headers {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Headers::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        Headers::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Value>> for Headers {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Headers::Object(map)
    }
}

/// Build the canonical header set for one request
///
/// User headers are appended first, then default headers overwrite them, then
/// the active credential (or its absence) decides `Authorization`. JSON data
/// other than null gets `Content-Type: application/json` unless the caller
/// chose a type.
/// `Content-Length` is always dropped, the transport computes it.
pub fn normalize(
    user_headers: Headers,
    data: Option<&RequestData>,
    state: &ClientState,
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    user_headers.append_to(&mut headers)?;

    for (name, value) in state.default_headers() {
        headers.insert(header_name(name)?, HeaderValue::from_str(value)?);
    }

    match state.authorization() {
        Some(credential) => {
            let mut value = HeaderValue::from_str(credential)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            headers.remove(AUTHORIZATION);
        }
    }

    let is_json = data.is_some_and(|data| !data.is_passthrough() && !data.is_null());
    if is_json && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    headers.remove(CONTENT_LENGTH);

    Ok(headers)
}
