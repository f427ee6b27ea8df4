//! Inbound search request and the client configuration derived from it

use crate::error::ProxyError;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Body of `POST /elastic`.
///
/// Every field is optional; missing or `null` fields take their zero value
/// and unknown fields are ignored. Keys match case-insensitively, an exact
/// lowercase key wins over other spellings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    /// Comma-separated cluster endpoint URLs
    #[serde(deserialize_with = "null_as_default")]
    pub addresses: String,
    /// Search body, forwarded as-is
    pub elasticquery: serde_json::Value,
    /// Comma-separated index names
    #[serde(deserialize_with = "null_as_default")]
    pub index: String,
    /// Comma-separated sort specifications, e.g. `timestamp:desc`
    #[serde(deserialize_with = "null_as_default")]
    pub sort: String,
    #[serde(deserialize_with = "null_as_default")]
    pub size: i64,
}

const FIELDS: [&str; 7] = [
    "username",
    "password",
    "addresses",
    "elasticquery",
    "index",
    "sort",
    "size",
];

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl SearchRequest {
    /// Decode a raw request body. The content type is not checked and a
    /// bare `null` body decodes to the zero request.
    pub fn from_slice(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body).map_err(ProxyError::InvalidBody)?;
        let value = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(fields) => Value::Object(fold_field_names(fields)),
            other => other,
        };
        serde_json::from_value(value).map_err(ProxyError::InvalidBody)
    }

    pub fn indices(&self) -> Vec<String> {
        non_empty_list(&self.index)
    }

    pub fn sort_fields(&self) -> Vec<String> {
        non_empty_list(&self.sort)
    }
}

/// Rename keys like `Index` or `SIZE` to the field they match.
fn fold_field_names(fields: Map<String, Value>) -> Map<String, Value> {
    let mut folded = Map::new();
    let mut exact = Vec::new();
    for (key, value) in fields {
        let Some(name) = FIELDS.iter().find(|f| f.eq_ignore_ascii_case(&key)) else {
            continue;
        };
        if key == *name {
            exact.push((key, value));
        } else {
            folded.insert(name.to_string(), value);
        }
    }
    folded.extend(exact);
    folded
}

/// Split on `,` with no trimming and no filtering of empty elements.
///
/// `""` yields `[""]` and `"a,,b"` yields `["a", "", "b"]`.
pub fn split_list(input: &str) -> Vec<String> {
    input.split(',').map(str::to_string).collect()
}

fn non_empty_list(input: &str) -> Vec<String> {
    if input.is_empty() {
        Vec::new()
    } else {
        split_list(input)
    }
}

/// How the per-request search client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientConfig {
    /// Discover the cluster from the environment.
    Default,
    Explicit {
        addresses: Vec<String>,
        username: String,
        password: String,
    },
}

impl ClientConfig {
    pub fn from_request(request: &SearchRequest) -> Self {
        if request.username.is_empty()
            && request.password.is_empty()
            && request.addresses.is_empty()
        {
            return Self::Default;
        }

        Self::Explicit {
            addresses: split_list(&request.addresses),
            username: request.username.clone(),
            password: request.password.clone(),
        }
    }
}
