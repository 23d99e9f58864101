//! Admin API response envelopes.
//!
//! v3 wraps single objects as `{"key": .., "value": ..}` and collections as
//! `{"total": .., "list": [..]}`. v2 nests the same items under `node`:
//! `{"node": {"key": .., "value": ..}}` and `{"node": {"nodes": [..]}}`.
//!
//! The gateway encodes empty arrays as `{}`, so an empty collection may
//! arrive as an object in either generation.

use crate::error::{Error, Result};
use gwadmin_core::{AdminApiVersion, Resource};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Marker the gateway puts in error bodies of switched-off features.
const FUNCTION_DISABLED_MARKER: &str = "is disabled";

/// A single stored object: its etcd-style key and JSON value.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Item {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

impl Item {
    /// Decode the value into a typed resource.
    pub fn decode<T: Resource>(self) -> Result<T> {
        T::from_item(&self.key, self.value)
            .map_err(|e| Error::Decode(format!("{} {}: {e}", T::KIND, self.key)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Items {
    List(Vec<Item>),
    Empty(Map<String, Value>),
}

impl Default for Items {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Items {
    fn into_vec(self) -> Result<Vec<Item>> {
        match self {
            Self::List(items) => Ok(items),
            Self::Empty(map) if map.is_empty() => Ok(Vec::new()),
            Self::Empty(_) => Err(Error::Decode(
                "unexpected non-empty object in place of a list".to_string(),
            )),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Total {
    Number(u64),
    Text(String),
}

impl Total {
    fn value(&self) -> Result<u64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .parse()
                .map_err(|_| Error::Decode(format!("invalid list total: {s:?}"))),
        }
    }
}

#[derive(Deserialize)]
struct ListV3 {
    #[serde(default)]
    total: Option<Total>,
    #[serde(default)]
    list: Items,
}

#[derive(Deserialize)]
struct NodeV2 {
    node: Item,
}

#[derive(Deserialize)]
struct DirV2 {
    #[serde(default)]
    nodes: Items,
}

#[derive(Deserialize)]
struct ListV2 {
    node: DirV2,
}

/// Whether a response body reports a disabled gateway feature.
pub fn is_function_disabled(body: &str) -> bool {
    body.contains(FUNCTION_DISABLED_MARKER)
}

/// Decode a get/create/update response.
pub fn decode_item(version: AdminApiVersion, body: &str) -> Result<Item> {
    match version {
        AdminApiVersion::V3 => parse(body),
        AdminApiVersion::V2 => parse::<NodeV2>(body).map(|resp| resp.node),
    }
}

/// Decode a list response into its items.
pub fn decode_list(version: AdminApiVersion, body: &str) -> Result<Vec<Item>> {
    match version {
        AdminApiVersion::V3 => {
            let resp: ListV3 = parse(body)?;
            let items = resp.list.into_vec()?;
            if let Some(total) = resp.total {
                let total = total.value()?;
                if total != items.len() as u64 {
                    tracing::debug!(total, received = items.len(), "list total differs from items");
                }
            }
            Ok(items)
        }
        AdminApiVersion::V2 => parse::<ListV2>(body)?.node.nodes.into_vec(),
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::Decode(format!("{e}: {body}")))
}
