//! Response normalization at the API boundary.
//!
//! The Holidaze API is inconsistent about envelopes: the same resource may
//! come back as a bare array, as `{ "data": [...] }`, as a single object or as
//! `{ "data": { ... } }`. Each body is classified once into an [`Envelope`]
//! and then collapsed into the one shape downstream code consumes.
//!
//! Precedence, checked in order:
//! 1. the body already has the expected shape (`Bare`);
//! 2. the body has a `data` field with the expected shape (`Wrapped`);
//! 3. anything else is `Unrecognized`, which becomes an empty list or `None`,
//!    never a partially shaped value.
//!
//! Lists are judged by their container: a bare array or a `data` array is
//! recognized even when some elements do not have the expected shape. Those
//! elements are skipped one by one and the rest of the page is kept.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::types::{Page, PageMeta};

/// Where the payload was found in a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Bare(T),
    Wrapped(T),
    Unrecognized,
}

impl<T> Envelope<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Envelope::Bare(value) | Envelope::Wrapped(value) => Some(value),
            Envelope::Unrecognized => None,
        }
    }
}

/// Classify `body` as an envelope around a `T`.
///
/// Malformed JSON is `Unrecognized` as well; the caller already knows the
/// status was successful, so the body is simply unusable.
pub fn classify<T: DeserializeOwned>(body: &str) -> Envelope<T> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Envelope::Unrecognized;
    };
    classify_value(value)
}

fn classify_value<T: DeserializeOwned>(value: Value) -> Envelope<T> {
    if let Ok(bare) = T::deserialize(&value) {
        return Envelope::Bare(bare);
    }
    if let Value::Object(mut fields) = value {
        if let Some(data) = fields.remove("data") {
            if let Ok(wrapped) = T::deserialize(data) {
                return Envelope::Wrapped(wrapped);
            }
        }
    }
    Envelope::Unrecognized
}

fn classify_items<T: DeserializeOwned>(value: Value) -> Envelope<Vec<T>> {
    match value {
        Value::Array(elements) => Envelope::Bare(collect_items(elements)),
        Value::Object(mut fields) => match fields.remove("data") {
            Some(Value::Array(elements)) => Envelope::Wrapped(collect_items(elements)),
            _ => Envelope::Unrecognized,
        },
        _ => Envelope::Unrecognized,
    }
}

fn collect_items<T: DeserializeOwned>(elements: Vec<Value>) -> Vec<T> {
    elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match T::deserialize(element) {
            Ok(item) => Some(item),
            Err(error) => {
                warn!(index, %error, "skipping malformed list item");
                None
            }
        })
        .collect()
}

/// Normalize a list endpoint body. Never fails; unknown shapes yield `[]`.
pub fn list<T: DeserializeOwned>(body: &str) -> Vec<T> {
    let value = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    match classify_items::<T>(value) {
        Envelope::Bare(items) | Envelope::Wrapped(items) => items,
        Envelope::Unrecognized => {
            warn!(body_len = body.len(), "unexpected list response structure");
            Vec::new()
        }
    }
}

/// Normalize a single-item endpoint body.
pub fn single<T: DeserializeOwned>(body: &str) -> Option<T> {
    let item = classify::<T>(body).into_option();
    if item.is_none() {
        warn!(body_len = body.len(), "unexpected item response structure");
    }
    item
}

/// Server pagination metadata. Both the `totalPages`/`totalItems` and the
/// upstream `pageCount`/`totalCount` spellings are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerMeta {
    #[serde(default)]
    current_page: Option<u32>,
    #[serde(default, alias = "pageCount")]
    total_pages: Option<u32>,
    #[serde(default, alias = "totalCount")]
    total_items: Option<u32>,
}

/// Normalize a paginated list body into a [`Page`].
///
/// A bare array is a single page holding everything. A wrapped list takes its
/// counters from `meta`, defaulting to page 1 of 1 with the item count.
pub fn page<T: DeserializeOwned>(body: &str) -> Page<T> {
    let value = serde_json::from_str::<Value>(body).unwrap_or(Value::Null);
    let server_meta = value
        .get("meta")
        .and_then(|meta| ServerMeta::deserialize(meta).ok())
        .unwrap_or_default();

    match classify_items::<T>(value) {
        Envelope::Bare(items) => {
            let total = count(&items);
            Page {
                items,
                meta: PageMeta {
                    current_page: 1,
                    total_pages: 1,
                    total_items: total,
                },
            }
        }
        Envelope::Wrapped(items) => {
            let total = count(&items);
            Page {
                meta: PageMeta {
                    current_page: server_meta.current_page.unwrap_or(1).max(1),
                    total_pages: server_meta.total_pages.unwrap_or(1).max(1),
                    total_items: server_meta.total_items.unwrap_or(total),
                },
                items,
            }
        }
        Envelope::Unrecognized => {
            warn!(body_len = body.len(), "unexpected page response structure");
            Page {
                items: Vec::new(),
                meta: PageMeta {
                    current_page: 1,
                    total_pages: 1,
                    total_items: 0,
                },
            }
        }
    }
}

fn count<T>(items: &[T]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}
