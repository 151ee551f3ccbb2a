//! Wire shape of one catalog page
//!
//! A page payload must be a JSON object carrying a `products` array; the
//! `meta.total` counter is only meaningful on the discovery fetch.

use serde::Deserialize;
use serde_json::Value;

/// One page of the upstream catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage {
    /// Raw catalog items; normalized individually, malformed items are dropped
    pub products: Vec<Value>,

    /// Pagination metadata
    #[serde(default)]
    pub meta: PageMeta,
}

/// Pagination metadata reported by the source
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageMeta {
    /// Total number of catalog items across all pages
    #[serde(default)]
    pub total: u64,
}

impl CatalogPage {
    /// Validates and converts a raw JSON payload into a catalog page
    ///
    /// Fails when the payload is not an object or the `products` array is
    /// missing or mistyped. An empty `products` array is structurally valid.
    pub fn from_value(value: Value) -> Result<Self, String> {
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}
