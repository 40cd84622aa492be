/// Data structures shared across the LinkPilot core.
///
/// Everything here crosses the wasm boundary as camelCase JSON, matching
/// the shapes the extension UI and the host tabs/storage APIs use.
use serde::{Deserialize, Serialize};

/// A browser tab as returned by `tabs.query`.
///
/// The host omits `id` for some tab kinds; that maps to -1 here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    #[serde(default = "missing_tab_id")]
    pub id: i32,
    #[serde(default)]
    pub window_id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub highlighted: bool,
}

fn missing_tab_id() -> i32 {
    -1
}

/// One URL recovered from pasted import text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UrlEntry {
    /// Normalized absolute URL.
    pub url: String,
    /// Human title when one could be recovered, otherwise the URL itself.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

/// A URL stored inside a collection. Duplicates are allowed; uniqueness is
/// the caller's concern, not this layer's.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedUrl {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
}

/// How a collection came to exist.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSource {
    #[default]
    Manual,
    CurrentTabs,
    ImportText,
}

/// A named, ordered list of saved URLs.
///
/// Created through the collection store (which assigns `id` and both
/// timestamps), mutated only through update/reorder, destroyed by explicit
/// delete. The stored order of collections is the user-visible sort order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub urls: Vec<SavedUrl>,
    /// ISO-8601.
    pub created_at: String,
    /// ISO-8601, refreshed on every update or reorder.
    pub updated_at: String,
    #[serde(default)]
    pub source: CollectionSource,
}
