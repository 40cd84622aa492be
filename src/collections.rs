/// Collection persistence over the host's sync storage.
///
/// All collections live as one ordered array under the `collections` key;
/// the stored order is the user-visible sort order. The pure list logic is
/// split from the storage boundary so it can be tested natively.
///
/// Read-modify-write here is not transactional: two contexts racing on the
/// same key lose the earlier write (last `set` wins). Accepted for the
/// extension's single-user usage pattern.
use js_sys::{Object, Reflect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wasm_bindgen::JsValue;

use crate::api::BrowserContext;
use crate::error::{Error, describe_js};
use crate::tab_data::{Collection, CollectionSource, SavedUrl};

pub const COLLECTIONS_KEY: &str = "collections";

/// Input for creating a collection; the store assigns id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDraft {
    pub name: String,
    #[serde(default)]
    pub urls: Vec<SavedUrl>,
    #[serde(default)]
    pub source: CollectionSource,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<SavedUrl>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CollectionSource>,
}

/// The ordered collection array, with the mutations the store supports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionList {
    collections: Vec<Collection>,
}

impl CollectionList {
    pub fn new(collections: Vec<Collection>) -> Self {
        CollectionList { collections }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn into_collections(self) -> Vec<Collection> {
        self.collections
    }

    pub fn get(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Append a new collection; both timestamps start equal.
    pub fn insert(&mut self, draft: CollectionDraft, id: String, now: &str) -> Collection {
        let collection = Collection {
            id,
            name: draft.name,
            urls: draft.urls,
            created_at: now.to_string(),
            updated_at: now.to_string(),
            source: draft.source,
        };
        self.collections.push(collection.clone());
        collection
    }

    /// Merge a patch into the record with this id, refreshing only
    /// `updated_at`. Returns false when the id is absent.
    pub fn apply_patch(&mut self, id: &str, patch: CollectionPatch, now: &str) -> bool {
        let Some(existing) = self.collections.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            existing.name = name;
        }
        if let Some(urls) = patch.urls {
            existing.urls = urls;
        }
        if let Some(source) = patch.source {
            existing.source = source;
        }
        existing.updated_at = now.to_string();
        true
    }

    /// Remove by id; removing a missing id is a no-op.
    pub fn remove(&mut self, id: &str) {
        self.collections.retain(|c| c.id != id);
    }

    /// Replace the whole list with a new order, stamping every record's
    /// `updated_at`.
    pub fn replace_order(&mut self, ordered: Vec<Collection>, now: &str) {
        self.collections = ordered
            .into_iter()
            .map(|mut collection| {
                collection.updated_at = now.to_string();
                collection
            })
            .collect();
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

fn new_collection_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_iso() -> String {
    js_sys::Date::new_0()
        .to_iso_string()
        .as_string()
        .unwrap_or_default()
}

async fn load_list(ctx: &BrowserContext) -> Result<CollectionList, Error> {
    let storage = ctx.api().storage_sync()?;
    let stored = storage.get_key(COLLECTIONS_KEY).await?;
    if stored.is_undefined() || stored.is_null() {
        return Ok(CollectionList::default());
    }
    let collections: Vec<Collection> = serde_wasm_bindgen::from_value(stored)?;
    Ok(CollectionList::new(collections))
}

async fn store_list(ctx: &BrowserContext, list: &CollectionList) -> Result<(), Error> {
    let storage = ctx.api().storage_sync()?;
    let value = serde_wasm_bindgen::to_value(list.collections())?;
    let payload = Object::new();
    Reflect::set(&payload, &JsValue::from_str(COLLECTIONS_KEY), &value)
        .map_err(|err| Error::Storage(describe_js(&err)))?;
    storage.set(&payload.into()).await
}

/// All stored collections, in stored order. Storage errors degrade to an
/// empty list.
pub async fn get_all_collections(ctx: &BrowserContext) -> Vec<Collection> {
    match load_list(ctx).await {
        Ok(list) => list.into_collections(),
        Err(err) => {
            log::error!("failed to load collections: {err}");
            Vec::new()
        }
    }
}

pub async fn get_collection_by_id(ctx: &BrowserContext, id: &str) -> Option<Collection> {
    get_all_collections(ctx).await.into_iter().find(|c| c.id == id)
}

/// Append a new collection and persist. Returns the stored record, or
/// `None` on storage failure.
pub async fn save_collection(ctx: &BrowserContext, draft: CollectionDraft) -> Option<Collection> {
    let mut list = CollectionList::new(get_all_collections(ctx).await);
    let saved = list.insert(draft, new_collection_id(), &now_iso());

    match store_list(ctx, &list).await {
        Ok(()) => {
            log::info!("collection saved: {}", saved.name);
            Some(saved)
        }
        Err(err) => {
            log::error!("failed to save collection: {err}");
            None
        }
    }
}

pub async fn update_collection(ctx: &BrowserContext, id: &str, patch: CollectionPatch) -> bool {
    let mut list = CollectionList::new(get_all_collections(ctx).await);
    if !list.apply_patch(id, patch, &now_iso()) {
        log::error!("collection not found: {id}");
        return false;
    }

    match store_list(ctx, &list).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to update collection: {err}");
            false
        }
    }
}

/// Deleting a non-existent id is a successful no-op.
pub async fn delete_collection(ctx: &BrowserContext, id: &str) -> bool {
    let mut list = CollectionList::new(get_all_collections(ctx).await);
    list.remove(id);

    match store_list(ctx, &list).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to delete collection: {err}");
            false
        }
    }
}

/// Persist a new ordering after a drag-and-drop. Touches every record's
/// `updated_at`, so callers should only invoke this for a user-visible
/// reorder.
pub async fn reorder_collections(ctx: &BrowserContext, ordered: Vec<Collection>) -> bool {
    let mut list = CollectionList::default();
    list.replace_order(ordered, &now_iso());

    match store_list(ctx, &list).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to reorder collections: {err}");
            false
        }
    }
}

/// Snapshot every open tab into a new collection. Unlike the display
/// pipeline, this keeps internal pages: the snapshot is a restore point,
/// not a share list.
pub async fn create_collection_from_current_tabs(
    ctx: &BrowserContext,
    name: &str,
) -> Option<Collection> {
    let tabs = match ctx.api().tabs() {
        Ok(tabs) => tabs,
        Err(err) => {
            log::error!("failed to snapshot tabs: {err}");
            return None;
        }
    };
    let raw = match tabs.query_all().await {
        Ok(raw) => raw,
        Err(err) => {
            log::error!("failed to snapshot tabs: {err}");
            return None;
        }
    };

    let urls = raw
        .into_iter()
        .map(|tab| SavedUrl {
            url: tab.url,
            title: tab.title,
            fav_icon_url: tab.fav_icon_url,
        })
        .collect();

    save_collection(
        ctx,
        CollectionDraft {
            name: name.to_string(),
            urls,
            source: CollectionSource::CurrentTabs,
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: &str = "2024-01-01T00:00:00.000Z";
    const T1: &str = "2024-01-02T00:00:00.000Z";

    fn draft(name: &str) -> CollectionDraft {
        CollectionDraft {
            name: name.to_string(),
            urls: vec![SavedUrl {
                url: "https://example.com/".to_string(),
                title: "Example".to_string(),
                fav_icon_url: None,
            }],
            source: CollectionSource::Manual,
        }
    }

    #[test]
    fn test_insert_appends_with_equal_timestamps() {
        let mut list = CollectionList::default();
        let first = list.insert(draft("First"), "id-1".to_string(), T0);
        let second = list.insert(draft("Second"), "id-2".to_string(), T0);

        assert_eq!(list.len(), 2);
        assert_eq!(list.collections()[0].id, "id-1");
        assert_eq!(list.collections()[1].id, "id-2");
        assert_eq!(first.created_at, first.updated_at);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_patch_updates_name_and_timestamp_only() {
        let mut list = CollectionList::default();
        list.insert(draft("Before"), "id-1".to_string(), T0);

        let patched = list.apply_patch(
            "id-1",
            CollectionPatch { name: Some("After".to_string()), ..Default::default() },
            T1,
        );

        assert!(patched);
        let collection = list.get("id-1").unwrap();
        assert_eq!(collection.name, "After");
        assert_eq!(collection.urls.len(), 1, "urls must be left untouched");
        assert_eq!(collection.created_at, T0);
        assert_eq!(collection.updated_at, T1);
        assert!(collection.updated_at > collection.created_at);
    }

    #[test]
    fn test_patch_replaces_urls_when_given() {
        let mut list = CollectionList::default();
        list.insert(draft("C"), "id-1".to_string(), T0);

        list.apply_patch(
            "id-1",
            CollectionPatch { urls: Some(Vec::new()), ..Default::default() },
            T1,
        );

        assert!(list.get("id-1").unwrap().urls.is_empty());
    }

    #[test]
    fn test_patch_missing_id_reports_not_found() {
        let mut list = CollectionList::default();
        list.insert(draft("C"), "id-1".to_string(), T0);

        let patched = list.apply_patch(
            "nope",
            CollectionPatch { name: Some("X".to_string()), ..Default::default() },
            T1,
        );

        assert!(!patched);
        assert_eq!(list.get("id-1").unwrap().name, "C");
    }

    #[test]
    fn test_remove_and_remove_missing() {
        let mut list = CollectionList::default();
        list.insert(draft("A"), "id-1".to_string(), T0);
        list.insert(draft("B"), "id-2".to_string(), T0);

        list.remove("id-1");
        assert_eq!(list.len(), 1);
        assert!(list.get("id-1").is_none());

        // No-op for an id that was never there.
        list.remove("ghost");
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_replace_order_stamps_every_record() {
        let mut list = CollectionList::default();
        list.insert(draft("A"), "id-1".to_string(), T0);
        list.insert(draft("B"), "id-2".to_string(), T0);

        let mut reversed = list.collections().to_vec();
        reversed.reverse();
        list.replace_order(reversed, T1);

        assert_eq!(list.collections()[0].id, "id-2");
        assert_eq!(list.collections()[1].id, "id-1");
        assert!(list.collections().iter().all(|c| c.updated_at == T1));
        assert!(list.collections().iter().all(|c| c.created_at == T0));
    }

    #[test]
    fn test_duplicate_urls_within_a_collection_are_allowed() {
        let mut list = CollectionList::default();
        let mut d = draft("Dupes");
        d.urls.push(d.urls[0].clone());
        let saved = list.insert(d, "id-1".to_string(), T0);
        assert_eq!(saved.urls.len(), 2);
    }
}
