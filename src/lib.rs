/// LinkPilot - cross-browser URL collection core
/// Built with Rust + WASM
///
/// The popup/options/side-panel UI stays in JS; this crate owns browser
/// detection, host API access, tab-list cleanup, link formatting, import
/// parsing, collection storage and the clipboard bridge, and exposes them
/// through the `#[wasm_bindgen]` functions below.

pub mod api;
pub mod browser;
pub mod clipboard;
pub mod collections;
pub mod error;
pub mod format;
pub mod import;
pub mod operations;
pub mod settings;
pub mod tab_data;

pub use api::BrowserContext;
pub use browser::BrowserKind;
pub use error::Error;
pub use format::{CopyTarget, DEFAULT_SEPARATOR, ExportFormat};
pub use tab_data::{Collection, SavedUrl, TabRecord, UrlEntry};

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Set up panic hook and logger for readable errors in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

fn context() -> Result<BrowserContext, JsValue> {
    BrowserContext::init().map_err(|err| JsValue::from_str(&err.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Browser identifier ("chrome", "firefox", ...) for a user-agent string.
#[wasm_bindgen]
pub fn detect_browser(user_agent: &str) -> String {
    BrowserKind::from_user_agent(user_agent).as_str().to_string()
}

/// Capability row (storage limits, icon sizes, feature flags) for the
/// browser identified by `user_agent`.
#[wasm_bindgen]
pub fn browser_capabilities(user_agent: &str) -> Result<JsValue, JsValue> {
    to_js(BrowserKind::from_user_agent(user_agent).capabilities())
}

/// Dedupe and filter a raw tab list for display.
#[wasm_bindgen]
pub fn process_tab_list(tabs: JsValue, user_agent: &str) -> Result<JsValue, JsValue> {
    let tabs: Vec<TabRecord> =
        serde_wasm_bindgen::from_value(tabs).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let kind = BrowserKind::from_user_agent(user_agent);
    to_js(&operations::process_tabs(&tabs, kind))
}

/// Query the current window and return the cleaned tab list.
#[wasm_bindgen]
pub async fn current_tab_list() -> Result<JsValue, JsValue> {
    let ctx = context()?;
    let tabs = operations::current_tabs(&ctx)
        .await
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    to_js(&tabs)
}

/// Render `tabs` as copy text. `target` is the raw button id ("copyAll",
/// "copyHighlighted" or a numeric tab id); an empty result means the
/// lookup missed and the caller should treat the copy as failed.
#[wasm_bindgen]
pub fn format_link_text(
    tabs: JsValue,
    target: &str,
    format: &str,
    include_name: bool,
) -> Result<String, JsValue> {
    let tabs: Vec<TabRecord> =
        serde_wasm_bindgen::from_value(tabs).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(format::format_links(
        &tabs,
        CopyTarget::from_raw(target),
        ExportFormat::from_key(format),
        include_name,
        DEFAULT_SEPARATOR,
    ))
}

/// Full copy flow: current tabs, stored format preferences, clipboard.
#[wasm_bindgen]
pub async fn copy_current_tabs(target: &str) -> Result<bool, JsValue> {
    let ctx = context()?;
    let tabs = operations::current_tabs(&ctx)
        .await
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let text = format::copy_text(&ctx, CopyTarget::from_raw(target), &tabs).await;
    if text.is_empty() {
        return Ok(false);
    }
    Ok(clipboard::copy_to_clipboard(&text).await)
}

#[wasm_bindgen]
pub async fn copy_text_to_clipboard(text: String) -> bool {
    clipboard::copy_to_clipboard(&text).await
}

/// Parse pasted text into normalized URL entries.
#[wasm_bindgen]
pub fn parse_import(text: &str) -> Result<JsValue, JsValue> {
    to_js(&import::parse_urls(text))
}

/// Side-effect-free import preview for the import card.
#[wasm_bindgen]
pub fn validate_import(text: &str) -> Result<JsValue, JsValue> {
    to_js(&import::validate_import_text(text))
}

/// Parse pasted text and open the URLs as tabs. `options` may be
/// undefined or a partial options object.
#[wasm_bindgen]
pub async fn import_urls_into_tabs(text: String, options: JsValue) -> Result<JsValue, JsValue> {
    let ctx = context()?;
    let options: import::ImportOptions = if options.is_undefined() || options.is_null() {
        import::ImportOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|err| JsValue::from_str(&err.to_string()))?
    };
    let outcome = import::import_and_create_tabs(&ctx, &text, &options).await;
    to_js(&outcome)
}

/// All stored collections, in user order.
#[wasm_bindgen]
pub async fn all_collections() -> Result<JsValue, JsValue> {
    let ctx = context()?;
    to_js(&collections::get_all_collections(&ctx).await)
}

/// Persist a new collection; resolves to the stored record or null on
/// storage failure.
#[wasm_bindgen]
pub async fn save_collection(draft: JsValue) -> Result<JsValue, JsValue> {
    let ctx = context()?;
    let draft: collections::CollectionDraft =
        serde_wasm_bindgen::from_value(draft).map_err(|err| JsValue::from_str(&err.to_string()))?;
    match collections::save_collection(&ctx, draft).await {
        Some(saved) => to_js(&saved),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen]
pub async fn update_collection(id: String, patch: JsValue) -> Result<bool, JsValue> {
    let ctx = context()?;
    let patch: collections::CollectionPatch =
        serde_wasm_bindgen::from_value(patch).map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(collections::update_collection(&ctx, &id, patch).await)
}

#[wasm_bindgen]
pub async fn delete_collection(id: String) -> Result<bool, JsValue> {
    let ctx = context()?;
    Ok(collections::delete_collection(&ctx, &id).await)
}

/// Persist a drag-and-drop reorder of the whole collection list.
#[wasm_bindgen]
pub async fn reorder_collections(ordered: JsValue) -> Result<bool, JsValue> {
    let ctx = context()?;
    let ordered: Vec<Collection> = serde_wasm_bindgen::from_value(ordered)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(collections::reorder_collections(&ctx, ordered).await)
}

/// Snapshot every open tab into a new named collection.
#[wasm_bindgen]
pub async fn collection_from_current_tabs(name: String) -> Result<JsValue, JsValue> {
    let ctx = context()?;
    match collections::create_collection_from_current_tabs(&ctx, &name).await {
        Some(saved) => to_js(&saved),
        None => Ok(JsValue::NULL),
    }
}

/// Current settings merged over defaults.
#[wasm_bindgen]
pub async fn all_settings() -> Result<JsValue, JsValue> {
    let ctx = context()?;
    to_js(&settings::get_all_settings(&ctx).await)
}

#[wasm_bindgen]
pub async fn save_settings(values: JsValue) -> Result<bool, JsValue> {
    let ctx = context()?;
    let values: settings::Settings = serde_wasm_bindgen::from_value(values)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    Ok(settings::save_settings(&ctx, &values).await)
}

#[wasm_bindgen]
pub async fn reset_settings() -> Result<bool, JsValue> {
    let ctx = context()?;
    Ok(settings::reset_settings(&ctx).await)
}
