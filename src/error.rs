/// Error taxonomy for the LinkPilot core.
///
/// Only `NoExtensionApi` is fatal; everything else is a soft failure that
/// public entry points catch, log, and turn into a sentinel value
/// (false / empty string / empty list).
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum Error {
    /// Neither a `browser` nor a `chrome` global exposes a working
    /// extension API. Nothing in the extension can function without one.
    #[error("no browser extension API available")]
    NoExtensionApi,

    /// A single-tab copy action referenced an id that is not in the
    /// rendered tab list.
    #[error("tab not found for id {0}")]
    EntryNotFound(i32),

    #[error("storage operation failed: {0}")]
    Storage(String),

    /// A host API call (tabs, permissions, runtime) rejected.
    #[error("host API call failed: {0}")]
    Host(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("permission denied")]
    PermissionDenied,

    #[error("serialization failed: {0}")]
    Serde(String),
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Render a JS error value into a plain message for logging.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{value:?}")
}
