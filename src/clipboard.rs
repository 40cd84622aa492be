/// Clipboard writes with a legacy DOM fallback.
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

/// Copy `text` to the system clipboard.
///
/// Prefers the async clipboard API; restricted contexts (and older
/// WebViews) fall back to a hidden textarea plus `execCommand("copy")`.
/// Returns false only when both paths fail; never throws to the caller.
pub async fn copy_to_clipboard(text: &str) -> bool {
    if let Some(window) = web_sys::window() {
        let clipboard = window.navigator().clipboard();
        let handle: &JsValue = clipboard.as_ref();
        if !handle.is_undefined() && !handle.is_null() {
            match JsFuture::from(clipboard.write_text(text)).await {
                Ok(_) => return true,
                Err(err) => {
                    log::warn!("clipboard write rejected, trying fallback: {err:?}");
                }
            }
        }
    }

    fallback_copy(text)
}

fn fallback_copy(text: &str) -> bool {
    let result = (|| -> Result<bool, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        // execCommand lives on HtmlDocument, not Document.
        let html_document: HtmlDocument = document
            .clone()
            .dyn_into()
            .map_err(|_| JsValue::from_str("document cast failed"))?;

        let textarea: HtmlTextAreaElement = document
            .create_element("textarea")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("textarea cast failed"))?;
        textarea.set_value(text);

        // Keep it out of view without display:none, which would make the
        // selection a no-op.
        let style = textarea.style();
        style.set_property("position", "fixed")?;
        style.set_property("opacity", "0")?;

        body.append_child(&textarea)?;
        textarea.select();
        let copied = html_document.exec_command("copy").unwrap_or(false);
        let _ = body.remove_child(&textarea);

        Ok(copied)
    })();

    match result {
        Ok(copied) => copied,
        Err(err) => {
            log::error!("fallback clipboard copy failed: {err:?}");
            false
        }
    }
}
