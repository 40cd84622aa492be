/// User preference persistence.
///
/// Settings live as flat camelCase keys in sync storage alongside the
/// collections array. There is no schema version; absent keys fall back
/// to defaults, which is how new fields stay backward compatible.
use js_sys::{Object, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::api::BrowserContext;
use crate::error::{Error, describe_js};
use crate::format::ExportFormat;

/// One combined QR code for a whole collection, or one code per URL
/// (delivered as a ZIP by the export layer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrExportMode {
    #[default]
    Single,
    Separate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub format: ExportFormat,
    pub include_name: bool,
    pub qr_export_mode: QrExportMode,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            format: ExportFormat::Plaintext,
            include_name: false,
            qr_export_mode: QrExportMode::Single,
        }
    }
}

/// Load settings, falling back to defaults on any failure.
pub async fn get_all_settings(ctx: &BrowserContext) -> Settings {
    let storage = match ctx.api().storage_sync() {
        Ok(storage) => storage,
        Err(err) => {
            log::error!("failed to open settings storage: {err}");
            return Settings::default();
        }
    };

    match storage.get_all().await {
        Ok(bag) => match serde_wasm_bindgen::from_value::<Settings>(bag) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("stored settings unreadable, using defaults: {err}");
                Settings::default()
            }
        },
        Err(err) => {
            log::error!("failed to load settings: {err}");
            Settings::default()
        }
    }
}

pub async fn save_settings(ctx: &BrowserContext, settings: &Settings) -> bool {
    let payload = match serde_wasm_bindgen::to_value(settings) {
        Ok(payload) => payload,
        Err(err) => {
            log::error!("failed to encode settings: {err}");
            return false;
        }
    };
    write(ctx, &payload).await
}

/// Write one raw key. Used by the options form, which saves fields as the
/// user toggles them.
pub async fn save_setting(ctx: &BrowserContext, key: &str, value: &JsValue) -> bool {
    let payload = Object::new();
    if let Err(err) = Reflect::set(&payload, &JsValue::from_str(key), value) {
        log::error!("{}", Error::Storage(describe_js(&err)));
        return false;
    }
    write(ctx, &payload.into()).await
}

/// Clear the whole area and restore defaults.
pub async fn reset_settings(ctx: &BrowserContext) -> bool {
    let storage = match ctx.api().storage_sync() {
        Ok(storage) => storage,
        Err(err) => {
            log::error!("failed to open settings storage: {err}");
            return false;
        }
    };

    if let Err(err) = storage.clear().await {
        log::error!("failed to reset settings: {err}");
        return false;
    }
    save_settings(ctx, &Settings::default()).await
}

pub async fn get_qr_export_mode(ctx: &BrowserContext) -> QrExportMode {
    get_all_settings(ctx).await.qr_export_mode
}

pub async fn set_qr_export_mode(ctx: &BrowserContext, mode: QrExportMode) -> bool {
    let value = match serde_wasm_bindgen::to_value(&mode) {
        Ok(value) => value,
        Err(err) => {
            log::error!("failed to encode qr export mode: {err}");
            return false;
        }
    };
    save_setting(ctx, "qrExportMode", &value).await
}

async fn write(ctx: &BrowserContext, payload: &JsValue) -> bool {
    let storage = match ctx.api().storage_sync() {
        Ok(storage) => storage,
        Err(err) => {
            log::error!("failed to open settings storage: {err}");
            return false;
        }
    };

    match storage.set(payload).await {
        Ok(()) => true,
        Err(err) => {
            log::error!("failed to save settings: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.format, ExportFormat::Plaintext);
        assert!(!settings.include_name);
        assert_eq!(settings.qr_export_mode, QrExportMode::Single);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let json = serde_json::to_string(&Settings {
            format: ExportFormat::Markdown,
            include_name: true,
            qr_export_mode: QrExportMode::Separate,
        })
        .unwrap();

        assert_eq!(
            json,
            r#"{"format":"markdown","includeName":true,"qrExportMode":"separate"}"#
        );
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"includeName":true}"#).unwrap();
        assert!(settings.include_name);
        assert_eq!(settings.format, ExportFormat::Plaintext);
        assert_eq!(settings.qr_export_mode, QrExportMode::Single);

        let empty: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, Settings::default());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        // The settings struct reads from the same storage area that holds
        // the collections array.
        let settings: Settings =
            serde_json::from_str(r#"{"format":"csv","collections":[],"legacyKey":1}"#).unwrap();
        assert_eq!(settings.format, ExportFormat::Csv);
    }

    #[test]
    fn test_qr_mode_wire_values() {
        assert_eq!(
            serde_json::to_string(&QrExportMode::Single).unwrap(),
            "\"single\""
        );
        assert_eq!(
            serde_json::from_str::<QrExportMode>("\"separate\"").unwrap(),
            QrExportMode::Separate
        );
        assert!(serde_json::from_str::<QrExportMode>("\"combined\"").is_err());
    }
}
