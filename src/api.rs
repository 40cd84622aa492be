/// Host extension API resolution.
///
/// The extension runs against two host API shapes: a promise-based
/// `browser` global (Firefox, or Chrome behind the webextension polyfill)
/// and a callback-based `chrome` global. The shape is probed once at
/// context construction; `HostApi::invoke` hides the difference behind a
/// single awaitable call surface.
use js_sys::{Array, Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::browser::{BrowserKind, Capabilities};
use crate::error::{Error, describe_js};
use crate::tab_data::TabRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// Host methods return promises.
    Promise,
    /// Host methods take a trailing callback and report failure through
    /// `runtime.lastError`.
    Callback,
}

/// Handle to the resolved extension API root (`browser` or `chrome`).
pub struct HostApi {
    root: Object,
    runtime: Object,
    flavor: ApiFlavor,
}

impl HostApi {
    /// Probe the global scope for an extension API, preferring the
    /// promise-based `browser` object over the callback-based `chrome`
    /// one. A candidate only qualifies if `runtime.getManifest` is a
    /// function. Fatal when neither qualifies: nothing in the extension
    /// can work outside a host browser.
    pub fn resolve() -> Result<HostApi, Error> {
        let global = js_sys::global();

        if let Some((root, runtime)) = probe(&global, "browser") {
            return Ok(HostApi { root, runtime, flavor: ApiFlavor::Promise });
        }
        if let Some((root, runtime)) = probe(&global, "chrome") {
            return Ok(HostApi { root, runtime, flavor: ApiFlavor::Callback });
        }

        Err(Error::NoExtensionApi)
    }

    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    pub fn tabs(&self) -> Result<TabsApi<'_>, Error> {
        Ok(TabsApi { api: self, handle: self.field("tabs")? })
    }

    pub fn storage_sync(&self) -> Result<StorageArea<'_>, Error> {
        let storage = self.field("storage")?;
        let sync = Reflect::get(&storage, &JsValue::from_str("sync"))
            .map_err(|err| Error::Storage(describe_js(&err)))?;
        if !sync.is_object() {
            return Err(Error::Storage("sync storage area unavailable".to_string()));
        }
        Ok(StorageArea { api: self, handle: sync.unchecked_into() })
    }

    /// The extension manifest. `runtime.getManifest` is synchronous on
    /// every host, so no flavor handling is needed.
    pub fn manifest(&self) -> Result<JsValue, Error> {
        let get_manifest: Function = Reflect::get(&self.runtime, &JsValue::from_str("getManifest"))
            .map_err(|err| Error::Host(describe_js(&err)))?
            .dyn_into()
            .map_err(|_| Error::Host("runtime.getManifest is not a function".to_string()))?;
        get_manifest
            .call0(&self.runtime)
            .map_err(|err| Error::Host(describe_js(&err)))
    }

    /// Soft permission probe: any failure is logged and read as denied.
    pub async fn has_permissions(&self, permissions: &[&str]) -> bool {
        let query = PermissionQuery {
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        };
        let query_js = match serde_wasm_bindgen::to_value(&query) {
            Ok(value) => value,
            Err(err) => {
                log::error!("failed to encode permission query: {err}");
                return false;
            }
        };

        let handle = match self.field("permissions") {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("{err}");
                return false;
            }
        };

        match self.invoke(&handle, "contains", &[query_js]).await {
            Ok(value) => value.as_bool().unwrap_or(false),
            Err(err) => {
                log::warn!("{}: {err}", Error::PermissionDenied);
                false
            }
        }
    }

    fn field(&self, name: &str) -> Result<Object, Error> {
        let value = Reflect::get(&self.root, &JsValue::from_str(name))
            .map_err(|err| Error::Host(describe_js(&err)))?;
        if value.is_object() {
            Ok(value.unchecked_into())
        } else {
            Err(Error::Host(format!("{name} API unavailable")))
        }
    }

    /// Call `target.method(...args)` and await the result, regardless of
    /// the host's flavor. Callback hosts get a trailing callback that
    /// settles a wrapper promise, rejecting with `runtime.lastError` when
    /// the host set it.
    pub(crate) async fn invoke(
        &self,
        target: &Object,
        method: &str,
        args: &[JsValue],
    ) -> Result<JsValue, Error> {
        let func: Function = Reflect::get(target, &JsValue::from_str(method))
            .map_err(|err| Error::Host(describe_js(&err)))?
            .dyn_into()
            .map_err(|_| Error::Host(format!("{method} is not a function")))?;

        match self.flavor {
            ApiFlavor::Promise => {
                let call_args = Array::new();
                for arg in args {
                    call_args.push(arg);
                }
                let returned = Reflect::apply(&func, target, &call_args)
                    .map_err(|err| Error::Host(describe_js(&err)))?;
                JsFuture::from(Promise::resolve(&returned))
                    .await
                    .map_err(|err| Error::Host(describe_js(&err)))
            }
            ApiFlavor::Callback => {
                let args: Vec<JsValue> = args.to_vec();
                let runtime = self.runtime.clone();
                let target = target.clone();

                let promise = Promise::new(&mut |resolve, reject| {
                    let runtime = runtime.clone();
                    let reject_late = reject.clone();
                    let callback = Closure::once_into_js(move |value: JsValue| {
                        let last_error = Reflect::get(&runtime, &JsValue::from_str("lastError"))
                            .unwrap_or(JsValue::UNDEFINED);
                        if last_error.is_undefined() || last_error.is_null() {
                            let _ = resolve.call1(&JsValue::UNDEFINED, &value);
                        } else {
                            let message = Reflect::get(&last_error, &JsValue::from_str("message"))
                                .ok()
                                .and_then(|m| m.as_string())
                                .unwrap_or_else(|| "unknown host error".to_string());
                            let _ = reject_late
                                .call1(&JsValue::UNDEFINED, &JsValue::from_str(&message));
                        }
                    });

                    let call_args = Array::new();
                    for arg in &args {
                        call_args.push(arg);
                    }
                    call_args.push(&callback);

                    if let Err(err) = Reflect::apply(&func, &target, &call_args) {
                        let _ = reject.call1(&JsValue::UNDEFINED, &err);
                    }
                });

                JsFuture::from(promise)
                    .await
                    .map_err(|err| Error::Host(describe_js(&err)))
            }
        }
    }
}

fn probe(global: &Object, name: &str) -> Option<(Object, Object)> {
    let candidate = Reflect::get(global, &JsValue::from_str(name)).ok()?;
    if !candidate.is_object() {
        return None;
    }
    let runtime = Reflect::get(&candidate, &JsValue::from_str("runtime")).ok()?;
    if !runtime.is_object() {
        return None;
    }
    let get_manifest = Reflect::get(&runtime, &JsValue::from_str("getManifest")).ok()?;
    if !get_manifest.is_function() {
        return None;
    }
    Some((candidate.unchecked_into(), runtime.unchecked_into()))
}

#[derive(Serialize)]
struct PermissionQuery {
    permissions: Vec<String>,
}

/// Filter for `tabs.query`. Absent fields are omitted on the wire so the
/// host treats them as "any".
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_window: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabCreate {
    pub url: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_id: Option<i32>,
}

pub struct TabsApi<'a> {
    api: &'a HostApi,
    handle: Object,
}

impl TabsApi<'_> {
    pub async fn query(&self, filter: &TabQuery) -> Result<Vec<TabRecord>, Error> {
        let filter_js = serde_wasm_bindgen::to_value(filter)?;
        let raw = self.api.invoke(&self.handle, "query", &[filter_js]).await?;
        serde_wasm_bindgen::from_value(raw).map_err(Error::from)
    }

    pub async fn query_current_window(&self) -> Result<Vec<TabRecord>, Error> {
        self.query(&TabQuery { current_window: Some(true) }).await
    }

    pub async fn query_all(&self) -> Result<Vec<TabRecord>, Error> {
        self.query(&TabQuery::default()).await
    }

    pub async fn create(&self, options: &TabCreate) -> Result<(), Error> {
        let options_js = serde_wasm_bindgen::to_value(options)?;
        self.api.invoke(&self.handle, "create", &[options_js]).await?;
        Ok(())
    }
}

/// One key-value storage area (`storage.sync`).
pub struct StorageArea<'a> {
    api: &'a HostApi,
    handle: Object,
}

impl StorageArea<'_> {
    /// Fetch a single key. Returns `undefined` when the key is absent.
    pub async fn get_key(&self, key: &str) -> Result<JsValue, Error> {
        let bag = self
            .api
            .invoke(&self.handle, "get", &[JsValue::from_str(key)])
            .await
            .map_err(as_storage_error)?;
        Reflect::get(&bag, &JsValue::from_str(key)).map_err(|err| Error::Storage(describe_js(&err)))
    }

    /// Fetch every key in the area.
    pub async fn get_all(&self) -> Result<JsValue, Error> {
        self.api
            .invoke(&self.handle, "get", &[JsValue::NULL])
            .await
            .map_err(as_storage_error)
    }

    pub async fn set(&self, items: &JsValue) -> Result<(), Error> {
        self.api
            .invoke(&self.handle, "set", &[items.clone()])
            .await
            .map_err(as_storage_error)?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), Error> {
        self.api
            .invoke(&self.handle, "clear", &[])
            .await
            .map_err(as_storage_error)?;
        Ok(())
    }
}

fn as_storage_error(err: Error) -> Error {
    match err {
        Error::Host(message) => Error::Storage(message),
        other => other,
    }
}

/// Per-session context: the detected browser plus the resolved host API.
///
/// Constructed once at startup and passed by reference to every component
/// that touches the host; there is no process-global cache.
pub struct BrowserContext {
    kind: BrowserKind,
    api: HostApi,
}

impl BrowserContext {
    pub fn init() -> Result<BrowserContext, Error> {
        let user_agent = web_sys::window()
            .and_then(|window| window.navigator().user_agent().ok())
            .unwrap_or_default();
        let kind = BrowserKind::from_user_agent(&user_agent);
        let api = HostApi::resolve()?;
        log::info!(
            "host browser: {} (manifest v{}, {:?} API)",
            kind.as_str(),
            kind.manifest_version(),
            api.flavor()
        );
        Ok(BrowserContext { kind, api })
    }

    pub fn kind(&self) -> BrowserKind {
        self.kind
    }

    pub fn api(&self) -> &HostApi {
        &self.api
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        self.kind.capabilities()
    }
}

/// Resolve after `ms` milliseconds on the host event loop.
pub(crate) async fn sleep_ms(ms: i32) {
    let promise = Promise::new(&mut |resolve, _reject| match web_sys::window() {
        Some(window) => {
            if window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .is_err()
            {
                let _ = resolve.call0(&JsValue::UNDEFINED);
            }
        }
        None => {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        }
    });
    let _ = JsFuture::from(promise).await;
}
