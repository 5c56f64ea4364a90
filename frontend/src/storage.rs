//! `localStorage` behind the core key/value trait.

use trainboard_core::store::KeyValueStore;
use trainboard_core::{Result, TrainboardError};
use wasm_bindgen::JsValue;

pub struct BrowserStorage {
    storage: Option<web_sys::Storage>,
}

impl BrowserStorage {
    /// The window's `localStorage`. Private browsing modes may deny it;
    /// reads then see nothing and writes fail.
    pub fn local() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("localStorage is unavailable");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| TrainboardError::Storage("localStorage is unavailable".into()))
    }
}

fn js_error(e: JsValue) -> TrainboardError {
    TrainboardError::Storage(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match &self.storage {
            Some(s) => s.get_item(key).map_err(js_error),
            None => Ok(None),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&mut self, key: &str) -> Result<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}

/// Console log level from the `debug_enabled` flag.
pub fn debug_enabled() -> bool {
    BrowserStorage::local()
        .get_item("debug_enabled")
        .unwrap_or_default()
        .as_deref()
        == Some("true")
}
