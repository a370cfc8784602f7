use wasm_bindgen::JsValue;
use web_sys::Storage as WebStorage;

use crate::error::StorageError;
use crate::storage::Storage;

fn unavailable(err: JsValue) -> StorageError {
    StorageError::Unavailable(format!("{err:?}"))
}

/// `window.localStorage`.
pub struct LocalStorage {
    inner: WebStorage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        let inner = window
            .local_storage()
            .map_err(unavailable)?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { inner })
    }
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key).map_err(unavailable)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value).map_err(unavailable)
    }
}
