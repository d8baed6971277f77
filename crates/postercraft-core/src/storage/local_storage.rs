//! Browser `localStorage` backend for WASM.

use super::{BoxFuture, ProjectData, Storage, StorageError, StorageResult};

const KEY_PREFIX: &str = "postercraft:project:";

fn js_error(context: &str, err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Other(format!("{}: {:?}", context, err))
}

/// Projects stored as JSON strings under prefixed `localStorage` keys.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> StorageResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window available".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| js_error("localStorage unavailable", e))?
            .ok_or_else(|| StorageError::Other("localStorage disabled".into()))?;
        Ok(Self { storage })
    }

    fn key(id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    fn read(&self, id: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(&Self::key(id))
            .map_err(|e| js_error("Failed to read localStorage", e))
    }
}

impl Storage for LocalStorage {
    fn save(&self, id: &str, project: &ProjectData) -> BoxFuture<'_, StorageResult<()>> {
        let key = Self::key(id);
        let json = project.to_json();
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            // quota errors surface here
            self.storage
                .set_item(&key, &json)
                .map_err(|e| js_error("Failed to write localStorage", e))
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectData>> {
        let id = id.to_string();
        Box::pin(async move {
            match self.read(&id)? {
                Some(json) => ProjectData::from_json(&json),
                None => Err(StorageError::NotFound(id)),
            }
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let key = Self::key(id);
        Box::pin(async move {
            self.storage
                .remove_item(&key)
                .map_err(|e| js_error("Failed to delete from localStorage", e))
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let len = self
                .storage
                .length()
                .map_err(|e| js_error("Failed to read localStorage", e))?;
            let mut ids = Vec::new();
            for i in 0..len {
                let key = self
                    .storage
                    .key(i)
                    .map_err(|e| js_error("Failed to read localStorage", e))?;
                if let Some(id) = key.as_deref().and_then(|k| k.strip_prefix(KEY_PREFIX)) {
                    ids.push(id.to_string());
                }
            }
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read(&id)?.is_some()) })
    }
}
