//! In-memory project storage.

use super::{BoxFuture, ProjectData, Storage, StorageError, StorageResult};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Projects held in a map, for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryStorage {
    projects: RwLock<HashMap<String, ProjectData>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<String, ProjectData>>> {
        self.projects
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<String, ProjectData>>> {
        self.projects
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, project: &ProjectData) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let project = project.clone();
        Box::pin(async move {
            self.write()?.insert(id, project);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<ProjectData>> {
        let id = id.to_string();
        Box::pin(async move {
            let project = self.read()?.get(&id).cloned();
            project.ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write()?.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let mut ids: Vec<String> = self.read()?.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&id)) })
    }
}
