//! Periodic project persistence.

use crate::config::EditorConfig;
use crate::storage::{ProjectData, Storage, StorageResult};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Key holding a copy of the most recently saved project.
pub const LAST_PROJECT_KEY: &str = "__last_project__";

/// Tracks unsaved changes and saves a project at most once per interval.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    project_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>, config: &EditorConfig) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(config.autosave_interval_secs),
            last_save: None,
            dirty: false,
            project_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_project_id(&mut self, id: Option<String>) {
        self.project_id = id;
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Dirty, and the interval has elapsed since the last save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if [`should_save`](Self::should_save). Returns whether it saved.
    pub async fn maybe_save(&mut self, project: &ProjectData) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(project).await?;
        Ok(true)
    }

    /// Save now, under the tracked id (or the project's own id), and as the
    /// last project.
    pub async fn save(&mut self, project: &ProjectData) -> StorageResult<()> {
        let id = self
            .project_id
            .clone()
            .or_else(|| project.project_id.clone());
        let mut project = project.clone();
        if let Some(id) = &id {
            project.project_id = Some(id.clone());
            self.storage.save(id, &project).await?;
        }
        self.storage.save(LAST_PROJECT_KEY, &project).await?;

        self.project_id = id;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("Auto-saved project {:?}", self.project_id);
        Ok(())
    }

    pub async fn load(&mut self, id: &str) -> StorageResult<ProjectData> {
        let project = self.storage.load(id).await?;
        self.project_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(project)
    }

    /// The most recently saved project, if any.
    pub async fn load_last(&mut self) -> Option<ProjectData> {
        match self.storage.load(LAST_PROJECT_KEY).await {
            Ok(project) => {
                self.project_id = project.project_id.clone();
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(project)
            }
            Err(e) => {
                log::debug!("No last project to restore: {}", e);
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Saved project ids, without the last-project key.
    pub async fn list_projects(&self) -> StorageResult<Vec<String>> {
        let mut ids = self.storage.list().await?;
        ids.retain(|id| id != LAST_PROJECT_KEY);
        Ok(ids)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Platform storage in its default location.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::FileStorage>> {
    Ok(Arc::new(crate::storage::FileStorage::default_location()?))
}

#[cfg(target_arch = "wasm32")]
pub fn create_default_storage() -> StorageResult<Arc<crate::storage::LocalStorage>> {
    Ok(Arc::new(crate::storage::LocalStorage::new()?))
}

#[cfg(not(target_arch = "wasm32"))]
pub type PlatformStorage = crate::storage::FileStorage;

#[cfg(target_arch = "wasm32")]
pub type PlatformStorage = crate::storage::LocalStorage;

pub type PlatformAutoSaveManager = AutoSaveManager<PlatformStorage>;

pub fn create_autosave_manager(config: &EditorConfig) -> StorageResult<PlatformAutoSaveManager> {
    Ok(AutoSaveManager::new(create_default_storage()?, config))
}
