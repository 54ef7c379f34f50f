//! Task collection: a document store kept in memory and, optionally,
//! persisted as a single JSON file after every write.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::task::{Task, TaskFields, TaskId};

/// Persistence seam used by the service.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task, assigning its id.
    async fn insert(&self, fields: TaskFields) -> Result<Task, StoreError>;

    /// Every task, in insertion order.
    async fn find_all(&self) -> Result<Vec<Task>, StoreError>;

    /// Replace the mutable fields of a task. `None` if the id is unknown.
    async fn update(&self, id: TaskId, fields: TaskFields) -> Result<Option<Task>, StoreError>;

    /// Remove a task, returning it. `None` if the id is unknown.
    async fn delete(&self, id: TaskId) -> Result<Option<Task>, StoreError>;
}

#[derive(Debug, Default)]
pub struct JsonTaskStore {
    path: Option<PathBuf>,
    tasks: RwLock<Vec<Task>>,
}

impl JsonTaskStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens the collection at `path`. A missing file is an empty collection.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tasks: Vec<Task> = match tokio::fs::read(&path).await {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(data) => serde_json::from_slice(&data)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        for task in &tasks {
            check_schema(task)?;
        }
        info!(path = %path.display(), count = tasks.len(), "Loaded task collection");
        Ok(Self {
            path: Some(path),
            tasks: RwLock::new(tasks),
        })
    }

    async fn persist(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_json::to_vec_pretty(tasks)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        tokio::fs::write(&tmp, data).await?;
        if let Err(err) = tokio::fs::rename(&tmp, path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(path = ?tmp, error = %cleanup, "Failed to remove temporary task file");
            }
            return Err(err.into());
        }
        debug!(path = %path.display(), count = tasks.len(), "Persisted task collection");
        Ok(())
    }
}

#[async_trait]
impl TaskStore for JsonTaskStore {
    async fn insert(&self, fields: TaskFields) -> Result<Task, StoreError> {
        let mut tasks = self.tasks.write().await;
        let mut id = Uuid::new_v4();
        while tasks.iter().any(|t| t.id == id) {
            id = Uuid::new_v4();
        }
        let task = fields.into_task(id);
        check_schema(&task)?;

        tasks.push(task.clone());
        if let Err(err) = self.persist(&tasks).await {
            tasks.pop();
            return Err(err);
        }
        Ok(task)
    }

    async fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.tasks.read().await.clone())
    }

    async fn update(&self, id: TaskId, fields: TaskFields) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let mut updated = tasks[index].clone();
        fields.apply_to(&mut updated);
        check_schema(&updated)?;

        let previous = std::mem::replace(&mut tasks[index], updated.clone());
        if let Err(err) = self.persist(&tasks).await {
            tasks[index] = previous;
            return Err(err);
        }
        Ok(Some(updated))
    }

    async fn delete(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = tasks.remove(index);
        if let Err(err) = self.persist(&tasks).await {
            tasks.insert(index, removed);
            return Err(err);
        }
        Ok(Some(removed))
    }
}

/// Storage-level constraints, enforced independently of request validation.
fn check_schema(task: &Task) -> Result<(), StoreError> {
    if task.title.trim().is_empty() {
        return Err(StoreError::Schema("title is required"));
    }
    Ok(())
}
