use crate::domain::model::{Person, Project, Snapshot, WorkPackage};
use crate::domain::ports::{ReferenceSource, SnapshotStore, Storage};
use crate::utils::error::{BudgetError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

pub const PERSONS_FILE: &str = "users.json";
pub const WORK_PACKAGES_FILE: &str = "workpackages.json";
pub const PROJECT_FILE: &str = "project.json";
pub const BUDGET_FILE: &str = "budget.json";

/// Reads backend-shaped JSON exports from a [`Storage`]. `project.json` and
/// `budget.json` may be absent; the people and work package files may not.
#[derive(Debug, Clone)]
pub struct FileBackend<S: Storage> {
    storage: S,
}

impl<S: Storage> FileBackend<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("Reading {}", path);
        let data = self.storage.read_file(path).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    async fn read_optional_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        match self.read_json(path).await {
            Ok(value) => Ok(Some(value)),
            Err(BudgetError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} not found", path);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<S: Storage> ReferenceSource for FileBackend<S> {
    async fn persons(&self) -> Result<Vec<Person>> {
        self.read_json(PERSONS_FILE).await
    }

    async fn work_packages(&self) -> Result<Vec<WorkPackage>> {
        self.read_json(WORK_PACKAGES_FILE).await
    }

    async fn project(&self) -> Result<Option<Project>> {
        self.read_optional_json(PROJECT_FILE).await
    }
}

#[async_trait]
impl<S: Storage> SnapshotStore for FileBackend<S> {
    async fn load_snapshot(&self) -> Result<Snapshot> {
        Ok(self
            .read_optional_json(BUDGET_FILE)
            .await?
            .unwrap_or_default())
    }

    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        self.storage.write_file(BUDGET_FILE, &json).await
    }
}
