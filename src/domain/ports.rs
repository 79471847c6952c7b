use crate::domain::model::{Person, PersonId, Project, Snapshot, WorkPackage};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::BuildHasher;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read-only person and work package registry owned by the planner backend.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn persons(&self) -> Result<Vec<Person>>;
    async fn work_packages(&self) -> Result<Vec<WorkPackage>>;
    /// `None` when the backend has no project row yet.
    async fn project(&self) -> Result<Option<Project>>;
}

/// Wholesale persistence of the allocation ledger.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn load_snapshot(&self) -> Result<Snapshot>;
    async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()>;
}

pub trait Backend: ReferenceSource + SnapshotStore {}

impl<T: ReferenceSource + SnapshotStore> Backend for T {}

pub trait WageLookup {
    fn wage(&self, person: PersonId) -> Option<f64>;
}

impl<S: BuildHasher> WageLookup for HashMap<PersonId, f64, S> {
    fn wage(&self, person: PersonId) -> Option<f64> {
        self.get(&person).copied()
    }
}
