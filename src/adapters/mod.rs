// Adapters layer: concrete backends for the domain ports (local files, planner REST API).

pub mod api;
pub mod file;
pub mod storage;

pub use api::ApiBackend;
pub use file::FileBackend;
pub use storage::LocalStorage;
