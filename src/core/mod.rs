pub mod ledger;
pub mod registry;
pub mod report;
pub mod segments;
pub mod session;
pub mod totals;

pub use crate::domain::model::{Segment, Snapshot, Totals};
pub use crate::domain::ports::{Backend, ReferenceSource, SnapshotStore, Storage, WageLookup};
pub use crate::utils::error::Result;
