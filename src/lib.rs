pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Command};
pub use crate::config::{SourceConfig, WorksheetConfig};

pub use crate::adapters::{ApiBackend, FileBackend, LocalStorage};
pub use crate::core::{
    ledger::{AllocationLedger, PropagationSummary, ReferenceIssue},
    registry::Registry,
    report::{BudgetReport, ReportBuilder},
    session::BudgetSession,
};
pub use crate::domain::model::{
    BudgetEntry, CellInput, CellKey, Month, Person, PersonId, Project, Segment, Snapshot, Totals,
    WorkPackage, WorkPackageId, WorkPackageStatus,
};
pub use crate::utils::error::{BudgetError, LedgerError, Result};
