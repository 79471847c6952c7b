use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;

/// 1-based month index relative to the project start.
pub type Month = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub u32);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkPackageId(pub u32);

impl fmt::Display for WorkPackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    WorkPackage,
    Person,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::WorkPackage => write!(f, "work package"),
            ReferenceKind::Person => write!(f, "person"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub wage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkPackageStatus {
    #[default]
    Active,
    Closed,
}

/// Work package as served by the planner backend. Month bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPackage {
    pub id: WorkPackageId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "start_date")]
    pub start_month: Month,
    #[serde(rename = "end_date")]
    pub end_month: Month,
    #[serde(default)]
    pub status: WorkPackageStatus,
    #[serde(rename = "users", default)]
    pub assignees: Vec<PersonId>,
}

impl WorkPackage {
    pub fn months(&self) -> RangeInclusive<Month> {
        self.start_month..=self.end_month
    }

    pub fn is_assigned(&self, person: PersonId) -> bool {
        self.assignees.contains(&person)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    pub start_date: NaiveDate,
}

/// Composite ledger key. Field order defines the ordering: work package,
/// then person, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub work_package: WorkPackageId,
    pub person: PersonId,
    pub month: Month,
}

impl CellKey {
    pub fn new(work_package: WorkPackageId, person: PersonId, month: Month) -> Self {
        Self {
            work_package,
            person,
            month,
        }
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wp {} / person {} / month {}",
            self.work_package, self.person, self.month
        )
    }
}

/// Value written into a ledger cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellInput {
    Fraction(f64),
    Clear,
}

impl From<f64> for CellInput {
    fn from(value: f64) -> Self {
        CellInput::Fraction(value)
    }
}

/// Maximal run of consecutive months carrying the same non-zero fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub work_package: WorkPackageId,
    pub person: PersonId,
    pub start_month: Month,
    pub duration: u32,
    pub fraction: f64,
}

impl Segment {
    pub fn end_month(&self) -> Month {
        self.start_month + (self.duration - 1)
    }

    pub fn months(&self) -> RangeInclusive<Month> {
        self.start_month..=self.end_month()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub person_totals: BTreeMap<PersonId, f64>,
    pub work_package_totals: BTreeMap<WorkPackageId, f64>,
    pub month_totals: BTreeMap<Month, f64>,
    pub grand_total: f64,
}

/// One row of the backend `budget/` resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub work_package: WorkPackageId,
    pub user: PersonId,
    pub month: Month,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub contribution: f64,
}

impl BudgetEntry {
    pub fn key(&self) -> CellKey {
        CellKey::new(self.work_package, self.user, self.month)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub entries: Vec<BudgetEntry>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Django REST Framework renders `DecimalField` as a string ("1000.00");
/// plain JSON numbers are accepted as well.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(value) => Ok(value),
        Decimal::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal '{}': {}", text, e))),
    }
}
