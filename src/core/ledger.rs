use crate::core::registry::Registry;
use crate::domain::model::{
    BudgetEntry, CellInput, CellKey, Month, PersonId, ReferenceKind, Snapshot, WorkPackageId,
};
use crate::utils::error::LedgerError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A person may be committed at most this much in a single month.
pub const MONTHLY_CAPACITY: f64 = 1.0;

/// Slack allowed on the capacity check for floating point sums.
pub const CAPACITY_TOLERANCE: f64 = 1e-9;

/// Sparse (work package, person, month) -> fraction mapping.
///
/// Only non-zero fractions are stored. For every person and month the sum of
/// fractions across all work packages stays within [`MONTHLY_CAPACITY`]; every
/// mutation either keeps that true or fails and leaves the ledger untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationLedger {
    cells: BTreeMap<CellKey, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationSummary {
    pub work_package: WorkPackageId,
    pub person: PersonId,
    pub value: f64,
    pub months: Vec<Month>,
}

/// A stored cell that does not line up with the reference data.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceIssue {
    UnknownWorkPackage(CellKey),
    UnknownPerson(CellKey),
    NotAssigned(CellKey),
    OutsideWorkPackage {
        key: CellKey,
        start_month: Month,
        end_month: Month,
    },
}

impl fmt::Display for ReferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceIssue::UnknownWorkPackage(key) => {
                write!(f, "{}: work package does not exist", key)
            }
            ReferenceIssue::UnknownPerson(key) => write!(f, "{}: person does not exist", key),
            ReferenceIssue::NotAssigned(key) => {
                write!(f, "{}: person is not assigned to the work package", key)
            }
            ReferenceIssue::OutsideWorkPackage {
                key,
                start_month,
                end_month,
            } => write!(
                f,
                "{}: outside the work package months {}..={}",
                key, start_month, end_month
            ),
        }
    }
}

fn validate_fraction(value: f64) -> Result<f64, LedgerError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(LedgerError::InvalidFraction { value });
    }
    Ok(value)
}

fn validate_month(month: Month) -> Result<Month, LedgerError> {
    if month == 0 {
        return Err(LedgerError::InvalidMonth { month });
    }
    Ok(month)
}

fn exceeds_capacity(total: f64) -> bool {
    total > MONTHLY_CAPACITY + CAPACITY_TOLERANCE
}

impl AllocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from a persisted snapshot. Zero contributions are
    /// dropped and a repeated key keeps its last entry. The whole snapshot is
    /// rejected if any fraction is invalid or any person is over capacity.
    pub fn import(snapshot: &Snapshot) -> Result<Self, LedgerError> {
        let mut cells = BTreeMap::new();
        for entry in &snapshot.entries {
            let fraction = validate_fraction(entry.contribution)?;
            validate_month(entry.month)?;
            if fraction == 0.0 {
                cells.remove(&entry.key());
            } else {
                cells.insert(entry.key(), fraction);
            }
        }

        let mut monthly: BTreeMap<(PersonId, Month), f64> = BTreeMap::new();
        for (key, fraction) in &cells {
            *monthly.entry((key.person, key.month)).or_default() += fraction;
        }
        if let Some((&(person, month), &total)) =
            monthly.iter().find(|(_, total)| exceeds_capacity(**total))
        {
            return Err(LedgerError::CapacityExceeded {
                person,
                month,
                total,
            });
        }

        Ok(Self { cells })
    }

    pub fn export(&self) -> Snapshot {
        Snapshot {
            entries: self
                .cells
                .iter()
                .map(|(key, &contribution)| BudgetEntry {
                    id: None,
                    work_package: key.work_package,
                    user: key.person,
                    month: key.month,
                    contribution,
                })
                .collect(),
        }
    }

    pub fn get(&self, work_package: WorkPackageId, person: PersonId, month: Month) -> f64 {
        self.cells
            .get(&CellKey::new(work_package, person, month))
            .copied()
            .unwrap_or(0.0)
    }

    /// Total commitment of `person` in `month` across all work packages.
    pub fn committed(&self, person: PersonId, month: Month) -> f64 {
        self.cells
            .iter()
            .filter(|(key, _)| key.person == person && key.month == month)
            .map(|(_, fraction)| fraction)
            .sum()
    }

    pub fn cells(&self) -> impl Iterator<Item = (&CellKey, f64)> {
        self.cells.iter().map(|(key, &fraction)| (key, fraction))
    }

    /// Distinct (work package, person) pairs with at least one stored cell.
    pub fn pairs(&self) -> BTreeSet<(WorkPackageId, PersonId)> {
        self.cells
            .keys()
            .map(|key| (key.work_package, key.person))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn set_cell(
        &mut self,
        work_package: WorkPackageId,
        person: PersonId,
        month: Month,
        input: impl Into<CellInput>,
    ) -> Result<(), LedgerError> {
        let fraction = match input.into() {
            CellInput::Fraction(value) => validate_fraction(value)?,
            CellInput::Clear => 0.0,
        };
        let key = CellKey::new(work_package, person, validate_month(month)?);
        self.check_capacity(&key, fraction)?;
        self.write(key, fraction);
        Ok(())
    }

    /// Copies `value` into every month after `from_month` up to the work
    /// package's end month. All months are checked before any is written, so
    /// the first over-capacity month aborts the whole propagation.
    pub fn propagate(
        &mut self,
        registry: &Registry,
        work_package: WorkPackageId,
        person: PersonId,
        from_month: Month,
        value: f64,
    ) -> Result<PropagationSummary, LedgerError> {
        let fraction = validate_fraction(value)?;
        let end_month = registry
            .work_package(work_package)
            .map(|wp| wp.end_month)
            .ok_or(LedgerError::UnknownReference {
                kind: ReferenceKind::WorkPackage,
                id: work_package.0,
            })?;
        if registry.person(person).is_none() {
            return Err(LedgerError::UnknownReference {
                kind: ReferenceKind::Person,
                id: person.0,
            });
        }
        validate_month(from_month)?;

        // Each write only touches (work_package, person, month), and the check
        // for a month only reads other work packages, so checking every month
        // up front sees exactly what an in-order write-and-check would.
        let months: Vec<Month> = (from_month.saturating_add(1)..=end_month).collect();
        for &month in &months {
            self.check_capacity(&CellKey::new(work_package, person, month), fraction)?;
        }
        for &month in &months {
            self.write(CellKey::new(work_package, person, month), fraction);
        }

        Ok(PropagationSummary {
            work_package,
            person,
            value: fraction,
            months,
        })
    }

    /// Lists cells that point at unknown ids, unassigned people, or months
    /// outside their work package.
    pub fn verify(&self, registry: &Registry) -> Vec<ReferenceIssue> {
        let mut issues = Vec::new();
        for key in self.cells.keys() {
            let Some(wp) = registry.work_package(key.work_package) else {
                issues.push(ReferenceIssue::UnknownWorkPackage(*key));
                continue;
            };
            if registry.person(key.person).is_none() {
                issues.push(ReferenceIssue::UnknownPerson(*key));
                continue;
            }
            if !wp.is_assigned(key.person) {
                issues.push(ReferenceIssue::NotAssigned(*key));
            }
            if !wp.months().contains(&key.month) {
                issues.push(ReferenceIssue::OutsideWorkPackage {
                    key: *key,
                    start_month: wp.start_month,
                    end_month: wp.end_month,
                });
            }
        }
        issues
    }

    fn check_capacity(&self, key: &CellKey, fraction: f64) -> Result<(), LedgerError> {
        if fraction == 0.0 {
            return Ok(());
        }
        let elsewhere: f64 = self
            .cells
            .iter()
            .filter(|(other, _)| {
                other.person == key.person
                    && other.month == key.month
                    && other.work_package != key.work_package
            })
            .map(|(_, fraction)| fraction)
            .sum();
        let total = elsewhere + fraction;
        if exceeds_capacity(total) {
            return Err(LedgerError::CapacityExceeded {
                person: key.person,
                month: key.month,
                total,
            });
        }
        Ok(())
    }

    fn write(&mut self, key: CellKey, fraction: f64) {
        if fraction == 0.0 {
            self.cells.remove(&key);
        } else {
            self.cells.insert(key, fraction);
        }
    }
}
