use crate::domain::model::{
    Month, Person, PersonId, Project, WorkPackage, WorkPackageId, WorkPackageStatus,
};
use crate::domain::ports::WageLookup;
use crate::utils::error::{BudgetError, Result};
use std::collections::BTreeMap;

/// Upper bound on a work package's end month (100 years of monthly columns).
pub const MAX_PROJECT_MONTHS: Month = 1200;

/// Reference data the ledger reads but never owns: people with wages, work
/// packages with their month ranges, and the project start date.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    persons: BTreeMap<PersonId, Person>,
    work_packages: BTreeMap<WorkPackageId, WorkPackage>,
    project: Option<Project>,
}

impl Registry {
    pub fn new(
        persons: Vec<Person>,
        work_packages: Vec<WorkPackage>,
        project: Option<Project>,
    ) -> Result<Self> {
        let mut registry = Self {
            project,
            ..Self::default()
        };

        for person in persons {
            if !person.wage.is_finite() || person.wage < 0.0 {
                return Err(BudgetError::InvalidReferenceData {
                    message: format!(
                        "person {} ({}) has invalid wage {}",
                        person.id, person.name, person.wage
                    ),
                });
            }
            registry.persons.insert(person.id, person);
        }

        for wp in work_packages {
            if wp.start_month == 0
                || wp.end_month < wp.start_month
                || wp.end_month > MAX_PROJECT_MONTHS
            {
                return Err(BudgetError::InvalidReferenceData {
                    message: format!(
                        "work package {} ({}) has invalid month range {}..={}",
                        wp.id, wp.name, wp.start_month, wp.end_month
                    ),
                });
            }
            registry.work_packages.insert(wp.id, wp);
        }

        Ok(registry)
    }

    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    pub fn work_package(&self, id: WorkPackageId) -> Option<&WorkPackage> {
        self.work_packages.get(&id)
    }

    pub fn persons(&self) -> impl Iterator<Item = &Person> {
        self.persons.values()
    }

    pub fn work_packages(&self) -> impl Iterator<Item = &WorkPackage> {
        self.work_packages.values()
    }

    pub fn work_packages_with_status(
        &self,
        status: WorkPackageStatus,
    ) -> impl Iterator<Item = &WorkPackage> {
        self.work_packages
            .values()
            .filter(move |wp| wp.status == status)
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// Last month covered by any work package; the worksheet horizon.
    pub fn max_month(&self) -> Month {
        self.work_packages
            .values()
            .map(|wp| wp.end_month)
            .max()
            .unwrap_or(0)
    }

    pub fn person_name(&self, id: PersonId) -> String {
        self.person(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn work_package_name(&self, id: WorkPackageId) -> String {
        self.work_package(id)
            .map(|wp| wp.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

impl WageLookup for Registry {
    fn wage(&self, person: PersonId) -> Option<f64> {
        self.person(person).map(|p| p.wage)
    }
}
