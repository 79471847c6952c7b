use crate::core::ledger::{AllocationLedger, PropagationSummary, ReferenceIssue};
use crate::core::registry::Registry;
use crate::domain::model::{
    CellInput, Month, PersonId, ReferenceKind, Segment, Totals, WorkPackageId,
};
use crate::domain::ports::Backend;
use crate::utils::error::{BudgetError, LedgerError, Result};

/// One editing session over a project budget: loaded wholesale from the
/// backend, edited in memory, saved wholesale.
pub struct BudgetSession<B: Backend> {
    backend: B,
    registry: Registry,
    ledger: AllocationLedger,
    saved: AllocationLedger,
}

impl<B: Backend> BudgetSession<B> {
    pub async fn open(backend: B) -> Result<Self> {
        tracing::debug!("Loading reference data and budget snapshot");
        let (persons, work_packages, project, snapshot) = tokio::try_join!(
            backend.persons(),
            backend.work_packages(),
            backend.project(),
            backend.load_snapshot(),
        )?;

        let registry = Registry::new(persons, work_packages, project)?;
        let ledger = AllocationLedger::import(&snapshot)?;

        for issue in ledger.verify(&registry) {
            tracing::warn!("Budget entry does not match reference data: {}", issue);
        }
        tracing::info!(
            "Loaded {} budget cells for {} people across {} work packages",
            ledger.len(),
            registry.persons().count(),
            registry.work_packages().count()
        );

        Ok(Self::from_parts(backend, registry, ledger))
    }

    pub fn from_parts(backend: B, registry: Registry, ledger: AllocationLedger) -> Self {
        Self {
            backend,
            registry,
            saved: ledger.clone(),
            ledger,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    pub fn is_dirty(&self) -> bool {
        self.ledger != self.saved
    }

    /// Like [`AllocationLedger::set_cell`], but also rejects ids that are not
    /// in the reference data.
    pub fn set_cell(
        &mut self,
        work_package: WorkPackageId,
        person: PersonId,
        month: Month,
        input: impl Into<CellInput>,
    ) -> Result<()> {
        let input = input.into();
        let result = match self.require_references(work_package, person) {
            Ok(()) => self
                .ledger
                .set_cell(work_package, person, month, input)
                .map_err(BudgetError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    "Set wp {} / person {} / month {} to {:?}",
                    work_package,
                    person,
                    month,
                    input
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected edit of wp {} / person {}: {}", work_package, person, e);
                Err(e)
            }
        }
    }

    pub fn propagate(
        &mut self,
        work_package: WorkPackageId,
        person: PersonId,
        from_month: Month,
        value: f64,
    ) -> Result<PropagationSummary> {
        match self
            .ledger
            .propagate(&self.registry, work_package, person, from_month, value)
        {
            Ok(summary) => {
                tracing::info!(
                    "Propagated {} for person {} in wp {} over {} months",
                    value,
                    person,
                    work_package,
                    summary.months.len()
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(
                    "Propagation from month {} reverted for wp {} / person {}: {}",
                    from_month,
                    work_package,
                    person,
                    e
                );
                Err(e.into())
            }
        }
    }

    pub fn totals(&self) -> Totals {
        self.ledger.compute_totals(&self.registry)
    }

    pub fn segments(&self, work_package: WorkPackageId, person: PersonId) -> Vec<Segment> {
        self.ledger.build_segments(work_package, person)
    }

    pub fn all_segments(&self) -> Vec<Segment> {
        self.ledger
            .pairs()
            .into_iter()
            .flat_map(|(wp, person)| self.ledger.build_segments(wp, person))
            .collect()
    }

    pub fn verify(&self) -> Vec<ReferenceIssue> {
        self.ledger.verify(&self.registry)
    }

    /// Writes the whole ledger back to the backend. Returns the number of
    /// entries written.
    pub async fn save(&mut self) -> Result<usize> {
        let snapshot = self.ledger.export();
        self.backend.save_snapshot(&snapshot).await?;
        self.saved = self.ledger.clone();
        tracing::info!("Saved {} budget entries", snapshot.len());
        Ok(snapshot.len())
    }

    fn require_references(&self, work_package: WorkPackageId, person: PersonId) -> Result<()> {
        if self.registry.work_package(work_package).is_none() {
            return Err(LedgerError::UnknownReference {
                kind: ReferenceKind::WorkPackage,
                id: work_package.0,
            }
            .into());
        }
        if self.registry.person(person).is_none() {
            return Err(LedgerError::UnknownReference {
                kind: ReferenceKind::Person,
                id: person.0,
            }
            .into());
        }
        Ok(())
    }
}
