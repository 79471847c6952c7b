use crate::core::ledger::AllocationLedger;
use crate::domain::model::Totals;
use crate::domain::ports::WageLookup;

impl AllocationLedger {
    /// Money per person, per work package, per month and overall, where each
    /// cell is worth `fraction * wage`. People without a wage count as 0.
    pub fn compute_totals<W: WageLookup + ?Sized>(&self, wages: &W) -> Totals {
        let mut totals = Totals::default();
        for (key, fraction) in self.cells() {
            let amount = fraction * wages.wage(key.person).unwrap_or(0.0);
            *totals.person_totals.entry(key.person).or_default() += amount;
            *totals
                .work_package_totals
                .entry(key.work_package)
                .or_default() += amount;
            *totals.month_totals.entry(key.month).or_default() += amount;
            totals.grand_total += amount;
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use crate::core::ledger::AllocationLedger;
    use crate::domain::model::{PersonId, WorkPackageId};
    use std::collections::HashMap;

    const A: WorkPackageId = WorkPackageId(1);
    const B: WorkPackageId = WorkPackageId(2);

    #[test]
    fn test_half_time_for_three_months() {
        let mut ledger = AllocationLedger::new();
        for month in 1..=3 {
            ledger.set_cell(A, PersonId(1), month, 0.5).unwrap();
        }
        let wages = HashMap::from([(PersonId(1), 1000.0)]);

        let totals = ledger.compute_totals(&wages);
        assert_eq!(totals.person_totals[&PersonId(1)], 1500.0);
        assert_eq!(totals.work_package_totals[&A], 1500.0);
        assert_eq!(totals.month_totals[&2], 500.0);
        assert_eq!(totals.grand_total, 1500.0);
    }

    #[test]
    fn test_missing_wage_counts_as_zero() {
        let mut ledger = AllocationLedger::new();
        ledger.set_cell(A, PersonId(1), 1, 1.0).unwrap();
        ledger.set_cell(B, PersonId(2), 1, 0.25).unwrap();
        let wages = HashMap::from([(PersonId(1), 2000.0)]);

        let totals = ledger.compute_totals(&wages);
        assert_eq!(totals.person_totals[&PersonId(2)], 0.0);
        assert_eq!(totals.month_totals[&1], 2000.0);
        assert_eq!(totals.grand_total, 2000.0);
    }

    #[test]
    fn test_empty_ledger_has_no_totals() {
        let totals = AllocationLedger::new().compute_totals(&HashMap::<PersonId, f64>::new());
        assert!(totals.person_totals.is_empty());
        assert_eq!(totals.grand_total, 0.0);
    }
}
