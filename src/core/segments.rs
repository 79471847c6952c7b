use crate::core::ledger::AllocationLedger;
use crate::domain::model::{PersonId, Segment, WorkPackageId};

impl AllocationLedger {
    /// Collapses the (work package, person) row into runs of consecutive
    /// months with an identical fraction, ordered by start month.
    pub fn build_segments(&self, work_package: WorkPackageId, person: PersonId) -> Vec<Segment> {
        let mut segments: Vec<Segment> = Vec::new();
        let row = self
            .cells()
            .filter(|(key, _)| key.work_package == work_package && key.person == person);

        for (key, fraction) in row {
            match segments.last_mut() {
                Some(last)
                    if last.end_month().checked_add(1) == Some(key.month)
                        && last.fraction == fraction =>
                {
                    last.duration += 1;
                }
                _ => segments.push(Segment {
                    work_package,
                    person,
                    start_month: key.month,
                    duration: 1,
                    fraction,
                }),
            }
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: WorkPackageId = WorkPackageId(1);
    const P1: PersonId = PersonId(1);

    #[test]
    fn test_single_run() {
        let mut ledger = AllocationLedger::new();
        for month in 1..=3 {
            ledger.set_cell(A, P1, month, 0.5).unwrap();
        }
        let segments = ledger.build_segments(A, P1);
        assert_eq!(
            segments,
            vec![Segment {
                work_package: A,
                person: P1,
                start_month: 1,
                duration: 3,
                fraction: 0.5,
            }]
        );
    }

    #[test]
    fn test_gap_and_value_change_split_runs() {
        let mut ledger = AllocationLedger::new();
        ledger.set_cell(A, P1, 2, 0.5).unwrap();
        ledger.set_cell(A, P1, 3, 0.5).unwrap();
        ledger.set_cell(A, P1, 4, 0.25).unwrap();
        ledger.set_cell(A, P1, 7, 0.25).unwrap();
        // Other rows are ignored.
        ledger.set_cell(A, PersonId(2), 5, 0.25).unwrap();
        ledger.set_cell(WorkPackageId(2), P1, 5, 0.25).unwrap();

        let runs: Vec<_> = ledger
            .build_segments(A, P1)
            .iter()
            .map(|s| (s.start_month, s.duration, s.fraction))
            .collect();
        assert_eq!(runs, vec![(2, 2, 0.5), (4, 1, 0.25), (7, 1, 0.25)]);
    }

    #[test]
    fn test_run_ending_at_last_representable_month() {
        let mut ledger = AllocationLedger::new();
        ledger.set_cell(A, P1, u32::MAX - 1, 0.5).unwrap();
        ledger.set_cell(A, P1, u32::MAX, 0.5).unwrap();

        let segments = ledger.build_segments(A, P1);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].end_month(), u32::MAX);
        let months: Vec<_> = segments[0].months().collect();
        assert_eq!(months, vec![u32::MAX - 1, u32::MAX]);

        let mut single = AllocationLedger::new();
        single.set_cell(A, P1, u32::MAX, 0.25).unwrap();
        let segments = single.build_segments(A, P1);
        assert_eq!(segments[0].months().collect::<Vec<_>>(), vec![u32::MAX]);
    }

    #[test]
    fn test_empty_row_has_no_segments() {
        assert!(AllocationLedger::new().build_segments(A, P1).is_empty());
    }
}
