use crate::core::ledger::AllocationLedger;
use crate::core::registry::Registry;
use crate::domain::model::{Month, Segment, WorkPackage, WorkPackageStatus};
use crate::utils::error::{BudgetError, Result};
use chrono::{Months, NaiveDate};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const WORKSHEET_FILE: &str = "worksheet.csv";
pub const TOTALS_FILE: &str = "totals.csv";
pub const SEGMENTS_FILE: &str = "segments.csv";
pub const SNAPSHOT_FILE: &str = "budget.json";

/// Calendar date of the first day of `month`, counting the project start
/// month as 1.
pub fn month_start_date(project_start: NaiveDate, month: Month) -> Option<NaiveDate> {
    project_start.checked_add_months(Months::new(month.checked_sub(1)?))
}

/// Column label such as `Jan 25`; the bare month number without a start date.
pub fn month_label(project_start: Option<NaiveDate>, month: Month) -> String {
    project_start
        .and_then(|start| month_start_date(start, month))
        .map(|date| date.format("%b %y").to_string())
        .unwrap_or_else(|| month.to_string())
}

#[derive(Debug, Clone)]
pub struct BudgetReport {
    pub worksheet_csv: String,
    pub totals_csv: String,
    pub segments_csv: String,
    pub snapshot_json: String,
}

impl BudgetReport {
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            (WORKSHEET_FILE, self.worksheet_csv.as_str()),
            (TOTALS_FILE, self.totals_csv.as_str()),
            (SEGMENTS_FILE, self.segments_csv.as_str()),
            (SNAPSHOT_FILE, self.snapshot_json.as_str()),
        ]
    }

    pub fn to_zip(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for (name, content) in self.files() {
            zip.start_file::<_, ()>(name, FileOptions::default())?;
            zip.write_all(content.as_bytes())?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

pub struct ReportBuilder<'a> {
    registry: &'a Registry,
    ledger: &'a AllocationLedger,
    include_closed: bool,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(registry: &'a Registry, ledger: &'a AllocationLedger) -> Self {
        Self {
            registry,
            ledger,
            include_closed: true,
        }
    }

    pub fn include_closed(mut self, include_closed: bool) -> Self {
        self.include_closed = include_closed;
        self
    }

    pub fn build(&self) -> Result<BudgetReport> {
        Ok(BudgetReport {
            worksheet_csv: self.worksheet_csv()?,
            totals_csv: self.totals_csv()?,
            segments_csv: self.segments_csv()?,
            snapshot_json: serde_json::to_string_pretty(&self.ledger.export())?,
        })
    }

    fn project_start(&self) -> Option<NaiveDate> {
        self.registry.project().map(|p| p.start_date)
    }

    /// One row per assigned person of each work package, one column per month
    /// of the project horizon. Zero cells are left blank.
    pub fn worksheet_csv(&self) -> Result<String> {
        let max_month = self.registry.max_month();
        let mut wtr = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["Work package".to_string(), "Person".to_string()];
        header.extend((1..=max_month).map(|m| month_label(self.project_start(), m)));
        wtr.write_record(&header)?;

        let work_packages: Vec<&WorkPackage> = if self.include_closed {
            self.registry.work_packages().collect()
        } else {
            self.registry
                .work_packages_with_status(WorkPackageStatus::Active)
                .collect()
        };
        for wp in work_packages {
            for &person in &wp.assignees {
                let mut row = vec![wp.name.clone(), self.registry.person_name(person)];
                row.extend((1..=max_month).map(|month| {
                    let fraction = self.ledger.get(wp.id, person, month);
                    if fraction == 0.0 {
                        String::new()
                    } else {
                        fraction.to_string()
                    }
                }));
                wtr.write_record(&row)?;
            }
        }

        into_string(wtr)
    }

    pub fn totals_csv(&self) -> Result<String> {
        let totals = self.ledger.compute_totals(self.registry);
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["scope", "id", "name", "amount"])?;

        for (person, amount) in &totals.person_totals {
            wtr.write_record([
                "person".to_string(),
                person.to_string(),
                self.registry.person_name(*person),
                format!("{:.2}", amount),
            ])?;
        }
        for (wp, amount) in &totals.work_package_totals {
            wtr.write_record([
                "work_package".to_string(),
                wp.to_string(),
                self.registry.work_package_name(*wp),
                format!("{:.2}", amount),
            ])?;
        }
        for (month, amount) in &totals.month_totals {
            wtr.write_record([
                "month".to_string(),
                month.to_string(),
                month_label(self.project_start(), *month),
                format!("{:.2}", amount),
            ])?;
        }
        wtr.write_record([
            "total".to_string(),
            String::new(),
            "Total project budget".to_string(),
            format!("{:.2}", totals.grand_total),
        ])?;

        into_string(wtr)
    }

    pub fn segments_csv(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["work_package", "person", "start", "duration", "pm"])?;

        let segments: Vec<Segment> = self
            .ledger
            .pairs()
            .into_iter()
            .flat_map(|(wp, person)| self.ledger.build_segments(wp, person))
            .collect();
        for segment in segments {
            let start = self
                .project_start()
                .and_then(|start| month_start_date(start, segment.start_month))
                .map(|date| date.format("%d.%m.%Y").to_string())
                .unwrap_or_else(|| segment.start_month.to_string());
            wtr.write_record([
                self.registry.work_package_name(segment.work_package),
                self.registry.person_name(segment.person),
                start,
                segment.duration.to_string(),
                segment.fraction.to_string(),
            ])?;
        }

        into_string(wtr)
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| BudgetError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| BudgetError::ConfigError {
        message: format!("report is not valid UTF-8: {}", e),
    })
}
