use clap::Parser;
use planner_budget::core::report::{month_label, ReportBuilder, SNAPSHOT_FILE};
use planner_budget::domain::ports::{Backend, Storage};
use planner_budget::utils::error::ErrorSeverity;
use planner_budget::utils::logger;
use planner_budget::{
    ApiBackend, BudgetError, BudgetSession, CellInput, CliConfig, Command, FileBackend,
    LocalStorage, PersonId, Result, SourceConfig, WorkPackageId, WorksheetConfig,
};
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.worksheet_config() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, cli.log_json);
            fail(&e);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, config.logging.json);

    tracing::info!("Starting planner-budget");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match &config.source {
        SourceConfig::Api {
            endpoint,
            timeout_seconds,
            headers,
        } => {
            tracing::info!("📡 Using planner API at {}", endpoint);
            let backend = ApiBackend::new(endpoint).map(|backend| {
                let backend = backend.with_headers(headers.clone().unwrap_or_default());
                match timeout_seconds {
                    Some(seconds) => backend.with_timeout(Duration::from_secs(*seconds)),
                    None => backend,
                }
            });
            match backend {
                Ok(backend) => run(backend, &cli, &config).await,
                Err(e) => Err(e),
            }
        }
        SourceConfig::File { data_dir } => {
            tracing::info!("📁 Using backend exports in {}", data_dir);
            let backend = FileBackend::new(LocalStorage::new(data_dir));
            run(backend, &cli, &config).await
        }
    };

    if let Err(e) = result {
        fail(&e);
    }
}

fn fail(e: &BudgetError) -> ! {
    tracing::error!(
        "❌ planner-budget failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2, // 重試錯誤
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}

async fn run<B: Backend>(backend: B, cli: &CliConfig, config: &WorksheetConfig) -> Result<()> {
    let mut session = BudgetSession::open(backend).await?;

    match &cli.command {
        Command::Totals => print_totals(&session),
        Command::Segments {
            work_package,
            person,
        } => print_segments(&session, WorkPackageId(*work_package), PersonId(*person)),
        Command::Set {
            work_package,
            person,
            month,
            value,
            clear,
        } => {
            let input = match (value, clear) {
                (_, true) => CellInput::Clear,
                (Some(value), false) => CellInput::Fraction(*value),
                (None, false) => {
                    return Err(BudgetError::ConfigError {
                        message: "either --value or --clear is required".to_string(),
                    })
                }
            };
            session.set_cell(
                WorkPackageId(*work_package),
                PersonId(*person),
                *month,
                input,
            )?;
            let saved = session.save().await?;
            println!("✅ Cell updated, {} budget entries saved", saved);
        }
        Command::Propagate {
            work_package,
            person,
            from_month,
            value,
        } => {
            let summary = session.propagate(
                WorkPackageId(*work_package),
                PersonId(*person),
                *from_month,
                *value,
            )?;
            session.save().await?;
            match (summary.months.first(), summary.months.last()) {
                (Some(first), Some(last)) => {
                    println!("✅ Set {} for months {}..={}", summary.value, first, last)
                }
                _ => println!("ℹ️ Month {} is the last month of the work package", from_month),
            }
        }
        Command::Report { .. } => write_reports(&session, config).await?,
        Command::Check => {
            let issues = session.verify();
            if issues.is_empty() {
                println!("✅ All budget entries match the reference data");
            }
            for issue in issues {
                println!("⚠️ {}", issue);
            }
        }
    }

    Ok(())
}

fn print_totals<B: Backend>(session: &BudgetSession<B>) {
    let registry = session.registry();
    let totals = session.totals();
    let start = registry.project().map(|p| p.start_date);

    println!("👤 Person totals:");
    for (person, amount) in &totals.person_totals {
        println!("  {:<30} {:>12.2}", registry.person_name(*person), amount);
    }
    println!("📦 Work package totals:");
    for (wp, amount) in &totals.work_package_totals {
        println!("  {:<30} {:>12.2}", registry.work_package_name(*wp), amount);
    }
    println!("📅 Month totals:");
    for (month, amount) in &totals.month_totals {
        println!("  {:<30} {:>12.2}", month_label(start, *month), amount);
    }
    println!("Total project budget: {:.2}", totals.grand_total);
}

fn print_segments<B: Backend>(
    session: &BudgetSession<B>,
    work_package: WorkPackageId,
    person: PersonId,
) {
    let registry = session.registry();
    let start = registry.project().map(|p| p.start_date);
    println!(
        "{} / {}",
        registry.work_package_name(work_package),
        registry.person_name(person)
    );
    println!("  {:<10} {:>8} {:>6}", "Start", "Months", "PM");
    for segment in session.segments(work_package, person) {
        println!(
            "  {:<10} {:>8} {:>6}",
            month_label(start, segment.start_month),
            segment.duration,
            segment.fraction
        );
    }
}

async fn write_reports<B: Backend>(
    session: &BudgetSession<B>,
    config: &WorksheetConfig,
) -> Result<()> {
    let report = ReportBuilder::new(session.registry(), session.ledger())
        .include_closed(config.output.include_closed)
        .build()?;
    let storage = LocalStorage::new(&config.output.output_path);

    if config.wants_format("csv") {
        for (name, content) in report.files() {
            if name.ends_with(".csv") {
                storage.write_file(name, content.as_bytes()).await?;
            }
        }
    }
    if config.wants_format("json") {
        storage
            .write_file(SNAPSHOT_FILE, report.snapshot_json.as_bytes())
            .await?;
    }
    if config.wants_format("zip") {
        let bundle = report.to_zip()?;
        tracing::debug!("Writing ZIP bundle ({} bytes)", bundle.len());
        storage
            .write_file(&config.output.bundle_filename, &bundle)
            .await?;
    }

    tracing::info!("✅ Reports written");
    println!("📁 Reports saved to: {}", config.output.output_path);
    Ok(())
}
