pub mod toml_config;

pub use toml_config::{LoggingConfig, OutputConfig, SourceConfig, WorksheetConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "planner-budget")]
#[command(about = "Person-month budget worksheet for work-package planning")]
pub struct CliConfig {
    /// Path to the TOML worksheet configuration
    #[arg(short, long, default_value = "budget.toml")]
    pub config: String,

    /// Use the planner REST API at this URL instead of the configured source
    #[arg(long, conflicts_with = "data_dir")]
    pub api_endpoint: Option<String>,

    /// Use backend JSON exports in this directory instead of the configured source
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print budget totals per person, work package and month
    Totals,
    /// Print contiguous allocation segments for one work package and person
    Segments {
        #[arg(long)]
        work_package: u32,
        #[arg(long)]
        person: u32,
    },
    /// Set (or clear) one allocation cell and save
    Set {
        #[arg(long)]
        work_package: u32,
        #[arg(long)]
        person: u32,
        #[arg(long)]
        month: u32,
        #[arg(long, required_unless_present = "clear")]
        value: Option<f64>,
        #[arg(long, conflicts_with = "value")]
        clear: bool,
    },
    /// Copy a value into every later month of the work package and save
    Propagate {
        #[arg(long)]
        work_package: u32,
        #[arg(long)]
        person: u32,
        #[arg(long)]
        from_month: u32,
        #[arg(long)]
        value: f64,
    },
    /// Write worksheet, totals and segment reports
    Report {
        /// Override the configured output directory
        #[arg(long)]
        output: Option<String>,
    },
    /// List budget entries that do not match the reference data
    Check,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML file when it exists, applies command line overrides and
    /// validates the result.
    pub fn worksheet_config(&self) -> Result<WorksheetConfig> {
        let mut config = if std::path::Path::new(&self.config).exists() {
            WorksheetConfig::from_file(&self.config)?
        } else {
            tracing::debug!("{} not found, using defaults", self.config);
            WorksheetConfig::default()
        };

        if let Some(endpoint) = &self.api_endpoint {
            config.source = SourceConfig::Api {
                endpoint: endpoint.clone(),
                timeout_seconds: None,
                headers: None,
            };
        } else if let Some(data_dir) = &self.data_dir {
            config.source = SourceConfig::File {
                data_dir: data_dir.clone(),
            };
        }
        if let Command::Report {
            output: Some(output),
        } = &self.command
        {
            config.output.output_path = output.clone();
        }
        if self.log_json {
            config.logging.json = true;
        }

        config.validate()?;
        Ok(config)
    }
}
