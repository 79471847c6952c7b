use crate::utils::error::{BudgetError, Result};
use crate::utils::validation::{
    validate_directory, validate_endpoint, validate_file_name, validate_formats, validate_timeout,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const VALID_OUTPUT_FORMATS: [&str; 3] = ["csv", "json", "zip"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorksheetConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where reference data and the budget snapshot come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Api {
        endpoint: String,
        timeout_seconds: Option<u64>,
        headers: Option<HashMap<String, String>>,
    },
    File {
        data_dir: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::File {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub bundle_filename: String,
    pub include_closed: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            formats: vec!["csv".to_string(), "zip".to_string()],
            bundle_filename: "budget_report.zip".to_string(),
            include_closed: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

impl WorksheetConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BudgetError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BudgetError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${PLANNER_TOKEN})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| BudgetError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn wants_format(&self, format: &str) -> bool {
        self.output.formats.iter().any(|f| f == format)
    }
}

impl Validate for WorksheetConfig {
    fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Api {
                endpoint,
                timeout_seconds,
                ..
            } => {
                validate_endpoint("source.endpoint", endpoint)?;
                if let Some(timeout) = timeout_seconds {
                    validate_timeout("source.timeout_seconds", *timeout)?;
                }
            }
            SourceConfig::File { data_dir } => validate_directory("source.data_dir", data_dir)?,
        }

        validate_directory("output.output_path", &self.output.output_path)?;
        validate_file_name("output.bundle_filename", &self.output.bundle_filename)?;
        validate_formats("output.formats", &self.output.formats, &VALID_OUTPUT_FORMATS)
    }
}
