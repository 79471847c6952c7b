use crate::utils::error::{BudgetError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Longest request timeout accepted for the planner API, in seconds.
pub const MAX_TIMEOUT_SECONDS: u64 = 600;

fn invalid(field: &str, value: impl Into<String>, reason: impl Into<String>) -> BudgetError {
    BudgetError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.into(),
        reason: reason.into(),
    }
}

/// The planner API base URL: http(s) with a host.
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(invalid(field, endpoint, "planner API endpoint is required for an api source"));
    }
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("not a valid planner API URL: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            endpoint,
            format!("planner API must be served over http or https, not {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, endpoint, "planner API endpoint has no host"));
    }
    Ok(())
}

pub fn validate_timeout(field: &str, seconds: u64) -> Result<()> {
    if !(1..=MAX_TIMEOUT_SECONDS).contains(&seconds) {
        return Err(invalid(
            field,
            seconds.to_string(),
            format!("request timeout must be between 1 and {} seconds", MAX_TIMEOUT_SECONDS),
        ));
    }
    Ok(())
}

/// Directory holding the JSON exports or receiving the reports.
pub fn validate_directory(field: &str, dir: &str) -> Result<()> {
    if dir.trim().is_empty() {
        return Err(invalid(field, dir, "directory must not be empty"));
    }
    if dir.contains('\0') {
        return Err(invalid(field, dir, "directory contains a NUL byte"));
    }
    Ok(())
}

/// A bare file name written inside the output directory.
pub fn validate_file_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid(field, name, "file name must not be empty"));
    }
    if name.contains(['/', '\\', '\0']) || name == "." || name == ".." {
        return Err(invalid(
            field,
            name,
            "must be a plain file name inside the output directory",
        ));
    }
    Ok(())
}

pub fn validate_formats(field: &str, formats: &[String], supported: &[&str]) -> Result<()> {
    if formats.is_empty() {
        return Err(invalid(field, "", "at least one report format is required"));
    }
    match formats.iter().find(|f| !supported.contains(&f.as_str())) {
        Some(format) => Err(invalid(
            field,
            format.clone(),
            format!("unsupported report format, expected one of: {}", supported.join(", ")),
        )),
        None => Ok(()),
    }
}
