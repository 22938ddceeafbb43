//! Validate command handler
//!
//! Loads and validates configuration files without handing them to the
//! runner. Validation issues are reported with the field path that caused
//! them; the first failing file aborts the run.

use std::path::Path;

use crate::cli::args::{OutputFormat, ValidateArgs};
use crate::config::loader::{ConfigLoader, LoadWarning};
use crate::error::{AuditRcError, ConfigError, IssueSeverity, ValidationIssue};

/// Validate configuration files.
///
/// # Errors
///
/// Returns an I/O error if any file does not exist, or a config error if
/// loading or validation fails. With `--strict`, warnings fail too.
pub fn run(args: &ValidateArgs) -> Result<(), AuditRcError> {
    let loader = ConfigLoader::with_defaults();

    for path in &args.files {
        if !path.exists() {
            return Err(AuditRcError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }
        tracing::info!(file = %path.display(), "validating configuration");

        match loader.load(path) {
            Ok(result) => {
                for warning in &result.warnings {
                    tracing::warn!(
                        location = warning.location.as_deref().unwrap_or("<unknown>"),
                        "{}",
                        warning.message
                    );
                }

                if args.strict && !result.warnings.is_empty() {
                    let err = ConfigError::ValidationError {
                        path: path.display().to_string(),
                        errors: result.warnings.iter().map(warning_to_issue).collect(),
                    };
                    report_failure(args.format, path, &err);
                    return Err(err.into());
                }

                report_success(args.format, path, &result.warnings);
            }
            Err(err) => {
                report_failure(args.format, path, &err);
                return Err(err.into());
            }
        }
    }

    Ok(())
}

fn report_success(format: OutputFormat, path: &Path, warnings: &[LoadWarning]) {
    match format {
        OutputFormat::Human => {
            tracing::info!(file = %path.display(), "configuration valid");
        }
        OutputFormat::Json => {
            let warnings: Vec<serde_json::Value> = warnings
                .iter()
                .map(|w| {
                    serde_json::json!({
                        "message": w.message,
                        "location": w.location,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "file": path.display().to_string(),
                    "valid": true,
                    "warnings": warnings,
                })
            );
        }
    }
}

fn report_failure(format: OutputFormat, path: &Path, err: &ConfigError) {
    match format {
        OutputFormat::Human => {
            if let ConfigError::ValidationError { errors, .. } = err {
                for issue in errors {
                    eprintln!("{issue}");
                }
            }
        }
        OutputFormat::Json => {
            let errors = match err {
                ConfigError::ValidationError { errors, .. } => {
                    serde_json::to_value(errors).unwrap_or_default()
                }
                other => serde_json::json!([{ "message": other.to_string() }]),
            };
            println!(
                "{}",
                serde_json::json!({
                    "file": path.display().to_string(),
                    "valid": false,
                    "errors": errors,
                })
            );
        }
    }
}

fn warning_to_issue(warning: &LoadWarning) -> ValidationIssue {
    ValidationIssue {
        path: warning.location.clone().unwrap_or_default(),
        message: warning.message.clone(),
        severity: IssueSeverity::Warning,
    }
}
