//! Error types for `auditrc`
//!
//! Configuration loading and validation errors, plus the top-level error
//! that maps every failure to a Unix exit code.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `auditrc` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (parse failure, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `auditrc` operations.
///
/// Aggregates the domain errors and provides a unified interface for
/// error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum AuditRcError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AuditRcError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// Each variant names the offending field or file so startup failures can
/// be traced back to the exact line of the declaration. Loading is
/// all-or-nothing: none of these are retried or recovered.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Document parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path} ({n} issue(s))", n = .errors.len())]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Configuration file not found or unreadable
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Required field is missing from the document
    #[error("missing required field '{field}' at {location}")]
    MissingRequired {
        /// Name of the missing field
        field: String,
        /// Location in the document (e.g., "collect")
        location: String,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with the invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Environment variable referenced in the document is not set
    #[error("environment variable '{var}' not set (referenced at {location})")]
    EnvVarNotSet {
        /// Name of the environment variable
        var: String,
        /// Location in the document where it was referenced
        location: String,
    },
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "collect.targets[2]")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: IssueSeverity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
///
/// Distinct from the assertion [`Severity`](crate::config::schema::Severity)
/// declared in audit documents; this one grades the issues found while
/// checking such a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    /// Validation failure that prevents the configuration from being used
    Error,
    /// Potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `auditrc` operations.
pub type Result<T> = std::result::Result<T, AuditRcError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::SUCCESS, 0);
        assert_eq!(ExitCode::ERROR, 1);
        assert_eq!(ExitCode::CONFIG_ERROR, 2);
        assert_eq!(ExitCode::IO_ERROR, 3);
        assert_eq!(ExitCode::USAGE_ERROR, 64);
    }

    #[test]
    fn test_config_error_exit_code() {
        let err: AuditRcError = ConfigError::MissingFile {
            path: PathBuf::from("/test"),
        }
        .into();
        assert_eq!(err.exit_code(), ExitCode::CONFIG_ERROR);
    }

    #[test]
    fn test_io_error_exit_code() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: AuditRcError = io_err.into();
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn test_validation_issue_display() {
        let issue = ValidationIssue {
            path: "collect.targets".to_string(),
            message: "at least one target URL is required".to_string(),
            severity: IssueSeverity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: at least one target URL is required at collect.targets"
        );
    }

    #[test]
    fn test_validation_issue_warning_display() {
        let issue = ValidationIssue {
            path: "assertions.pwa".to_string(),
            message: "min_score is ignored when severity is off".to_string(),
            severity: IssueSeverity::Warning,
        };
        assert_eq!(
            issue.to_string(),
            "warning: min_score is ignored when severity is off at assertions.pwa"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::ParseError {
            path: PathBuf::from("auditrc.yaml"),
            line: Some(7),
            message: "unexpected token".to_string(),
        };
        assert!(err.to_string().contains("auditrc.yaml"));
        assert!(err.to_string().contains("unexpected token"));
    }

    #[test]
    fn test_config_error_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "collect.runs_per_target".to_string(),
            value: "0".to_string(),
            expected: "an integer of at least 1".to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("collect.runs_per_target"));
        assert!(rendered.contains("at least 1"));
    }

    #[test]
    fn test_validation_error_display_counts_issues() {
        let err = ConfigError::ValidationError {
            path: "auditrc.yaml".to_string(),
            errors: vec![
                ValidationIssue {
                    path: "collect.targets".to_string(),
                    message: "at least one target URL is required".to_string(),
                    severity: IssueSeverity::Error,
                },
                ValidationIssue {
                    path: "upload.target".to_string(),
                    message: "unknown upload target".to_string(),
                    severity: IssueSeverity::Error,
                },
            ],
        };
        assert!(err.to_string().contains("2 issue(s)"));
    }

    #[test]
    fn test_env_var_not_set_display() {
        let err = ConfigError::EnvVarNotSet {
            var: "STAGING_HOST".to_string(),
            location: "auditrc.yaml".to_string(),
        };
        assert!(err.to_string().contains("STAGING_HOST"));
        assert!(err.to_string().contains("auditrc.yaml"));
    }
}
