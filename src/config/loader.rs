//! Configuration loader
//!
//! This module implements the configuration loading pipeline:
//! 1. File size check
//! 2. Read raw text (UTF-8, BOM tolerated)
//! 3. Environment variable expansion (pre-parse, on raw text)
//! 4. Parsing (JSON by extension, YAML otherwise)
//! 5. Deserialization to the typed document
//! 6. Validation
//! 7. Build of the resolved configuration
//! 8. Freeze with `Arc`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::schema::{AuditConfig, AuditDocument};
use crate::config::validation::Validator;
use crate::error::ConfigError;

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits for configuration size.
    pub config_limits: ConfigLimits,
}

/// Limits for configuration size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum number of targets.
    pub max_targets: usize,

    /// Maximum measurement runs per target.
    pub max_runs_per_target: i64,

    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_targets: env_or("AUDITRC_MAX_TARGETS", 100),
            max_runs_per_target: env_or("AUDITRC_MAX_RUNS_PER_TARGET", 100),
            max_config_size: env_or("AUDITRC_MAX_CONFIG_SIZE", 1024 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<AuditConfig>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
///
/// Handles the full loading pipeline from a document on disk to a frozen
/// [`AuditConfig`]. Loading is one-shot and synchronous; a failed load is
/// fatal to the process that needed the configuration.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file and returns the frozen configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - Parsing fails
    /// - A required environment variable is unset
    /// - Validation fails
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // File size limit
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size =
            usize::try_from(metadata.len()).unwrap_or(self.options.config_limits.max_config_size);
        if file_size > self.options.config_limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!(
                    "at most {} bytes",
                    self.options.config_limits.max_config_size
                ),
            });
        }

        // Stage 0: Read raw file content
        let raw_content = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        // Handle UTF-8 BOM
        let raw_content = raw_content.strip_prefix('\u{feff}').unwrap_or(&raw_content);

        // Stage 1: Environment variable substitution (before parsing)
        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw_content, path)?;
        warnings.extend(env_sub.warnings);

        // Stages 2-3: Parse and deserialize
        let document = parse_document(&substituted, path)?;

        // Stage 4: Validation
        let mut validator = Validator::new();
        let validation_result = validator.validate(&document, &self.options.config_limits);

        if validation_result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: validation_result.errors,
            });
        }

        for issue in validation_result.warnings {
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        // Stage 5: Build the resolved configuration
        let config = AuditConfig::from_document(&document)?;

        // Stage 6: Freeze
        Ok(LoadResult {
            config: Arc::new(config),
            warnings,
        })
    }
}

/// Parses raw text into a typed document.
///
/// `.json` files go through serde_json so parse errors carry JSON line
/// numbers; everything else is treated as YAML.
fn parse_document(raw: &str, path: &Path) -> Result<AuditDocument, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: Some(e.line()),
                message: e.to_string(),
            })?;

        if value.is_null() {
            return Err(empty_document(path));
        }

        serde_json::from_value(value).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: format!("failed to deserialize configuration: {e}"),
        })
    } else {
        let value: serde_yaml::Value =
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;

        if value.is_null() {
            return Err(empty_document(path));
        }

        serde_yaml::from_value(value).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: format!("failed to deserialize configuration: {e}"),
        })
    }
}

fn empty_document(path: &Path) -> ConfigError {
    ConfigError::ParseError {
        path: path.to_path_buf(),
        line: None,
        message: "configuration file is empty".to_string(),
    }
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// Pre-parse environment variable substitution.
///
/// Runs on raw text BEFORE parsing to preserve type inference.
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw document text.
    ///
    /// Supports:
    /// - `${VAR}` - expand to value (empty string if unset with warning)
    /// - `${VAR:-default}` - expand to default if unset
    /// - `${VAR:?message}` - fail if unset
    /// - `$$` - literal `$`
    fn substitute(&mut self, raw: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' {
                match chars.peek() {
                    Some('$') => {
                        // Escaped $$ -> literal $
                        chars.next();
                        result.push('$');
                    }
                    Some('{') => {
                        chars.next();
                        let (var_name, default, error_msg) = Self::parse_var_spec(&mut chars)?;

                        match std::env::var(&var_name) {
                            Ok(value) => result.push_str(&value),
                            Err(_) => {
                                if let Some(default_val) = default {
                                    result.push_str(&default_val);
                                } else if let Some(msg) = error_msg {
                                    return Err(ConfigError::EnvVarNotSet {
                                        var: var_name,
                                        location: msg,
                                    });
                                } else {
                                    // Missing var without default -> empty string with warning
                                    self.warnings.push(LoadWarning {
                                        message: format!(
                                            "Environment variable '{var_name}' is not set, using empty string"
                                        ),
                                        location: Some(source_path.display().to_string()),
                                    });
                                }
                            }
                        }
                    }
                    _ => result.push(c),
                }
            } else {
                result.push(c);
            }
        }

        Ok(result)
    }

    /// Parses a variable specification from `${...}`.
    ///
    /// Returns (`var_name`, `default_value`, `error_message`).
    fn parse_var_spec(
        chars: &mut std::iter::Peekable<std::str::Chars>,
    ) -> Result<(String, Option<String>, Option<String>), ConfigError> {
        let mut var_name = String::new();

        while let Some(&c) = chars.peek() {
            match c {
                '}' => {
                    chars.next();
                    return Ok((var_name, None, None));
                }
                ':' => {
                    chars.next();
                    match chars.peek() {
                        Some('-') => {
                            chars.next();
                            let default = Self::read_until_close(chars)?;
                            return Ok((var_name, Some(default), None));
                        }
                        Some('?') => {
                            chars.next();
                            let msg = Self::read_until_close(chars)?;
                            return Ok((var_name, None, Some(msg)));
                        }
                        _ => var_name.push(':'),
                    }
                }
                _ => {
                    chars.next();
                    var_name.push(c);
                }
            }
        }

        Err(ConfigError::ParseError {
            path: PathBuf::new(),
            line: None,
            message: format!("Unclosed environment variable reference: ${{{var_name}"),
        })
    }

    /// Reads content until closing `}`, handling nested braces.
    fn read_until_close(
        chars: &mut std::iter::Peekable<std::str::Chars>,
    ) -> Result<String, ConfigError> {
        let mut value = String::new();
        let mut depth = 1;

        for c in chars.by_ref() {
            match c {
                '{' => {
                    depth += 1;
                    value.push(c);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(value);
                    }
                    value.push(c);
                }
                _ => value.push(c),
            }
        }

        Err(ConfigError::ParseError {
            path: PathBuf::new(),
            line: None,
            message: "Unclosed environment variable reference".to_string(),
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
