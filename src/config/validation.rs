//! Configuration validation
//!
//! Schema and semantic validation for audit configuration documents,
//! performed on the deserialized [`AuditDocument`] before the resolved
//! configuration is built.
//!
//! Validation collects ALL errors (doesn't stop at first) to provide
//! comprehensive feedback to users.

use std::collections::HashSet;

use crate::config::loader::ConfigLimits;
use crate::config::schema::{
    AssertionRule, AuditDocument, Category, Severity, UploadTarget, parse_target,
};
use crate::error::{IssueSeverity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
///
/// Walks an [`AuditDocument`] and records an issue for every field that
/// violates the schema, with a path pointing at the field.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a document and returns the result.
    ///
    /// This method collects all errors and warnings rather than stopping
    /// at the first issue.
    pub fn validate(&mut self, doc: &AuditDocument, limits: &ConfigLimits) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_collect(doc, limits);
        self.validate_assertions(doc);
        self.validate_upload(doc);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Collect Section
    // ========================================================================

    fn validate_collect(&mut self, doc: &AuditDocument, limits: &ConfigLimits) {
        let Some(collect) = &doc.collect else {
            self.add_error(
                "collect",
                "collect section with at least one target is required",
            );
            return;
        };

        if collect.targets.is_empty() {
            self.add_error("collect.targets", "at least one target URL is required");
        }

        if collect.targets.len() > limits.max_targets {
            self.add_error(
                "collect.targets",
                &format!(
                    "too many targets: {} (maximum: {}). \
                     Set AUDITRC_MAX_TARGETS to increase the limit.",
                    collect.targets.len(),
                    limits.max_targets
                ),
            );
        }

        let mut seen = HashSet::new();
        for (idx, raw) in collect.targets.iter().enumerate() {
            let path = format!("collect.targets[{idx}]");

            if let Err(reason) = parse_target(raw) {
                self.add_error(&path, &reason);
            }

            if !seen.insert(raw.as_str()) {
                self.add_warning(&path, &format!("duplicate target URL '{raw}'"));
            }
        }

        if let Some(runs) = collect.runs_per_target {
            if runs < 1 {
                self.add_error(
                    "collect.runs_per_target",
                    &format!("must be at least 1, got {runs}"),
                );
            } else if runs > limits.max_runs_per_target {
                self.add_error(
                    "collect.runs_per_target",
                    &format!(
                        "too many runs per target: {runs} (maximum: {}). \
                         Set AUDITRC_MAX_RUNS_PER_TARGET to increase the limit.",
                        limits.max_runs_per_target
                    ),
                );
            }
        }
    }

    // ========================================================================
    // Assertions
    // ========================================================================

    fn validate_assertions(&mut self, doc: &AuditDocument) {
        let mut seen: HashSet<Category> = HashSet::new();

        for (key, rule) in &doc.assertions {
            let path = format!("assertions.{key}");

            let category = Category::parse_key(key);
            match category {
                None => {
                    self.add_error(
                        &path,
                        &format!(
                            "unknown category '{key}'. Valid categories: \
                             performance, accessibility, best-practices, seo, pwa"
                        ),
                    );
                }
                Some(category) => {
                    if !seen.insert(category) {
                        self.add_error(
                            &path,
                            &format!("duplicate assertion for category '{category}'"),
                        );
                    }
                }
            }

            self.validate_rule(rule, &path);
        }
    }

    fn validate_rule(&mut self, rule: &AssertionRule, path: &str) {
        match rule {
            AssertionRule::Keyword(word) => {
                if Severity::parse(word).is_none() {
                    self.add_error(
                        path,
                        &format!("unrecognized severity '{word}'. Expected off, warn, or error"),
                    );
                }
            }
            AssertionRule::Thresholded(word, options) => {
                let severity = Severity::parse(word);
                if severity.is_none() {
                    self.add_error(
                        path,
                        &format!("unrecognized severity '{word}'. Expected off, warn, or error"),
                    );
                }

                match options.min_score {
                    Some(score) => {
                        if !(0.0..=1.0).contains(&score) {
                            self.add_error(
                                &format!("{path}.min_score"),
                                &format!("must be between 0.0 and 1.0, got {score}"),
                            );
                        } else if severity == Some(Severity::Off) {
                            self.add_warning(path, "min_score is ignored when severity is off");
                        }
                    }
                    None => {
                        if matches!(severity, Some(Severity::Warn | Severity::Error)) {
                            self.add_warning(path, "no min_score given; assertion has no effect");
                        }
                    }
                }
            }
            AssertionRule::Other(_) => {
                self.add_error(
                    path,
                    "expected \"off\", a severity keyword, or a [severity, {min_score}] pair",
                );
            }
        }
    }

    // ========================================================================
    // Upload Section
    // ========================================================================

    fn validate_upload(&mut self, doc: &AuditDocument) {
        let Some(upload) = &doc.upload else {
            return;
        };

        match &upload.target {
            None => {
                self.add_error(
                    "upload.target",
                    "upload target is required when the upload section is present",
                );
            }
            Some(raw) => {
                if UploadTarget::parse(raw).is_none() {
                    self.add_error(
                        "upload.target",
                        &format!(
                            "unknown upload target '{raw}'. Valid targets: \
                             temporary-public-storage, filesystem, server"
                        ),
                    );
                }
            }
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: IssueSeverity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: IssueSeverity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
