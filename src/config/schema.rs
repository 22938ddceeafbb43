//! Configuration schema types
//!
//! This module defines two layers of types. The *document* types mirror the
//! on-disk declaration and deserialize permissively so that validation can
//! point at the exact field that is wrong. The *resolved* types are the
//! frozen [`AuditConfig`] handed to the audit runner once validation passed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Measurement runs performed per target when the document does not say.
pub const DEFAULT_RUNS_PER_TARGET: u32 = 3;

// ============================================================================
// Document Types
// ============================================================================

/// Root of an audit configuration document.
///
/// ```yaml
/// collect:
///   targets:
///     - http://localhost:8080
///   runs_per_target: 3
/// assertions:
///   performance: [warn, {min_score: 0.9}]
///   pwa: off
/// upload:
///   target: temporary-public-storage
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AuditDocument {
    /// What to audit: target URLs and run count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect: Option<CollectSection>,

    /// Pass/warn/fail policy per category, in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub assertions: IndexMap<String, AssertionRule>,

    /// Where the runner stores reports after a run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadSection>,
}

/// The `collect` section of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CollectSection {
    /// Pages to audit; order here is audit order.
    #[serde(default)]
    pub targets: Vec<String>,

    /// Repeated measurements per target. Signed so that a declared `-1`
    /// reaches validation instead of dying in serde with a type error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs_per_target: Option<i64>,
}

/// An assertion rule as written in the document.
///
/// Two well-formed shapes, mirroring the runner's own format:
///
/// ```yaml
/// pwa: off                             # bare severity keyword
/// performance: [warn, {min_score: 0.9}]  # severity plus options
/// ```
///
/// Anything else lands in `Other` and is rejected during validation with a
/// message naming the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssertionRule {
    /// Bare severity keyword (`off`, `warn`, `error`).
    Keyword(String),

    /// `[severity, options]` pair.
    Thresholded(String, AssertionOptions),

    /// Any other shape; invalid, kept so validation can describe it.
    Other(serde_yaml::Value),
}

/// Options attached to a thresholded assertion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssertionOptions {
    /// Minimum category score, in `[0, 1]`.
    #[serde(default, alias = "minScore", skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

/// The `upload` section of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct UploadSection {
    /// Upload destination keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

// ============================================================================
// Resolved Types
// ============================================================================

/// The validated, immutable configuration handed to the audit runner.
///
/// Created once at process start by the loader, frozen behind an `Arc`,
/// discarded at process exit. Target URLs are kept verbatim as declared;
/// they have already been checked to parse as http(s) URLs.
#[derive(Debug, Clone, Serialize)]
pub struct AuditConfig {
    /// Pages to audit, in audit order.
    pub targets: Vec<String>,

    /// Repeated measurements per target.
    pub runs_per_target: u32,

    /// Pass/warn/fail policy per category, in declaration order.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub assertions: IndexMap<Category, Assertion>,

    /// Report destination; `None` means the runner skips upload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_target: Option<UploadTarget>,
}

/// A quality category scored by the audit runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Page load and runtime performance.
    Performance,
    /// Accessibility of the rendered page.
    Accessibility,
    /// General web best practices.
    BestPractices,
    /// Search engine optimization.
    Seo,
    /// Progressive web app criteria.
    Pwa,
}

impl Category {
    /// All categories, in the runner's reporting order.
    pub const ALL: [Self; 5] = [
        Self::Performance,
        Self::Accessibility,
        Self::BestPractices,
        Self::Seo,
        Self::Pwa,
    ];

    /// Canonical name as it appears in documents and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Accessibility => "accessibility",
            Self::BestPractices => "best-practices",
            Self::Seo => "seo",
            Self::Pwa => "pwa",
        }
    }

    /// Parses an assertion key into a category.
    ///
    /// Accepts the bare category name, plus the `categories:` prefix the
    /// external runner's namespaced format uses (`categories:performance`).
    #[must_use]
    pub fn parse_key(key: &str) -> Option<Self> {
        let name = key.strip_prefix("categories:").unwrap_or(key);
        match name {
            "performance" => Some(Self::Performance),
            "accessibility" => Some(Self::Accessibility),
            "best-practices" => Some(Self::BestPractices),
            "seo" => Some(Self::Seo),
            "pwa" => Some(Self::Pwa),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an assertion: what a failing score does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Assertion is disabled.
    Off,
    /// Failing score is reported but does not fail the run.
    Warn,
    /// Failing score fails the run.
    Error,
}

impl Severity {
    /// Parses a severity keyword.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "off" => Some(Self::Off),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Keyword form as written in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the runner stores reports after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadTarget {
    /// Short-lived public report storage.
    TemporaryPublicStorage,
    /// Local filesystem.
    Filesystem,
    /// A self-hosted report server.
    Server,
}

impl UploadTarget {
    /// Parses an upload target keyword.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "temporary-public-storage" => Some(Self::TemporaryPublicStorage),
            "filesystem" => Some(Self::Filesystem),
            "server" => Some(Self::Server),
            _ => None,
        }
    }

    /// Keyword form as written in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TemporaryPublicStorage => "temporary-public-storage",
            Self::Filesystem => "filesystem",
            Self::Server => "server",
        }
    }
}

impl std::fmt::Display for UploadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved assertion: severity plus optional score threshold.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Assertion {
    /// What a failing score does to the run.
    pub severity: Severity,

    /// Minimum category score, in `[0, 1]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
}

// ============================================================================
// Document → Resolved Conversion
// ============================================================================

/// Parses a declared target into a URL, requiring an http(s) scheme.
///
/// Shared between validation (which reports all bad targets) and the build
/// step (which double-checks before freezing).
pub(crate) fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("not a valid URL ({e})"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("target must use the http or https scheme, got '{other}'")),
    }
}

impl AssertionRule {
    /// Resolves a rule into an [`Assertion`].
    ///
    /// # Errors
    ///
    /// Returns a description of the expected shape when the keyword is not a
    /// severity, the threshold is out of range, or the rule is malformed.
    pub fn resolve(&self) -> Result<Assertion, String> {
        match self {
            Self::Keyword(word) => Severity::parse(word)
                .map(|severity| Assertion {
                    severity,
                    min_score: None,
                })
                .ok_or_else(|| format!("a severity of off, warn, or error, got '{word}'")),
            Self::Thresholded(word, options) => {
                let severity = Severity::parse(word)
                    .ok_or_else(|| format!("a severity of off, warn, or error, got '{word}'"))?;
                if let Some(score) = options.min_score {
                    if !(0.0..=1.0).contains(&score) {
                        return Err(format!("min_score between 0.0 and 1.0, got {score}"));
                    }
                }
                Ok(Assertion {
                    severity,
                    min_score: options.min_score,
                })
            }
            Self::Other(_) => {
                Err("\"off\", a severity keyword, or a [severity, {min_score}] pair".to_string())
            }
        }
    }
}

impl AuditConfig {
    /// Builds the resolved configuration from a parsed document.
    ///
    /// The loader runs full validation first, so on that path every error
    /// below is unreachable; the checks remain because this constructor is
    /// public API and must not freeze an invalid configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the offending field if the document
    /// violates the schema invariants.
    pub fn from_document(doc: &AuditDocument) -> Result<Self, ConfigError> {
        let collect = doc
            .collect
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "collect".to_string(),
                location: "document root".to_string(),
            })?;

        if collect.targets.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "targets".to_string(),
                location: "collect".to_string(),
            });
        }

        let mut targets = Vec::with_capacity(collect.targets.len());
        for (idx, raw) in collect.targets.iter().enumerate() {
            parse_target(raw).map_err(|expected| ConfigError::InvalidValue {
                field: format!("collect.targets[{idx}]"),
                value: raw.clone(),
                expected,
            })?;
            targets.push(raw.clone());
        }

        let runs_per_target = match collect.runs_per_target {
            None => DEFAULT_RUNS_PER_TARGET,
            Some(n) => u32::try_from(n)
                .ok()
                .filter(|runs| *runs >= 1)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "collect.runs_per_target".to_string(),
                    value: n.to_string(),
                    expected: "an integer of at least 1".to_string(),
                })?,
        };

        let mut assertions = IndexMap::with_capacity(doc.assertions.len());
        for (key, rule) in &doc.assertions {
            let category =
                Category::parse_key(key).ok_or_else(|| ConfigError::InvalidValue {
                    field: format!("assertions.{key}"),
                    value: key.clone(),
                    expected: "one of performance, accessibility, best-practices, seo, pwa"
                        .to_string(),
                })?;
            let assertion = rule.resolve().map_err(|expected| ConfigError::InvalidValue {
                field: format!("assertions.{key}"),
                value: key.clone(),
                expected,
            })?;
            if assertions.insert(category, assertion).is_some() {
                return Err(ConfigError::InvalidValue {
                    field: format!("assertions.{key}"),
                    value: key.clone(),
                    expected: format!("a single assertion for category '{category}'"),
                });
            }
        }

        let upload_target = match &doc.upload {
            None => None,
            Some(section) => {
                let raw = section
                    .target
                    .as_ref()
                    .ok_or_else(|| ConfigError::MissingRequired {
                        field: "target".to_string(),
                        location: "upload".to_string(),
                    })?;
                Some(
                    UploadTarget::parse(raw).ok_or_else(|| ConfigError::InvalidValue {
                        field: "upload.target".to_string(),
                        value: raw.clone(),
                        expected: "one of temporary-public-storage, filesystem, server"
                            .to_string(),
                    })?,
                )
            }
        };

        Ok(Self {
            targets,
            runs_per_target,
            assertions,
            upload_target,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_deserialize_full() {
        let yaml = r#"
collect:
  targets:
    - http://localhost:8080
    - http://localhost:8080/about/
  runs_per_target: 3

assertions:
  performance: [warn, {min_score: 0.9}]
  accessibility: [error, {min_score: 0.95}]
  pwa: off

upload:
  target: temporary-public-storage
"#;

        let doc: AuditDocument = serde_yaml::from_str(yaml).unwrap();
        let collect = doc.collect.as_ref().unwrap();
        assert_eq!(collect.targets.len(), 2);
        assert_eq!(collect.runs_per_target, Some(3));
        assert_eq!(doc.assertions.len(), 3);
        assert_eq!(
            doc.upload.unwrap().target.as_deref(),
            Some("temporary-public-storage")
        );
    }

    #[test]
    fn test_document_deserialize_json() {
        let json = r#"{
            "collect": {"targets": ["http://localhost:8080"], "runs_per_target": 3},
            "assertions": {"performance": ["warn", {"min_score": 0.9}]},
            "upload": {"target": "temporary-public-storage"}
        }"#;

        let doc: AuditDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.collect.unwrap().targets, vec!["http://localhost:8080"]);
        assert!(matches!(
            doc.assertions.get("performance"),
            Some(AssertionRule::Thresholded(_, _))
        ));
    }

    #[test]
    fn test_assertion_rule_keyword_off() {
        // Unquoted `off` must come through as a keyword, not a boolean.
        let rule: AssertionRule = serde_yaml::from_str("off").unwrap();
        match rule {
            AssertionRule::Keyword(word) => assert_eq!(word, "off"),
            other => panic!("expected keyword rule, got {other:?}"),
        }
    }

    #[test]
    fn test_assertion_rule_thresholded() {
        let rule: AssertionRule = serde_yaml::from_str("[warn, {min_score: 0.9}]").unwrap();
        match rule {
            AssertionRule::Thresholded(word, options) => {
                assert_eq!(word, "warn");
                assert!((options.min_score.unwrap() - 0.9).abs() < f64::EPSILON);
            }
            other => panic!("expected thresholded rule, got {other:?}"),
        }
    }

    #[test]
    fn test_assertion_rule_min_score_camel_alias() {
        let rule: AssertionRule = serde_yaml::from_str(r#"[warn, {minScore: 0.5}]"#).unwrap();
        match rule {
            AssertionRule::Thresholded(_, options) => {
                assert!((options.min_score.unwrap() - 0.5).abs() < f64::EPSILON);
            }
            other => panic!("expected thresholded rule, got {other:?}"),
        }
    }

    #[test]
    fn test_assertion_rule_malformed_falls_to_other() {
        let rule: AssertionRule = serde_yaml::from_str("{min_score: 0.9}").unwrap();
        assert!(matches!(rule, AssertionRule::Other(_)));
        assert!(rule.resolve().is_err());
    }

    #[test]
    fn test_category_parse_key() {
        assert_eq!(Category::parse_key("performance"), Some(Category::Performance));
        assert_eq!(
            Category::parse_key("best-practices"),
            Some(Category::BestPractices)
        );
        assert_eq!(
            Category::parse_key("categories:seo"),
            Some(Category::Seo)
        );
        assert_eq!(Category::parse_key("speed"), None);
    }

    #[test]
    fn test_category_roundtrip_names() {
        for category in Category::ALL {
            assert_eq!(Category::parse_key(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("off"), Some(Severity::Off));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warn));
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("fatal"), None);
        assert_eq!(Severity::parse("Off"), None);
    }

    #[test]
    fn test_upload_target_parse() {
        assert_eq!(
            UploadTarget::parse("temporary-public-storage"),
            Some(UploadTarget::TemporaryPublicStorage)
        );
        assert_eq!(UploadTarget::parse("filesystem"), Some(UploadTarget::Filesystem));
        assert_eq!(UploadTarget::parse("server"), Some(UploadTarget::Server));
        assert_eq!(UploadTarget::parse("ftp-drop"), None);
    }

    #[test]
    fn test_parse_target_schemes() {
        assert!(parse_target("http://localhost:8080").is_ok());
        assert!(parse_target("https://example.com/cv/").is_ok());
        assert!(parse_target("ftp://example.com").is_err());
        assert!(parse_target("not a url").is_err());
    }

    #[test]
    fn test_from_document_minimal() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets:
    - http://localhost:8080
",
        )
        .unwrap();

        let config = AuditConfig::from_document(&doc).unwrap();
        assert_eq!(config.targets, vec!["http://localhost:8080"]);
        assert_eq!(config.runs_per_target, DEFAULT_RUNS_PER_TARGET);
        assert!(config.assertions.is_empty());
        assert!(config.upload_target.is_none());
    }

    #[test]
    fn test_from_document_missing_collect() {
        let doc: AuditDocument = serde_yaml::from_str("assertions: {}").unwrap();
        let err = AuditConfig::from_document(&doc).unwrap_err();
        match err {
            ConfigError::MissingRequired { field, .. } => assert_eq!(field, "collect"),
            other => panic!("expected MissingRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_from_document_zero_runs_rejected() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080]
  runs_per_target: 0
",
        )
        .unwrap();

        let err = AuditConfig::from_document(&doc).unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => {
                assert_eq!(field, "collect.runs_per_target");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_from_document_negative_runs_rejected() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080]
  runs_per_target: -2
",
        )
        .unwrap();

        assert!(AuditConfig::from_document(&doc).is_err());
    }

    #[test]
    fn test_from_document_preserves_assertion_order() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080]
assertions:
  seo: [warn, {min_score: 0.9}]
  performance: [warn, {min_score: 0.9}]
  accessibility: off
",
        )
        .unwrap();

        let config = AuditConfig::from_document(&doc).unwrap();
        let order: Vec<Category> = config.assertions.keys().copied().collect();
        assert_eq!(
            order,
            vec![Category::Seo, Category::Performance, Category::Accessibility]
        );
    }

    #[test]
    fn test_from_document_prefixed_key_collides_with_bare() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080]
assertions:
  performance: off
  categories:performance: [warn, {min_score: 0.9}]
",
        )
        .unwrap();

        let err = AuditConfig::from_document(&doc).unwrap_err();
        assert!(err.to_string().contains("single assertion"));
    }

    #[test]
    fn test_from_document_targets_kept_verbatim() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080, https://example.com/cv]
",
        )
        .unwrap();

        let config = AuditConfig::from_document(&doc).unwrap();
        // No trailing-slash normalization; the runner gets what was declared.
        assert_eq!(
            config.targets,
            vec!["http://localhost:8080", "https://example.com/cv"]
        );
    }

    #[test]
    fn test_audit_config_serializes_for_handoff() {
        let doc: AuditDocument = serde_yaml::from_str(
            r"
collect:
  targets: [http://localhost:8080]
  runs_per_target: 3
assertions:
  performance: [warn, {min_score: 0.9}]
upload:
  target: temporary-public-storage
",
        )
        .unwrap();

        let config = AuditConfig::from_document(&doc).unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["targets"][0], "http://localhost:8080");
        assert_eq!(json["runs_per_target"], 3);
        assert_eq!(json["assertions"]["performance"]["severity"], "warn");
        assert_eq!(json["upload_target"], "temporary-public-storage");
    }
}
