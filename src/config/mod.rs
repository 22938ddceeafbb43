//! Configuration module
//!
//! Loads and validates audit configuration documents: which URLs to audit,
//! how many runs to perform, assertion thresholds, and the report upload
//! destination.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
