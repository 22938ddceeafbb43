//! Observability module
//!
//! Logging infrastructure for `auditrc` runs.

pub mod logging;

pub use logging::{LogFormat, init_logging};
