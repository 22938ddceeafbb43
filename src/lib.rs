//! `auditrc` - Configuration front-end for a website audit runner
//!
//! This library loads declarative audit configurations (which URLs to
//! audit, how many runs, assertion thresholds, report upload destination),
//! validates them, and produces the frozen [`config::schema::AuditConfig`]
//! the external audit runner consumes.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
