//! Show command handler
//!
//! Loads a configuration and prints its resolved form. The JSON output is
//! exactly the shape the audit runner consumes, so `show --format json`
//! doubles as the handoff artifact for runners that do not link the
//! library.

use crate::cli::args::{OutputFormat, ShowArgs};
use crate::config::loader::ConfigLoader;
use crate::config::schema::AuditConfig;
use crate::error::AuditRcError;

/// Load a configuration and print its resolved form.
///
/// # Errors
///
/// Returns a config error if loading or validation fails.
pub fn run(args: &ShowArgs) -> Result<(), AuditRcError> {
    let loader = ConfigLoader::with_defaults();
    let result = loader.load(&args.config)?;

    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&*result.config)?);
        }
        OutputFormat::Human => print_summary(&result.config),
    }

    Ok(())
}

fn print_summary(config: &AuditConfig) {
    println!("targets ({} runs each):", config.runs_per_target);
    for target in &config.targets {
        println!("  {target}");
    }

    if !config.assertions.is_empty() {
        println!("assertions:");
        for (category, assertion) in &config.assertions {
            match assertion.min_score {
                Some(score) => println!(
                    "  {:<16} {:<5} min_score {score}",
                    category.as_str(),
                    assertion.severity.as_str()
                ),
                None => println!(
                    "  {:<16} {}",
                    category.as_str(),
                    assertion.severity.as_str()
                ),
            }
        }
    }

    match config.upload_target {
        Some(target) => println!("upload: {target}"),
        None => println!("upload: (none)"),
    }
}
