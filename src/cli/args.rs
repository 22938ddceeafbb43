//! CLI argument definitions
//!
//! All Clap derive structs for `auditrc` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Configuration front-end for a website audit runner.
#[derive(Parser, Debug)]
#[command(name = "auditrc", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "AUDITRC_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration files without handing them to the runner.
    Validate(ValidateArgs),

    /// Load a configuration and print its resolved form.
    Show(ShowArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Command Arguments
// ============================================================================

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Configuration file to load.
    pub config: PathBuf,

    /// Output format. JSON output is the shape the audit runner consumes.
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
