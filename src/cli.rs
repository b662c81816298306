//! Command-line interface definitions for scancheck.
//!
//! Global options control verbosity and error formatting; subcommands cover
//! scanning, inspecting a roster, exporting a saved session, and writing a
//! starter config file.
//!
//! # Example
//!
//! ```bash
//! # Scan from a keyboard-wedge scanner, export when done (Ctrl+D / Ctrl+C)
//! scancheck scan --roster barcodes.xlsx --export scanned.csv
//!
//! # Replay decoder output with its own timestamps
//! scancheck scan --roster barcodes.csv --input frames.tsv --cooldown 500ms
//!
//! # Check what a roster file contains
//! scancheck roster barcodes.csv --preview 20
//!
//! # Export a saved session as JSON
//! scancheck export session.json --format json -o history.json
//!
//! # Write the default settings to the platform config file
//! scancheck config init
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::loader::HeaderPolicy;
use crate::output::ExportFormat;
use crate::validator::CooldownScope;

/// Barcode roster checker.
///
/// Validates each scanned barcode against an expected list, flags repeats
/// and unknown codes, and keeps an exportable history.
#[derive(Debug, Parser)]
#[command(name = "scancheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Path to a TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate scans against a roster
    Scan(ScanArgs),
    /// Load a roster file and show what it contains
    Roster(RosterArgs),
    /// Export the history of a saved session
    Export(ExportArgs),
    /// Create or locate the config file
    Config(ConfigArgs),
}

/// Match policy flags shared by several subcommands.
#[derive(Debug, Args, Clone, Copy, Default)]
pub struct MatchArgs {
    /// Compare codes ignoring letter case
    #[arg(long)]
    pub case_insensitive: bool,

    /// Treat leading zeros as insignificant (000123 == 123)
    #[arg(long)]
    pub strip_leading_zeros: bool,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Roster file (csv, tsv, txt, xlsx, xls, ods); first column holds barcodes
    #[arg(short, long, value_name = "FILE")]
    pub roster: Option<PathBuf>,

    /// Read scans from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Ignore repeat reads within this window (e.g. 2s, 500ms, 0 to disable)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub cooldown: Option<Duration>,

    /// Apply the cooldown per code or to all codes
    #[arg(long, value_enum, value_name = "SCOPE")]
    pub cooldown_scope: Option<CooldownScope>,

    #[command(flatten)]
    pub matching: MatchArgs,

    /// Header row handling for the roster file
    #[arg(long, value_enum, value_name = "POLICY")]
    pub header: Option<HeaderPolicy>,

    /// Drop decoded strings shorter than this as noise
    #[arg(long, value_name = "N")]
    pub min_length: Option<usize>,

    /// Write the history to this file when scanning ends
    #[arg(short, long, value_name = "FILE", conflicts_with = "auto_export")]
    pub export: Option<PathBuf>,

    /// Write the history to an automatically named file when scanning ends
    #[arg(long)]
    pub auto_export: bool,

    /// Export format
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Save the session when scanning ends
    #[arg(long, value_name = "FILE")]
    pub save_session: Option<PathBuf>,

    /// Continue a previously saved session
    #[arg(long, value_name = "FILE")]
    pub resume: Option<PathBuf>,

    /// Do not ring the terminal bell
    #[arg(long)]
    pub no_bell: bool,

    /// Treat `:clear`, `:reload` and `:stats` lines as plain codes
    #[arg(long)]
    pub no_commands: bool,
}

/// Arguments for the roster subcommand.
#[derive(Debug, Args)]
pub struct RosterArgs {
    /// Roster file to inspect
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Number of codes to list
    #[arg(long, value_name = "N", default_value = "10")]
    pub preview: usize,

    /// Header row handling
    #[arg(long, value_enum, value_name = "POLICY")]
    pub header: Option<HeaderPolicy>,

    #[command(flatten)]
    pub matching: MatchArgs,
}

/// Arguments for the export subcommand.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Session file written by `scan --save-session`
    #[arg(value_name = "SESSION_FILE")]
    pub session: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Export format
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Roster to compute progress against (defaults to the one recorded in the session)
    #[arg(long, value_name = "FILE")]
    pub roster: Option<PathBuf>,
}

/// Arguments for the config subcommand.
///
/// The file acted on is `--config` when given, else the platform default.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// What to do with the config file
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config file actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Write the default settings to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

/// Parse a human-readable duration.
///
/// Supports suffixes `ms`, `s`, `m`. Numbers without a suffix are seconds.
///
/// # Examples
///
/// ```
/// use scancheck::cli::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid or negative
/// number, or an unknown suffix.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_lowercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let millis_per_unit = match suffix.as_str() {
        "ms" => 1.0,
        "" | "s" | "sec" => 1_000.0,
        "m" | "min" => 60_000.0,
        _ => return Err(format!("Unknown duration suffix: '{suffix}'")),
    };

    Ok(Duration::from_millis((num * millis_per_unit).round() as u64))
}
