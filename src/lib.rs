//! scancheck - Barcode Roster Checker
//!
//! Validates scanned barcodes against a roster of expected codes, flags
//! unknown and repeated scans, debounces repeated reads of the same label,
//! and keeps an exportable history of every recorded scan.

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod loader;
pub mod logging;
pub mod output;
pub mod scan;
pub mod session;
pub mod signal;
pub mod source;
pub mod validator;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::cli::{
    Cli, Commands, ConfigAction, ConfigArgs, ExportArgs, MatchArgs, RosterArgs, ScanArgs,
};
use crate::config::Config;
use crate::error::ExitCode;
use crate::feedback::{Feedback, TerminalFeedback};
use crate::loader::{load_roster, LoadOptions};
use crate::output::{default_export_name, export_to_file, write_export, ExportFormat};
use crate::scan::{ScanOptions, ScanReport, ScanRunner};
use crate::session::Session;
use crate::source::{LineSource, SystemClock};
use crate::validator::{MatchPolicy, Roster, ScanValidator, SharedValidator};

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns an error if configuration, roster, session or export files cannot
/// be read or written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    if cli.no_color {
        yansi::disable();
    }

    log::debug!("Log level: {}", logging::current_level_name());

    // `config init` must work before the file it creates exists
    let config_file = cli.config.as_deref();
    match cli.command {
        Commands::Scan(args) => handle_scan(args, Config::load(config_file)?, cli.quiet),
        Commands::Roster(args) => handle_roster(&args, &Config::load(config_file)?),
        Commands::Export(args) => handle_export(&args, &Config::load(config_file)?),
        Commands::Config(args) => handle_config(&args, config_file),
    }
}

/// Apply scan flags on top of the loaded configuration.
fn apply_scan_overrides(config: &mut Config, args: &ScanArgs) {
    if let Some(cooldown) = args.cooldown {
        config.cooldown_ms = cooldown.as_millis() as u64;
    }
    if let Some(scope) = args.cooldown_scope {
        config.cooldown_scope = scope;
    }
    apply_match_overrides(&mut config.matching, args.matching);
    if let Some(header) = args.header {
        config.header = header;
    }
    if let Some(min_length) = args.min_length {
        config.min_code_length = min_length;
    }
    if let Some(format) = args.format {
        config.export_format = format;
    }
    if args.no_bell {
        config.audio_cue = false;
    }
    if args.no_commands {
        config.console_commands = false;
    }
}

/// Flags can only switch a policy option on.
fn apply_match_overrides(policy: &mut MatchPolicy, args: MatchArgs) {
    policy.case_insensitive |= args.case_insensitive;
    policy.strip_leading_zeros |= args.strip_leading_zeros;
}

/// Exit code for a finished scan.
#[must_use]
pub fn scan_exit_code(report: &ScanReport) -> ExitCode {
    let progress = &report.progress;
    if report.interrupted {
        ExitCode::Interrupted
    } else if report.source_failed {
        ExitCode::GeneralError
    } else if progress.roster_size == 0 {
        if progress.counters.total() > 0 {
            ExitCode::NoRoster
        } else {
            ExitCode::Success
        }
    } else if progress.is_complete() {
        ExitCode::Success
    } else {
        ExitCode::Incomplete
    }
}

fn handle_scan(args: ScanArgs, mut config: Config, quiet: bool) -> Result<ExitCode> {
    apply_scan_overrides(&mut config, &args);

    let resumed = args
        .resume
        .as_deref()
        .map(Session::load)
        .transpose()
        .context("Failed to resume session")?;

    // A resumed session keeps the policy its history was recorded with
    if let Some(session) = &resumed {
        if session.policy != config.matching {
            log::warn!("Using the match policy stored in the resumed session");
        }
        config.matching = session.policy;
    }

    let roster_path = args
        .roster
        .clone()
        .or_else(|| resumed.as_ref().and_then(|s| s.roster_path.clone()));

    let load_options = LoadOptions {
        header: config.header,
        format: None,
    };
    let validator_config = config.validator_config();

    let feedback = TerminalFeedback::new(quiet, config.audio_cue);
    let roster = match roster_path.as_deref() {
        Some(path) => match load_roster(path, &load_options) {
            Ok(loaded) => loaded.into_roster(config.matching),
            Err(e) => {
                log::error!("Failed to load roster {}: {e}", path.display());
                feedback.on_roster_error(&e.to_string(), false);
                Roster::empty(config.matching)
            }
        },
        None => {
            log::warn!("No roster given; every scan will be reported as invalid");
            Roster::empty(config.matching)
        }
    };
    feedback.on_roster_loaded(roster.len());

    let validator = match resumed {
        Some(session) => ScanValidator::restore(validator_config, roster, session.records),
        None => ScanValidator::with_roster(validator_config, roster),
    };
    let shared = SharedValidator::new(validator);

    let shutdown = signal::install_handler()?;
    let options = ScanOptions {
        noise: config.noise_filter(),
        roster_path: roster_path.clone(),
        load_options,
    };
    let runner = ScanRunner::new(shared.clone(), &feedback, options).with_shutdown(shutdown);

    let report = match args.input.as_deref() {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open scan input: {}", path.display()))?;
            let source = LineSource::new(BufReader::new(file), SystemClock)
                .with_commands(config.console_commands);
            runner.run_threaded(source)
        }
        None => {
            if !quiet {
                eprintln!("Scan barcodes now. Ctrl+D or Ctrl+C to finish.");
            }
            let source = LineSource::new(BufReader::new(io::stdin()), SystemClock)
                .with_commands(config.console_commands);
            runner.run_threaded(source)
        }
    };

    let history = shared.history();

    let export_path = match (&args.export, args.auto_export) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(auto_export_path(&config, config.export_format)),
        (None, false) => None,
    };
    if let Some(path) = export_path {
        export_to_file(&path, config.export_format, &history, report.progress)?;
        if !quiet {
            eprintln!("Exported {} records to {}", history.len(), path.display());
        }
    }

    if let Some(path) = &args.save_session {
        Session::new(roster_path, config.matching, history).save(path)?;
        if !quiet {
            eprintln!("Session saved to {}", path.display());
        }
    }

    Ok(scan_exit_code(&report))
}

fn handle_roster(args: &RosterArgs, config: &Config) -> Result<ExitCode> {
    let mut policy = config.matching;
    apply_match_overrides(&mut policy, args.matching);

    let options = LoadOptions {
        header: args.header.unwrap_or(config.header),
        format: None,
    };
    let loaded = load_roster(&args.path, &options)
        .with_context(|| format!("Failed to load roster: {}", args.path.display()))?;

    let rows_read = loaded.rows_read;
    let blank_cells = loaded.blank_cells;
    let header = loaded.header.clone();
    let listed = loaded.codes.len();
    let roster = loaded.into_roster(policy);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "File:         {}", args.path.display())?;
    writeln!(out, "Rows read:    {rows_read}")?;
    if let Some(header) = header {
        writeln!(out, "Header:       {header}")?;
    }
    writeln!(out, "Blank cells:  {blank_cells}")?;
    writeln!(out, "Codes listed: {listed}")?;
    writeln!(out, "Unique keys:  {}", roster.len())?;
    for key in roster.preview(args.preview) {
        writeln!(out, "  {key}")?;
    }
    if roster.len() > args.preview {
        writeln!(out, "  ... and {} more", roster.len() - args.preview)?;
    }
    Ok(ExitCode::Success)
}

fn handle_export(args: &ExportArgs, config: &Config) -> Result<ExitCode> {
    let session = Session::load(&args.session)?;
    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(format_from_extension))
        .unwrap_or(config.export_format);

    let roster = match args.roster.as_deref().or(session.roster_path.as_deref()) {
        Some(path) => {
            let options = LoadOptions {
                header: config.header,
                format: None,
            };
            match load_roster(path, &options) {
                Ok(loaded) => loaded.into_roster(session.policy),
                Err(e) => {
                    log::warn!("Progress computed without roster: {e}");
                    Roster::empty(session.policy)
                }
            }
        }
        None => Roster::empty(session.policy),
    };

    let validator = ScanValidator::restore(
        config.validator_config().with_policy(session.policy),
        roster,
        session.records,
    );
    let progress = validator.progress();
    let records = validator.history();

    match &args.output {
        Some(path) => export_to_file(path, format, records, progress)?,
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_export(&mut writer, format, records, progress)?;
            writer.flush()?;
        }
    }
    Ok(ExitCode::Success)
}

fn handle_config(args: &ConfigArgs, config_file: Option<&Path>) -> Result<ExitCode> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => Config::config_path().context("No platform config directory available")?,
    };
    match args.action {
        ConfigAction::Init { force } => {
            Config::init(&path, force)?;
            println!("Wrote default settings to {}", path.display());
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(ExitCode::Success)
}

/// Export format implied by an output file name.
fn format_from_extension(path: &Path) -> Option<ExportFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "csv" => Some(ExportFormat::Csv),
        "json" => Some(ExportFormat::Json),
        _ => None,
    }
}

/// Where `--auto-export` writes: a timestamped name in `export_dir`.
#[must_use]
pub fn auto_export_path(config: &Config, format: ExportFormat) -> PathBuf {
    let name = default_export_name(Local::now(), format);
    match &config.export_dir {
        Some(dir) => dir.join(name),
        None => name,
    }
}
