//! Operator feedback for the scan loop.
//!
//! The scan loop reports every event through the [`Feedback`] trait. The
//! terminal implementation colors each outcome, keeps an indicatif bar over
//! the roster, and rings the bell as an audio cue: once for a valid scan,
//! twice for an invalid or duplicate one.

use std::io::Write;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use yansi::Paint;

use crate::source::Control;
use crate::validator::{Outcome, Progress, ScanRecord};

/// Receives scan loop events.
pub trait Feedback: Send + Sync {
    /// A roster was loaded (at startup or by `:reload`).
    fn on_roster_loaded(&self, size: usize);

    /// A roster could not be loaded. `kept_previous` is set when a `:reload`
    /// failed and the earlier roster stays active.
    fn on_roster_error(&self, message: &str, kept_previous: bool);

    /// A scan was recorded.
    fn on_scan(&self, record: &ScanRecord, progress: &Progress);

    /// A read was dropped by the cooldown window.
    fn on_suppressed(&self, _code: &str) {}

    /// History was cleared.
    fn on_cleared(&self, progress: &Progress);

    /// The operator asked for statistics.
    fn on_stats(&self, progress: &Progress);

    /// Scanning stopped.
    fn on_finish(&self, _progress: &Progress) {}
}

/// Feedback that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFeedback;

impl Feedback for NullFeedback {
    fn on_roster_loaded(&self, _size: usize) {}
    fn on_roster_error(&self, _message: &str, _kept_previous: bool) {}
    fn on_scan(&self, _record: &ScanRecord, _progress: &Progress) {}
    fn on_cleared(&self, _progress: &Progress) {}
    fn on_stats(&self, _progress: &Progress) {}
}

/// Colored terminal output with a completion bar.
pub struct TerminalFeedback {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
    bell: bool,
}

impl TerminalFeedback {
    /// Create terminal feedback.
    ///
    /// With `quiet` nothing is drawn; `bell` controls the audio cue.
    #[must_use]
    pub fn new(quiet: bool, bell: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
            bell,
        }
    }

    fn create_bar(len: u64) -> ProgressBar {
        let bar = ProgressBar::with_draw_target(Some(len), ProgressDrawTarget::stderr());
        let style = ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:30.green/white}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_prefix("Roster");
        bar
    }

    fn println(&self, line: String) {
        if self.quiet {
            return;
        }
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        match guard.as_ref() {
            Some(bar) => bar.println(line),
            None => eprintln!("{line}"),
        }
    }

    fn update_bar(&self, progress: &Progress) {
        let guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(bar) = guard.as_ref() {
            bar.set_length(progress.roster_size as u64);
            bar.set_position(progress.scanned as u64);
            bar.set_message(format!(
                "{} invalid, {} duplicate",
                progress.counters.invalid, progress.counters.duplicate
            ));
        }
    }

    fn ring(&self, outcome: Outcome) {
        if !self.bell || self.quiet {
            return;
        }
        let cue = if outcome.is_success() { "\x07" } else { "\x07\x07" };
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(cue.as_bytes());
        let _ = stderr.flush();
    }

    fn roster_error_line(message: &str, kept_previous: bool) -> String {
        if kept_previous {
            format!(
                "{} {message} (keeping previous roster)",
                "Reload failed:".red().bold()
            )
        } else {
            format!(
                "{} {message} (every scan will be invalid)",
                "Roster not loaded:".red().bold()
            )
        }
    }

    fn summary_line(progress: &Progress) -> String {
        format!(
            "{} valid, {} invalid, {} duplicate | {}/{} scanned ({:.1}%), {} remaining",
            progress.counters.valid,
            progress.counters.invalid,
            progress.counters.duplicate,
            progress.scanned,
            progress.roster_size,
            progress.completion_percent(),
            progress.remaining
        )
    }
}

impl Feedback for TerminalFeedback {
    fn on_roster_loaded(&self, size: usize) {
        if self.quiet {
            return;
        }
        {
            let mut guard = self.bar.lock().unwrap_or_else(|p| p.into_inner());
            match guard.as_ref() {
                Some(bar) => bar.set_length(size as u64),
                None => *guard = Some(Self::create_bar(size as u64)),
            }
        }
        self.println(format!("{} {size} expected barcodes", "Roster:".bold()));
    }

    fn on_roster_error(&self, message: &str, kept_previous: bool) {
        self.println(Self::roster_error_line(message, kept_previous));
    }

    fn on_scan(&self, record: &ScanRecord, progress: &Progress) {
        let label = match record.outcome {
            Outcome::Valid => "VALID".green().bold(),
            Outcome::Invalid => "INVALID".red().bold(),
            Outcome::Duplicate => "DUPLICATE".yellow().bold(),
        };
        self.println(format!(
            "{label:<9} {} {}",
            record.barcode,
            record.timestamp.format("%H:%M:%S").dim()
        ));
        self.update_bar(progress);
        self.ring(record.outcome);
    }

    fn on_suppressed(&self, code: &str) {
        log::trace!("Cooldown dropped {code}");
    }

    fn on_cleared(&self, progress: &Progress) {
        self.println(format!("{}", "History cleared".cyan()));
        self.update_bar(progress);
    }

    fn on_stats(&self, progress: &Progress) {
        self.println(Self::summary_line(progress));
    }

    fn on_finish(&self, progress: &Progress) {
        let bar = self
            .bar
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        if !self.quiet {
            eprintln!("{}", Self::summary_line(progress));
        }
    }
}

/// One-word label used in logs and status lines.
#[must_use]
pub fn control_label(control: Control) -> &'static str {
    match control {
        Control::ClearHistory => "clear",
        Control::ReloadRoster => "reload",
        Control::Stats => "stats",
    }
}
