//! The scan loop.
//!
//! [`ScanRunner`] pulls events from a [`BarcodeSource`], drops decoder noise,
//! submits each code to the shared validator with its frame's capture time,
//! and reports the result through [`Feedback`]. Operator commands clear the
//! history, reload the roster from disk, or print statistics.
//!
//! The loop stops when the source is exhausted, when the source fails, or
//! when the shutdown flag is raised. A blocking source (stdin) is read on a
//! background thread by [`ScanRunner::run_threaded`] so Ctrl+C is noticed
//! even while no input arrives.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::feedback::{control_label, Feedback};
use crate::loader::{load_roster, LoadOptions};
use crate::signal::ShutdownHandler;
use crate::source::{BarcodeSource, Control, Frame, NoiseFilter, SourceError, SourceEvent};
use crate::validator::{Progress, SharedValidator, Submission};

/// How often the threaded loop checks the shutdown flag while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Frames buffered between the reader thread and the loop.
const CHANNEL_CAPACITY: usize = 64;

/// Settings for a scan run.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Drops noise before submission.
    pub noise: NoiseFilter,
    /// Roster file read again on `:reload`.
    pub roster_path: Option<PathBuf>,
    /// How the roster file is parsed on reload.
    pub load_options: LoadOptions,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanReport {
    /// Frames pulled from the source.
    pub frames: usize,
    /// Codes dropped by the noise filter.
    pub filtered: usize,
    /// Codes dropped by the cooldown window.
    pub suppressed: usize,
    /// Stopped by the shutdown flag.
    pub interrupted: bool,
    /// Stopped because the source returned an error.
    pub source_failed: bool,
    /// Completion at the end of the run.
    pub progress: Progress,
}

/// Drives one scan session.
pub struct ScanRunner<'a> {
    validator: SharedValidator,
    feedback: &'a dyn Feedback,
    options: ScanOptions,
    shutdown: ShutdownHandler,
}

impl<'a> ScanRunner<'a> {
    /// Create a runner over `validator`.
    #[must_use]
    pub fn new(validator: SharedValidator, feedback: &'a dyn Feedback, options: ScanOptions) -> Self {
        Self {
            validator,
            feedback,
            options,
            shutdown: ShutdownHandler::new(),
        }
    }

    /// Stop when `shutdown` is raised.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: ShutdownHandler) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// The session this runner feeds.
    #[must_use]
    pub fn validator(&self) -> &SharedValidator {
        &self.validator
    }

    /// Pull from `source` on the current thread until it ends.
    pub fn run<S: BarcodeSource>(&self, mut source: S) -> ScanReport {
        let mut report = ScanReport::default();
        loop {
            if self.shutdown.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }
            match source.next_event() {
                Some(event) => {
                    if !self.dispatch(event, &mut report) {
                        break;
                    }
                }
                None => break,
            }
        }
        self.finish(report)
    }

    /// Pull from `source` on a background thread.
    ///
    /// The loop wakes up regularly to check the shutdown flag. On interrupt
    /// the reader thread is left blocked on its source and detached.
    pub fn run_threaded<S>(&self, mut source: S) -> ScanReport
    where
        S: BarcodeSource + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(CHANNEL_CAPACITY);
        let reader = thread::Builder::new()
            .name("scan-reader".to_string())
            .spawn(move || {
                while let Some(event) = source.next_event() {
                    let failed = event.is_err();
                    if tx.send(event).is_err() || failed {
                        break;
                    }
                }
            });
        if let Err(e) = reader {
            log::error!("Failed to start input reader: {e}");
            let report = ScanReport {
                source_failed: true,
                ..ScanReport::default()
            };
            return self.finish(report);
        }

        let mut report = ScanReport::default();
        loop {
            if self.shutdown.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(event) => {
                    if !self.dispatch(event, &mut report) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.finish(report)
    }

    /// Handle one event. Returns `false` when the loop must stop.
    fn dispatch(
        &self,
        event: Result<SourceEvent, SourceError>,
        report: &mut ScanReport,
    ) -> bool {
        match event {
            Ok(SourceEvent::Frame(frame)) => {
                report.frames += 1;
                self.submit_frame(&frame, report);
                true
            }
            Ok(SourceEvent::Control(control)) => {
                log::debug!("Operator command: {}", control_label(control));
                self.apply_control(control);
                true
            }
            Err(e) => {
                log::error!("{e}");
                report.source_failed = true;
                false
            }
        }
    }

    /// Submit every code of `frame` in order, all stamped with its capture time.
    pub fn submit_frame(&self, frame: &Frame, report: &mut ScanReport) {
        for code in &frame.codes {
            if !self.options.noise.accepts(code) {
                log::trace!("Dropped noise {code:?}");
                report.filtered += 1;
                continue;
            }
            let (submission, record, progress) =
                self.validator.submit_and_snapshot(code, frame.captured_at);
            match (submission, record) {
                (Submission::Recorded(_), Some(record)) => self.feedback.on_scan(&record, &progress),
                (Submission::Cooldown, _) => {
                    report.suppressed += 1;
                    self.feedback.on_suppressed(code.trim());
                }
                _ => {}
            }
        }
    }

    /// Apply an operator command.
    pub fn apply_control(&self, control: Control) {
        match control {
            Control::ClearHistory => {
                self.validator.reset();
                self.feedback.on_cleared(&self.validator.progress());
            }
            Control::ReloadRoster => self.reload_roster(),
            Control::Stats => self.feedback.on_stats(&self.validator.progress()),
        }
    }

    fn reload_roster(&self) {
        let Some(path) = self.options.roster_path.as_deref() else {
            self.feedback.on_roster_error("no roster file was given", true);
            return;
        };
        // Parse outside the lock; a failed reload keeps the current roster
        match load_roster(path, &self.options.load_options) {
            Ok(loaded) => {
                let policy = self.validator.with(|v| v.config().policy);
                let roster = loaded.into_roster(policy);
                let size = roster.len();
                self.validator.replace_roster(roster);
                self.feedback.on_roster_loaded(size);
            }
            Err(e) => {
                log::warn!("Roster reload failed: {e}");
                self.feedback.on_roster_error(&e.to_string(), true);
            }
        }
    }

    fn finish(&self, mut report: ScanReport) -> ScanReport {
        report.progress = self.validator.progress();
        self.feedback.on_finish(&report.progress);
        log::info!(
            "Scan ended after {} frames: {} recorded, {} suppressed, {} filtered",
            report.frames,
            report.progress.counters.total(),
            report.suppressed,
            report.filtered
        );
        report
    }
}
