//! Barcode sources.
//!
//! A source is pulled one event at a time. Each frame carries the instant it
//! was captured and zero or more decoded strings; the scan loop submits them
//! to the validator in the order they are yielded. Sources never touch the
//! validator themselves.
//!
//! - [`LineSource`]: keyboard-wedge scanners, piped decoder output, replay files
//! - [`IterSource`]: any in-memory sequence of frames

pub mod lines;

use std::io;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use lines::LineSource;

/// Errors produced while reading from a source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading the underlying stream failed.
    #[error("I/O error reading scan input: {0}")]
    Io(#[from] io::Error),
}

/// Decoded strings from one captured frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// When the frame was captured.
    pub captured_at: DateTime<Utc>,
    /// Decoded strings, possibly none.
    pub codes: Vec<String>,
}

impl Frame {
    /// Create a frame.
    #[must_use]
    pub fn new(captured_at: DateTime<Utc>, codes: Vec<String>) -> Self {
        Self { captured_at, codes }
    }

    /// A frame holding a single code.
    #[must_use]
    pub fn single(captured_at: DateTime<Utc>, code: impl Into<String>) -> Self {
        Self::new(captured_at, vec![code.into()])
    }
}

/// Operator commands arriving on the scan input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Clear history, seen codes, counters and cooldown.
    ClearHistory,
    /// Load the roster file again.
    ReloadRoster,
    /// Print current progress.
    Stats,
}

impl Control {
    /// Parse `:clear`, `:reload` or `:stats`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            ":clear" => Some(Self::ClearHistory),
            ":reload" => Some(Self::ReloadRoster),
            ":stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

/// One item pulled from a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// Decoded frame.
    Frame(Frame),
    /// Operator command.
    Control(Control),
}

/// A pull-based, possibly unbounded sequence of scan events.
pub trait BarcodeSource {
    /// Pull the next event. `None` means the source is exhausted.
    fn next_event(&mut self) -> Option<Result<SourceEvent, SourceError>>;
}

/// Source of the current time for frames without their own timestamp.
pub trait Clock: Send {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wraps an iterator of frames.
#[derive(Debug)]
pub struct IterSource<I> {
    frames: I,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = Frame>,
{
    /// Create a source over `frames`.
    pub fn new<T: IntoIterator<IntoIter = I>>(frames: T) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl<I> BarcodeSource for IterSource<I>
where
    I: Iterator<Item = Frame>,
{
    fn next_event(&mut self) -> Option<Result<SourceEvent, SourceError>> {
        self.frames.next().map(|frame| Ok(SourceEvent::Frame(frame)))
    }
}

/// Drops decoder noise before it reaches the validator: blank codes, codes
/// with control or replacement characters, and codes that are too short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseFilter {
    /// Codes shorter than this (after trimming, in characters) are dropped.
    pub min_code_length: usize,
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self { min_code_length: 1 }
    }
}

impl NoiseFilter {
    /// Whether `code` should be submitted.
    #[must_use]
    pub fn accepts(&self, code: &str) -> bool {
        let code = code.trim();
        !code.is_empty()
            && !code
                .chars()
                .any(|c| c.is_control() || c == char::REPLACEMENT_CHARACTER)
            && code.chars().count() >= self.min_code_length
    }
}
