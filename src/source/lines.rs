//! Line-oriented scan input.
//!
//! Handheld scanners in keyboard-wedge mode type each code followed by Enter,
//! and external decoders can pipe one line per frame. Each line is one frame:
//!
//! - `CODE` - a single code stamped with the clock
//! - `2024-05-01T10:00:00Z<TAB>CODE[<TAB>CODE...]` - a replayed frame with its
//!   own capture time
//! - `:clear`, `:reload`, `:stats` - operator commands (when enabled)
//!
//! Blank lines produce empty frames. Bytes that are not UTF-8 are decoded
//! lossily; the replacement characters mark the code as noise downstream.

use std::borrow::Cow;
use std::io::BufRead;

use chrono::{DateTime, Utc};

use super::{BarcodeSource, Clock, Control, Frame, SourceError, SourceEvent};

/// Reads frames from any buffered reader.
#[derive(Debug)]
pub struct LineSource<R, C> {
    reader: R,
    clock: C,
    commands: bool,
    buf: Vec<u8>,
}

impl<R: BufRead, C: Clock> LineSource<R, C> {
    /// Create a source over `reader`, stamping untimed lines with `clock`.
    pub fn new(reader: R, clock: C) -> Self {
        Self {
            reader,
            clock,
            commands: true,
            buf: Vec::new(),
        }
    }

    /// Enable or disable `:command` lines.
    #[must_use]
    pub fn with_commands(mut self, enabled: bool) -> Self {
        self.commands = enabled;
        self
    }

    fn parse_line(&self, line: &str) -> SourceEvent {
        let line = line.trim_end_matches(['\r', '\n']);

        if self.commands {
            if let Some(control) = Control::parse(line) {
                return SourceEvent::Control(control);
            }
        }

        let mut fields = line.split('\t');
        if let Some(first) = fields.next() {
            if let Ok(captured_at) = DateTime::parse_from_rfc3339(first.trim()) {
                let codes = fields
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(String::from)
                    .collect();
                return SourceEvent::Frame(Frame::new(captured_at.with_timezone(&Utc), codes));
            }
        }

        let now = self.clock.now();
        let code = line.trim();
        if code.is_empty() {
            SourceEvent::Frame(Frame::new(now, Vec::new()))
        } else {
            SourceEvent::Frame(Frame::single(now, code))
        }
    }
}

impl<R: BufRead, C: Clock> BarcodeSource for LineSource<R, C> {
    fn next_event(&mut self) -> Option<Result<SourceEvent, SourceError>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let line = String::from_utf8_lossy(&self.buf);
                if matches!(line, Cow::Owned(_)) {
                    log::trace!("Scanner line is not UTF-8: {:?}", self.buf);
                }
                Some(Ok(self.parse_line(&line)))
            }
            Err(e) => Some(Err(SourceError::Io(e))),
        }
    }
}
