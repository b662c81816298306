//! Reading and writing session files.
//!
//! On disk a session is pretty-printed JSON of the form
//! `{ "checksum": "<sha256 hex>", "session": { ... } }`. The checksum covers
//! the compact serialization of the inner object, so an edited history is
//! rejected on load. Files are written to a sibling temp file and renamed
//! into place, so a crash mid-save never leaves half a session behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::data::{Session, SESSION_VERSION};

/// Errors from saving or loading a session file.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the file failed.
    #[error("Session file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The file is not a session envelope.
    #[error("Not a scancheck session file: {0}")]
    Format(#[from] serde_json::Error),

    /// The stored checksum does not match the history.
    #[error("Session checksum mismatch: the history was edited or the file is damaged")]
    ChecksumMismatch,

    /// Written by a newer or older, incompatible build.
    #[error("Unsupported session version {found} (expected {expected})", expected = SESSION_VERSION)]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
    },
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    checksum: String,
    session: &'a Session,
}

#[derive(Deserialize)]
struct Envelope {
    checksum: String,
    session: Session,
}

fn digest(session: &Session) -> Result<String, SessionError> {
    let compact = serde_json::to_vec(session)?;
    Ok(format!("{:x}", Sha256::digest(&compact)))
}

impl Session {
    /// Envelope JSON for this session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Format`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SessionError> {
        let envelope = EnvelopeRef {
            checksum: digest(self)?,
            session: self,
        };
        Ok(serde_json::to_string_pretty(&envelope)?)
    }

    /// Parse and verify envelope JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed JSON, a checksum mismatch, or an
    /// unsupported version, checked in that order.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        if digest(&envelope.session)? != envelope.checksum {
            return Err(SessionError::ChecksumMismatch);
        }
        if envelope.session.version != SESSION_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: envelope.session.version,
            });
        }
        Ok(envelope.session)
    }

    /// Write the session to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let io_err = |source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = self.to_json()?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;

        log::info!(
            "Saved session with {} records to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }

    /// Read and verify a session file.
    ///
    /// # Errors
    ///
    /// See [`Session::from_json`]; also [`SessionError::Io`] if the file
    /// cannot be read.
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let json = fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let session = Self::from_json(&json)?;

        if let Some(roster) = session.roster_path.as_deref().filter(|p| !p.exists()) {
            log::warn!(
                "Session refers to a roster that is gone: {}",
                roster.display()
            );
        }
        log::debug!(
            "Loaded session from {} ({} records)",
            path.display(),
            session.records.len()
        );
        Ok(session)
    }
}
