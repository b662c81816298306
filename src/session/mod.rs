//! Session module for persisting scan history.
//!
//! A saved session lets an operator stop scanning, resume later with the
//! same history, or export it after the fact.
//!
//! # Features
//!
//! * **Persistence**: History, roster path and match policy saved to JSON.
//! * **Integrity**: A SHA-256 checksum over the history rejects edited files.
//! * **Versioning**: Files from an incompatible format version are refused.
//!
//! # Architecture
//!
//! * [`data`]: Serializable session model.
//! * [`io`]: Atomic save, load and verification.

pub mod data;
pub mod io;

pub use data::{Session, SESSION_VERSION};
pub use io::SessionError;
