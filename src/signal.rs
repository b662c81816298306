//! Ctrl+C handling for the scan loop.
//!
//! Interrupting a scan must not lose the history: the handler only raises a
//! shared flag, and the scan loop notices it between frames, stops pulling
//! input, and then exports and saves as usual before exiting with code 130.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared "stop scanning" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// A handler with no shutdown requested and no signal hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) was called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Raise the flag manually.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the Ctrl+C hook once per process and return its handler.
///
/// Later calls (for example from parallel tests) get the same handler back
/// with the flag lowered.
///
/// # Errors
///
/// Returns [`SignalError`] if the hook cannot be installed on first use.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let hook = handler.clone();
    ctrlc::set_handler(move || {
        hook.request_shutdown();
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Saving scan history...");
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    })?;

    // A racing caller may have installed first; keep whichever won
    Ok(GLOBAL_HANDLER.get_or_init(|| handler).clone())
}
