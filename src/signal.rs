//! Signal handling for graceful shutdown.
//!
//! Ctrl+C sets a shared `AtomicBool`. The walker, the digest workers and
//! the finder all poll it; a run that sees it set stops with exit code 130.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dups::signal::install_handler;
//! use dups::duplicates::FinderConfig;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a new shutdown handler with the flag initially set to `false`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if shutdown has been requested.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Manually request a shutdown.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Get a clone of the shutdown flag for passing to the finder.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Reset the shutdown flag to `false`.
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

/// Install a Ctrl+C handler that sets the shutdown flag on interrupt.
///
/// The process-wide handler is installed on the first call; later calls
/// reset its flag and return it again.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if `ctrlc` cannot register the
/// handler (for instance because another one is already registered).
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = GLOBAL_HANDLER.get_or_init(ShutdownHandler::new);
    let flag = handler.get_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Cleaning up...");
        let _ = std::io::stderr().flush();
    }) {
        Ok(()) => {
            log::debug!("Ctrl+C handler installed");
            Ok(handler.clone())
        }
        // a racing call in this process got there first
        Err(ctrlc::Error::MultipleHandlers) => Ok(handler.clone()),
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
