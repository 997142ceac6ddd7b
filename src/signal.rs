//! Signal handling for graceful shutdown.
//!
//! A Ctrl+C handler sets a shared `AtomicBool`. The packaging pipeline polls
//! the flag between cases and between the steps of a case, removes whatever
//! it staged for the interrupted case, and returns early.
//!
//! ```rust,no_run
//! use rpacs_pack::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let flag = handler.get_flag();
//! // Pass `flag` to Packager::with_shutdown_flag
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared shutdown flag, set when Ctrl+C is received.
#[derive(Debug, Clone)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag for the pipeline.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    fn reset(&self) {
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

static GLOBAL_HANDLER: Mutex<Option<ShutdownHandler>> = Mutex::new(None);

/// Install a Ctrl+C handler that sets the shutdown flag on interrupt.
///
/// If this process already installed one (integration tests call `run_app()`
/// repeatedly) its flag is cleared and the same handler is returned.
///
/// # Errors
///
/// Returns [`SignalError::InstallFailed`] if the Ctrl+C hook cannot be
/// registered, e.g. because another handler owns it.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    let mut global = GLOBAL_HANDLER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    if let Some(ref handler) = *global {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();

    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);

        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Cleaning up the current case..."
        );
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    })?;

    *global = Some(handler.clone());
    Ok(handler)
}
