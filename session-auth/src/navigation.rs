//! Seam for sending the user somewhere else.
//!
//! A browser host would change `window.location`; the command-line host
//! prints the target. Tests record the calls.

/// Moves the user to another location.
pub trait Navigator: Send + Sync {
    fn redirect(&self, target: &str);
}

/// Navigator that only logs the target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, target: &str) {
        tracing::info!("Redirecting to {}", target);
    }
}
