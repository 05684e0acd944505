//! Graceful shutdown handling.

use log::warn;
use tokio_util::sync::CancellationToken;

/// Returns a token that is cancelled on the first Ctrl-C.
///
/// The batch loop stops launching new assessments once the token fires;
/// assessments already running finish within their own deadline.
pub fn listen_for_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => {
                    warn!("Interrupt received, finishing in-flight assessments");
                    trigger.cancel();
                }
                // Without a listener the batch simply runs to completion
                Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
            },
            _ = trigger.cancelled() => {}
        }
    });
    cancel
}
