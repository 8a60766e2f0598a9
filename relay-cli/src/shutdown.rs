//! Ctrl-C handling

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel the returned token on the first Ctrl-C
///
/// The wait loop notices the cancellation at its next tick and stops.
pub fn install_shutdown_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt, stopping");
                token_clone.cancel();
            }
            Err(e) => warn!("Failed to listen for interrupt: {}", e),
        }
    });

    token
}
