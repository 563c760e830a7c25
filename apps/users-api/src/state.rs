//! Shared application state.

use mongodb::Client;
use tokio_util::sync::CancellationToken;

/// Cloned into the infrastructure routes (inexpensive, the driver types are
/// handles over a shared pool).
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    /// Cancelled when the process starts shutting down
    pub shutdown: CancellationToken,
}
