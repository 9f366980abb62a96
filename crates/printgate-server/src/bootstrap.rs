//! Startup wiring: builds the shared state from configuration.
//!
//! Any failure here is a configuration error and aborts startup.

use std::sync::Arc;

use printgate_auth::{AccessController, AuthResult, AuthState};
use printgate_queue::PrintQueueEngine;
use tracing::info;

use crate::config::AppConfig;
use crate::server::AppState;

/// Resolves the role catalog, provisions users, creates the queue engine
/// and starts the session sweeper.
///
/// Must be called from within a tokio runtime.
pub async fn init_state(cfg: &AppConfig) -> AuthResult<AppState> {
    let access = Arc::new(AccessController::from_config(&cfg.auth).await?);
    info!(
        roles = ?access.policy().roles(),
        users = cfg.auth.users.len(),
        session_ttl = ?cfg.auth.session.ttl,
        "Access control initialized"
    );

    // Detached; the sweeper stops once the session manager is dropped.
    access
        .sessions()
        .spawn_sweeper(cfg.auth.session.sweep_interval);

    let queue = Arc::new(PrintQueueEngine::new(&cfg.queue));
    info!(
        running = queue.is_running(),
        promote_to = ?queue.promote_target(),
        "Print queue engine initialized"
    );

    Ok(AppState {
        auth: AuthState::new(access),
        queue,
    })
}
