//! Router assembly.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Path reserved for the liveness probe.
pub const HEALTH_PATH: &str = "/healthz";

/// Paths of the two configurable endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePaths {
    /// Blocking approval endpoint.
    pub request_path: String,
    /// Slack interactive callback endpoint.
    pub callback_path: String,
}

impl Default for RoutePaths {
    fn default() -> Self {
        Self {
            request_path: "/ask".to_owned(),
            callback_path: "/interactive_action_callback".to_owned(),
        }
    }
}

impl From<&assent_config::ServerSection> for RoutePaths {
    fn from(server: &assent_config::ServerSection) -> Self {
        Self {
            request_path: server.request_path.clone(),
            callback_path: server.callback_path.clone(),
        }
    }
}

/// Build the application router.
///
/// Other methods on the two endpoints are answered with `405`.
pub fn router(state: AppState, paths: &RoutePaths) -> Router {
    Router::new()
        .route(&paths.request_path, post(handlers::ask))
        .route(&paths.callback_path, post(handlers::interactive_callback))
        .route(HEALTH_PATH, get(handlers::healthz))
        .with_state(state)
}
