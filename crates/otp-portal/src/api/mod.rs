//! HTTP surface of the portal.

mod extract;
mod handlers;
mod middleware;
mod types;

pub use extract::FormOrJson;
pub use handlers::*;
pub use middleware::{
    logging_middleware, rate_limit_middleware, read_cookie, session_middleware, RateLimitState,
    SessionId,
};
pub use types::*;

use crate::workflow::Portal;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use session_store::SessionBackend;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User-facing flows
    pub portal: Arc<Portal>,
    /// Session backend used for cookie resolution
    pub sessions: Arc<dyn SessionBackend>,
    /// Name of the session cookie
    pub cookie_name: Arc<str>,
    /// Directory served for every unmatched GET
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create new application state.
    pub fn new(portal: Portal, cookie_name: impl Into<Arc<str>>, static_dir: PathBuf) -> Self {
        Self {
            sessions: portal.sessions().clone(),
            portal: Arc::new(portal),
            cookie_name: cookie_name.into(),
            static_dir,
        }
    }
}

/// Create the API router with custom rate limiting.
pub fn create_router_with_rate_limit(state: AppState, rate_limit: RateLimitState) -> Router {
    // Rate limiting runs before a session is resolved, so rejected
    // requests never create one.
    let forms = Router::new()
        .route("/register", post(handlers::register))
        .route("/verify-otp", post(handlers::verify_otp))
        .route("/login", post(handlers::login))
        .route("/contactus", post(handlers::contact))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_limit,
            rate_limit_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(forms)
        .fallback_service(ServeDir::new(&state.static_dir))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
