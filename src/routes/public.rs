use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session. The landing routes use `MaybeSession`
/// rather than `AuthUser`: an anonymous caller is a normal input there, sent to login.
/// Nothing here sends email.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Entry point. 303 to /login, /backoffice, /dashboard or /onboarding,
        // revoking orphaned or blocked sessions on the way.
        .route("/", get(handlers::landing))
        // GET /session/redirect
        // Same decision as JSON, for the client-side router.
        .route("/session/redirect", get(handlers::session_redirect))
}
