use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch},
};

/// Backoffice Router Module
///
/// Cross-club account administration. Each handler extracts `AuthUser` and checks
/// the super-admin role, so these routes are safe without the authenticated layer.
pub fn backoffice_routes() -> Router<AppState> {
    Router::new()
        // GET /backoffice/users
        .route("/users", get(handlers::list_users))
        // PATCH /backoffice/users/{id}/block
        // Body is a bare JSON boolean. Blocked users are signed out on their next visit.
        .route("/users/{id}/block", patch(handlers::set_user_blocked))
}
