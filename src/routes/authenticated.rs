use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any signed-in, unblocked user. The `AuthUser` middleware on the layer
/// above guarantees a resolved identity; club-scoped handlers additionally require
/// the caller to belong to a club.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::get_me))
        // GET /me/landing
        // Post-login landing path for the caller's role.
        .route("/me/landing", get(handlers::get_landing_path))
        // POST /api/send-invite
        // Emails an invitation link. 500 without a mail credential, 400 with the
        // provider payload when the provider refuses the message.
        .route("/api/send-invite", post(handlers::send_invite))
        // POST /contact-admin
        // Users waiting on onboarding ask a registered club admin to attach them.
        // The requester is the session's email.
        .route("/contact-admin", post(handlers::contact_admin))
        // POST /onboarding
        // Creates the caller's club and attaches their profile; refused once attached.
        .route("/onboarding", post(handlers::create_club))
        // --- Club dashboard ---
        .route("/dashboard", get(handlers::get_dashboard))
        // GET /dashboard/stats?team_id=...&match_id=...
        .route("/dashboard/stats", get(handlers::get_team_stats))
        // PUT /matches/{id}/convocation
        // Replaces the convened players of a match and records a CONVOCATION entry.
        .route("/matches/{id}/convocation", put(handlers::save_convocation))
}
