use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod mailer;
pub mod models;
pub mod repository;
pub mod roster;
pub mod routing;
pub mod stats;

// Module for routing segregation (Public, Authenticated, Backoffice).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, backoffice, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use identity::{IdentityState, MockIdentity, SupabaseIdentity};
pub use mailer::{MailerState, MockMailer, ResendMailer};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generated OpenAPI document for every `#[utoipa::path]` handler and the
/// schemas they exchange. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::landing, handlers::session_redirect, handlers::get_landing_path,
        handlers::get_me, handlers::send_invite, handlers::contact_admin, handlers::create_club,
        handlers::get_dashboard, handlers::get_team_stats, handlers::save_convocation,
        handlers::list_users, handlers::set_user_blocked
    ),
    components(
        schemas(
            models::Role, models::Profile, models::Club, models::CreateClubRequest,
            models::ActionType, models::ActivityLog,
            models::Player, models::Match, models::ClubCounts, models::SendInviteRequest,
            models::ContactAdminRequest, models::ConvocationRequest, models::RedirectResponse,
            models::LandingResponse, models::MailReceipt, models::ContactAdminResponse,
            models::ConvocationResponse, models::DashboardOverview,
            stats::PlayerStatLine, stats::StatsReport,
        )
    ),
    tags(
        (name = "club-manager", description = "Football club management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container of every service shared across requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres access behind `Arc<dyn Repository>`.
    pub repo: RepositoryState,
    /// Mail client. `None` when no `RESEND_API_KEY` was configured.
    pub mailer: Option<MailerState>,
    /// Auth backend, used to revoke sessions that must not stay signed in.
    pub identity: IdentityState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for `authenticated_routes`: extracting `AuthUser` runs session resolution and
/// the profile check, and its rejection (401/403/500) short-circuits the request.
/// The resolved user is stored in the request extensions, where the handler's own
/// `AuthUser` extractor picks it up without a second profile query.
async fn auth_middleware(auth_user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(auth_user);
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies scoped and global middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: the landing routes resolve the session themselves.
        .merge(public::public_routes())
        // Authenticated Routes: Protected by the `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Backoffice Routes: role check inside the handlers.
        .nest("/backoffice", backoffice::backoffice_routes())
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the layer above
/// so every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
