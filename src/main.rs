use club_manager::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    identity::{IdentityState, SupabaseIdentity},
    mailer::{MailerState, ResendMailer},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database, outbound clients, then the HTTP
/// server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "club_manager=debug,tower_http=info,axum=trace".into());

    // 3. Pretty logs locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    if config.env == Env::Local {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("FATAL: Failed to apply local migrations.");
    }

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Outbound clients
    // The mail client is only built when a credential exists; send routes answer
    // with a configuration error otherwise.
    let mailer = match config.resend_api_key.as_deref() {
        Some(api_key) => Some(Arc::new(ResendMailer::new(api_key)) as MailerState),
        None => {
            tracing::warn!("RESEND_API_KEY is not set: email routes will fail");
            None
        }
    };

    let identity = Arc::new(SupabaseIdentity::new(
        &config.supabase_url,
        &config.supabase_anon_key,
    )) as IdentityState;

    // 6. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        mailer,
        identity,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("FATAL: Failed to bind {bind_addr}: {e}"));

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server stopped");
    }
}
