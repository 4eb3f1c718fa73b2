use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use configuration::Config;
use database::{DbRepository, PoolSettings};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
}

/// Builds the full application router over the given state. Split out from
/// [`run_server`] so tests can drive the routes without binding a socket.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/login", post(handlers::login))
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::save_user),
        )
        .route("/api/users/:id/status", put(handlers::set_user_status))
        .route(
            "/api/templates",
            get(handlers::list_templates).post(handlers::save_template),
        )
        .route("/api/templates/:id", delete(handlers::delete_template))
        .route(
            "/api/tasks",
            get(handlers::list_tasks).post(handlers::save_task),
        )
        .route("/api/tasks/:id", delete(handlers::delete_task))
        .route(
            "/api/rounds",
            get(handlers::list_rounds).post(handlers::save_round),
        )
        .route(
            "/api/settings",
            get(handlers::get_settings).post(handlers::save_settings),
        )
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        // Evidence photos and signatures arrive as base64 blobs, so the
        // default body cap is far too small.
        .layer(DefaultBodyLimit::max(1024 * 1024 * 50)) // 50MB body limit
}

/// The main function to configure and run the web server.
///
/// Connects the database pool, applies pending migrations, serves the API
/// until a shutdown signal arrives, then drains the pool so in-flight
/// writes finish before the process exits.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool_settings = PoolSettings {
        max_connections: config.database.max_connections,
        acquire_timeout: Duration::from_secs(config.database.acquire_timeout_secs),
    };
    let db_pool = database::connect(&pool_settings).await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool.clone());

    let app_state = Arc::new(AppState { db_repo });
    let app = router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    tracing::info!("Web server stopped; database pool drained.");
    Ok(())
}

/// Resolves when the process receives Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install terminate signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received.");
}
