//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`build_router`] assembles every route and middleware layer around an
//! [`AppState`]; [`start_server`] loads configuration, prepares the database and
//! upload directory, and serves the router.

// region: --- Imports
use crate::handlers::{items, users};
use crate::middleware::{log_requests, map_res, require_auth, stamp_req, RequestStamp};
use crate::services::upload::UploadStore;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use lib_core::{create_pool, run_migrations, AppError, Config, DbPool};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
// endregion: --- Imports

/// Request body limit for multipart upload routes. Individual files are
/// limited separately by the upload store.
pub const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub uploads: Arc<UploadStore>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let uploads = Arc::new(UploadStore::new(config.upload_dir.clone()));
        Self { db, config, uploads }
    }
}

impl FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<UploadStore> {
    fn from_ref(state: &AppState) -> Self {
        state.uploads.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000")
    pub bind_address: String,
    /// Allowed CORS origins
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - The database or upload directory cannot be created
/// - Database connection or migrations fail
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    init_tracing();

    info!("[STARTUP] StuffFindr API starting");

    info!("[STARTUP] Loading configuration...");
    let app_config = Config::from_env()
        .and_then(|c| c.validate().map(|_| c))
        .map_err(AppError::Config)?;

    info!("[STARTUP] Database URL: {}", app_config.database_url);
    ensure_database_dir(&app_config.database_url)?;

    tokio::fs::create_dir_all(&app_config.upload_dir).await?;
    info!("[STARTUP] Upload directory: {}", app_config.upload_dir.display());

    info!("[STARTUP] Connecting to database...");
    let pool = create_pool(&app_config.database_url).await?;

    info!("[STARTUP] Running embedded migrations...");
    run_migrations(&pool).await?;
    info!("[STARTUP] Migrations complete");

    let state = AppState::new(pool, app_config);
    let app = build_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;

    info!("[STARTUP] Server ready: http://{}", config.bind_address);
    log_server_info();

    axum::serve(listener, app).await?;
    Ok(())
}

/// Configure the global tracing subscriber from `LOG_LEVEL`.
fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let filter = match log_level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {
            tracing_subscriber::EnvFilter::new(&log_level)
        }
        _ => tracing_subscriber::EnvFilter::new("info"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_file(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("[STARTUP] Tracing subscriber already set");
    }

    info!("[STARTUP] Log level: {}", log_level);
}

/// Create the parent directory of a file-backed SQLite URL.
fn ensure_database_dir(database_url: &str) -> anyhow::Result<()> {
    let Some(db_path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let db_path = db_path.trim_start_matches("//");
    let db_path = db_path.split('?').next().unwrap_or_default();

    if db_path.is_empty() || db_path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            info!("[STARTUP] Created database directory: {:?}", parent);
        }
    }

    Ok(())
}

/// Create the main application router with all routes
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::HeaderName::from_static(crate::middleware::REQUEST_ID_HEADER)]);

    let auth = from_fn_with_state(state.clone(), require_auth);

    info!("[ROUTE SETUP] Registering HTTP routes...");

    // Parameters at the same position share one name.
    let user_routes = Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route(
            "/{user}",
            get(users::get_user_by_username).merge(
                put(users::update_user)
                    .delete(users::delete_user)
                    .route_layer(auth.clone()),
            ),
        )
        .route(
            "/{user}/upload-profile-picture",
            post(users::upload_profile_picture)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
                .route_layer(auth.clone()),
        );

    let item_routes = Router::new()
        .route("/", post(items::create_item).get(items::get_all_items))
        .route("/byUser/{user_id}", get(items::get_items_by_user))
        .route(
            "/{item}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/{item}/claim", put(items::claim_item))
        .route("/{item}/confirmClaim", put(items::confirm_claim))
        .route("/{item}/deleteClaim", delete(items::delete_confirmed_item))
        .route(
            "/{item}/upload-item-images",
            post(items::upload_item_images).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route_layer(auth);

    Router::new()
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/items", item_routes)
        .route("/health", get(|| async { "OK" }))
        .fallback(|| async { AppError::NotFound("Route does not exist".to_string()) })
        .with_state(state)
        // JSON bodies for framework-generated errors
        .layer(from_fn(map_res))
        // Request/response logging
        .layer(from_fn(log_requests))
        // Tower HTTP trace layer for spans
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        tracing::error!(
                            latency_ms = latency.as_millis(),
                            "[HTTP FAILURE] {:?}",
                            error
                        );
                    },
                ),
        )
        // Request stamping, outside logging and tracing so both see the id
        .layer(from_fn(stamp_req))
        .layer(cors)
}

/// Log server information
fn log_server_info() {
    info!(" USERS:");
    info!("   • POST   /api/v1/users/signup");
    info!("   • POST   /api/v1/users/login");
    info!("   • GET    /api/v1/users/{{username}}");
    info!("   • PUT    /api/v1/users/{{userId}}           (auth)");
    info!("   • DELETE /api/v1/users/{{userId}}           (auth)");
    info!("   • POST   /api/v1/users/{{userId}}/upload-profile-picture (auth)");
    info!(" ITEMS (auth):");
    info!("   • POST   /api/v1/items");
    info!("   • GET    /api/v1/items");
    info!("   • GET    /api/v1/items/byUser/{{userId}}");
    info!("   • GET    /api/v1/items/{{itemId}}");
    info!("   • PUT    /api/v1/items/{{itemId}}");
    info!("   • DELETE /api/v1/items/{{itemId}}");
    info!("   • PUT    /api/v1/items/{{itemId}}/claim");
    info!("   • PUT    /api/v1/items/{{itemId}}/confirmClaim");
    info!("   • DELETE /api/v1/items/{{itemId}}/deleteClaim");
    info!("   • POST   /api/v1/items/{{itemId}}/upload-item-images");
    info!(" HEALTH:");
    info!("   • GET    /health");
}
// endregion: --- Server Setup
