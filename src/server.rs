use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{JwtSessionProvider, SessionProvider};
use crate::config::{AppConfig, Environment};
use crate::database::{DatabaseManager, PgProjectStore, ProjectStore};
use crate::handlers::{protected, public};
use crate::middleware::session_middleware;
use crate::services::ProjectService;

/// Everything a handler needs, built once in `serve` and shared by reference count.
#[derive(Clone)]
pub struct AppState {
    pub projects: ProjectService,
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProjectStore>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            projects: ProjectService::new(store),
            sessions,
        }
    }
}

/// Routes with session resolution, without deployment layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Authenticated
        .merge(project_routes(state.clone()))
        .with_state(state)
}

fn project_routes(state: AppState) -> Router<AppState> {
    use protected::projects;

    Router::new()
        .route(
            "/projects/:id",
            get(projects::project_get)
                .put(projects::project_put)
                .delete(projects::project_delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(state, session_middleware))
}

/// Full application: routes plus body limit, CORS and request tracing per config.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut app = router(state).layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        app = app.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    app
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Connect to the database, build the app and serve until ctrl-c.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    let store: Arc<dyn ProjectStore> = Arc::new(PgProjectStore::new(pool.clone()));
    let sessions: Arc<dyn SessionProvider> =
        Arc::new(JwtSessionProvider::new(&config.security.jwt_secret).map_err(|e| {
            anyhow::anyhow!("{} (set AUTH_SECRET)", e)
        })?);

    let app = app(AppState::new(store, sessions), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Project API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
