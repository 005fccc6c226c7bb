//! Site Backend - library for app logic and testing

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::{CredentialValidator, StaticSecret};
use crate::config::AppConfig;
use crate::error::ApiError;

/// Request-body cap, sized for media uploads.
const MAX_REQUEST_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Everything handlers need, resolved once at startup and injected through
/// axum state.
#[derive(Clone)]
pub struct AppState {
    pool: Option<PgPool>,
    pub auth: Arc<dyn CredentialValidator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: Option<PgPool>) -> Self {
        let auth = Arc::new(StaticSecret::new(config.admin_secret.clone()));
        Self {
            pool,
            auth,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> Result<&PgPool, ApiError> {
        self.pool.as_ref().ok_or(ApiError::Unavailable)
    }
}

/// CORS is wide open: the public site and the admin dashboard are served
/// from arbitrary origins, and preflight requests short-circuit here.
pub fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create and configure the application router.
pub fn create_app(state: AppState) -> Router {
    let cors = configure_cors();
    let uploads_dir = state.config.upload_dir.clone();

    Router::new()
        .route(
            "/blog",
            get(routes::blog::get_posts)
                .post(routes::blog::create_post)
                .put(routes::blog::update_post)
                .delete(routes::blog::delete_post),
        )
        .route(
            "/leads",
            get(routes::leads::list_leads)
                .post(routes::leads::create_lead)
                .delete(routes::leads::delete_lead),
        )
        .route("/upload", post(routes::upload::upload_file))
        .route("/health", get(routes::health::health_ping))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .method_not_allowed_fallback(routes::method_not_allowed)
        .fallback(routes::not_found)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Run the server (used by main).
pub async fn run() {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Guards MUST be held for the programme's lifetime; dropping them early
    // shuts down background log-writer threads and loses buffered log lines.
    let _log_guards = logging::init(&config.environment);

    // Refuse to start in production with the insecure default admin secret.
    if config.is_production() && config.admin_secret_is_default() {
        panic!(
            "FATAL: ADMIN_API_SECRET must be set to a secure, unique value in production. \
             Refusing to start with the default secret."
        );
    }

    let pool = if config.database_url.is_some() {
        match db::init_pool(&config).await {
            Ok(pool) => {
                if let Err(e) = db::run_migrations(&pool).await {
                    tracing::error!("Failed to run database migrations: {}", e);
                }
                Some(pool)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize database pool: {}. Continuing without database.",
                    e
                );
                None
            }
        }
    } else {
        tracing::info!("DATABASE_URL not set. Running without database connection.");
        None
    };

    let host = config.host.clone();
    let port = config.port;
    let state = AppState::new(config, pool);
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Invalid HOST/PORT configuration");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[test]
    fn test_create_app_returns_router() {
        let _app = create_app(routes::testing::test_state());
    }

    #[tokio::test]
    async fn test_unknown_path_is_404_with_envelope() {
        let app = create_app(routes::testing::test_state());
        let req = Request::get("/nope").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_plain_options_answers_200() {
        let app = create_app(routes::testing::test_state());
        let req = Request::options("/blog").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preflight_options_is_allowed_everywhere() {
        let app = create_app(routes::testing::test_state());
        let req = Request::options("/blog")
            .header("origin", "https://example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
