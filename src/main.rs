//! slot-swapper server entry point.
//!
//! Loads configuration, selects the store, and serves the REST API until
//! Ctrl-C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use slot_swapper::api;
use slot_swapper::app_state::AppState;
use slot_swapper::auth::{Authenticator, TokenCodec};
use slot_swapper::config::{LogFormat, SwapperConfig};
use slot_swapper::persistence::{MemoryStore, PostgresStore, SlotStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = SwapperConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting slot-swapper");
    tracing::debug!(?config, "configuration loaded");

    let store = build_store(&config).await?;
    let authenticator = Authenticator::new(TokenCodec::new(
        config.auth_token_secret.as_bytes(),
        config.auth_token_ttl_secs,
    ));
    let app_state = AppState::new(store, authenticator);

    let router = Router::new().merge(api::build_router());
    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(config.cors_allowed_origin.as_deref())?)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ));
    let app = router.layer(middleware).with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn build_store(config: &SwapperConfig) -> anyhow::Result<Arc<dyn SlotStore>> {
    if !config.persistence_enabled {
        tracing::warn!("persistence disabled, using in-memory store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .context("connecting to PostgreSQL")?;
    let store = PostgresStore::new(pool);
    if config.database_run_migrations {
        store.migrate().await.context("running migrations")?;
        tracing::info!("database migrations applied");
    }
    Ok(Arc::new(store))
}

fn build_cors(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };
    let origin = HeaderValue::from_str(origin)
        .with_context(|| format!("invalid CORS_ALLOWED_ORIGIN {origin:?}"))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
