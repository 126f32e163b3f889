use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecheck_api::router::create_router;
use sitecheck_api::state::AppState;
use sitecheck_api::ApiConfig;
use sitecheck_core::config::LayeredConfig;
use sitecheck_core::rules::RuleSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitecheck_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_config = ApiConfig::from_env();

    let mut layered = LayeredConfig::with_defaults();
    if let Some(path) = &api_config.config_path {
        layered = layered
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }
    let engine_config = layered.load_from_env().engine_config();

    let rules = match &api_config.rules_path {
        Some(path) => RuleSet::load_from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => RuleSet::default(),
    };

    tracing::info!(
        port = api_config.port,
        metric_crs = %engine_config.metric_crs,
        display_crs = %engine_config.display_crs,
        min_distance_m = rules.min_distance_to_settlements_m,
        "Starting Sitecheck API server"
    );

    let datasets = api_config.datasets.clone();
    let state = tokio::task::spawn_blocking(move || AppState::load(engine_config, rules, datasets))
        .await
        .context("Reference loading task failed")?
        .context("Failed to load reference datasets")?;

    let origin = api_config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", api_config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = create_router(Arc::new(state)).layer(cors).layer(TraceLayer::new_for_http());

    let addr = api_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", api_config.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
