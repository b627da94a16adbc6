use complaint_triage::{
    api::{build_router, AppState},
    config::Config,
    ml::{ArtifactSet, ComplaintClassifier, StagePipeline},
    state::create_store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "complaint_triage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting complaint-triage v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = complaint_triage::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Load model artifacts. Any failure here is fatal: the service must never
    // serve requests with a partially loaded artifact set.
    tracing::info!(dir = ?config.artifacts.dir, "Loading model artifacts");

    let ministry_paths = config.artifacts.stage_paths(&config.artifacts.ministry);
    let ministry_artifacts = match ArtifactSet::load(&ministry_paths) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            tracing::error!("Failed to load ministry artifacts: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("✅ Ministry stage artifacts loaded");

    let department_paths = config.artifacts.stage_paths(&config.artifacts.department);
    let department_artifacts = match ArtifactSet::load(&department_paths) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            tracing::error!("Failed to load department artifacts: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("✅ Department stage artifacts loaded");

    let classifier = Arc::new(ComplaintClassifier::new(
        Arc::new(StagePipeline::new("ministry", ministry_artifacts)),
        Arc::new(StagePipeline::new("department", department_artifacts)),
    ));
    tracing::info!("✅ Two-stage classifier initialized");

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.state.backend);
    let store = create_store(&config.state)?;
    tracing::info!("✅ Storage backend initialized");

    // Build HTTP router
    let app_state = AppState::new(classifier, store);
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Classify: http://{}/v1/classify", http_addr);
    tracing::info!("   Complaints: http://{}/v1/complaints", http_addr);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
