use std::sync::Arc;

use anyhow::Context;
use common::convert::{ConversionPipeline, PdfRenderer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::gateway::{AuthGateway, HttpVerifier};
use server::ingest::ModelCatalog;
use server::state::AppState;
use server::store::FileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = server::database::init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    server::seed::seed_formats(&db)
        .await
        .context("Failed to seed formats")?;

    let storage = common::storage::from_config(&config.storage)
        .context("Failed to initialize storage backend")?;
    info!(backend = storage.kind(), "Storage backend ready");

    let dispatcher = server::ingest::from_config(&config.ingest)
        .context("Failed to initialize ingest dispatcher")?;
    let catalog = ModelCatalog::new(&config.ingest).context("Failed to build catalog client")?;

    let verifier = HttpVerifier::new(&config.auth).context("Failed to build auth client")?;
    let gateway = AuthGateway::new(Arc::new(verifier), &config.auth.bypass_token);
    if config.auth.bypass_token.is_empty() {
        info!("Auth bypass token not configured");
    }

    let pipeline = ConversionPipeline::new(PdfRenderer::new(&config.render));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        store: Arc::new(FileStore::new(db.clone(), storage, dispatcher)),
        db,
        gateway: Arc::new(gateway),
        pipeline: Arc::new(pipeline),
        catalog: Arc::new(catalog),
        config: Arc::new(config),
    };

    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
