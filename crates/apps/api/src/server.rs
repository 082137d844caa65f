use crate::api_state::ApiContext;
use crate::create_router;
use app_state::load_app_settings;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use common_services::browse::BrowseEngine;
use common_services::database::init_schema;
use common_services::discovery::{CandidateProcessor, CandidateSource, RemoteSource};
use common_services::vision::{RemoteDetector, VisionPipeline};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub async fn serve() -> Result<()> {
    info!("Initializing server...");
    let settings = load_app_settings()?;

    let options =
        SqliteConnectOptions::from_str(&settings.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    init_schema(&pool).await?;

    let detector = Arc::new(RemoteDetector::new(&settings.detector));
    let pipeline = Arc::new(VisionPipeline::new(detector, settings.vision.clone()));
    let processor = Arc::new(CandidateProcessor::new(
        pool.clone(),
        pipeline,
        settings.curation.clone(),
        settings.discovery.clone(),
    ));
    let source: Arc<dyn CandidateSource> = Arc::new(RemoteSource::new(
        &settings.source.base_url,
        &settings.source.api_version,
    ));
    let engine = Arc::new(BrowseEngine::new(pool.clone()));

    let api_state = ApiContext {
        pool,
        settings: settings.clone(),
        engine,
        processor,
        source,
    };

    let cors = CorsLayer::new()
        .allow_methods(cors::Any)
        .allow_origin(cors::Any)
        .allow_headers(cors::Any);

    let app = create_router(api_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port)
        .parse()
        .map_err(|e| eyre!("Invalid address: {}", e))?;

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
