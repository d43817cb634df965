//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{
        DocumentExtractor, JsonFileRepository, OpenAiFlashcardsAdapter, OpenAiNotesAdapter,
        OpenAiQuizAdapter, OpenAiSummaryAdapter, PgSlotRepository,
    },
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::extract::DefaultBodyLimit;
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_companion_core::{
    ports::DocumentRepository,
    store::DocumentStore,
    study::{StudyFlows, StudyService},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Document Store ---
    let repository: Arc<dyn DocumentRepository> = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            let slot_repository = PgSlotRepository::new(db_pool, config.storage_key.clone());
            info!("Running database migrations...");
            slot_repository.run_migrations().await?;
            info!("Database migrations complete.");
            Arc::new(slot_repository)
        }
        None => {
            info!("Persisting documents to {}", config.store_path.display());
            Arc::new(JsonFileRepository::new(config.store_path.clone()))
        }
    };
    let store = Arc::new(DocumentStore::open(repository).await);

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());
    let openai_client = Client::with_config(openai_config);

    let flows = StudyFlows {
        summary: Arc::new(OpenAiSummaryAdapter::new(
            openai_client.clone(),
            config.summary_model.clone(),
        )),
        notes: Arc::new(OpenAiNotesAdapter::new(
            openai_client.clone(),
            config.notes_model.clone(),
        )),
        flashcards: Arc::new(OpenAiFlashcardsAdapter::new(
            openai_client.clone(),
            config.flashcard_model.clone(),
        )),
        quiz: Arc::new(OpenAiQuizAdapter::new(
            openai_client,
            config.quiz_model.clone(),
        )),
    };
    let study = Arc::new(StudyService::new(
        store,
        Arc::new(DocumentExtractor::new()),
        flows,
    ));

    // --- 4. Build the Shared AppState ---
    let shutdown = CancellationToken::new();
    let app_state = Arc::new(AppState {
        study,
        config: config.clone(),
        shutdown: shutdown.clone(),
    });

    // --- 5. Create the Web Router ---
    let cors_origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::InvalidSetting(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let api_router = router(app_state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received.");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
