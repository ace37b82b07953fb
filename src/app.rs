use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::{
    api,
    clients::{GeminiClient, TextGenerator},
    config::{Config, StoreBackend},
    observability::Telemetry,
    pipeline::FeedbackSummaryPipeline,
    store::dao::{InMemoryTestResultDao, PgTestResultDao, TestResultDao},
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

/// Process-wide components, built once at startup and shared by every request.
pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    dao: Arc<dyn TestResultDao>,
    pipeline: FeedbackSummaryPipeline,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn dao(&self) -> Arc<dyn TestResultDao> {
        Arc::clone(&self.registry.dao)
    }

    pub(crate) fn pipeline(&self) -> &FeedbackSummaryPipeline {
        &self.registry.pipeline
    }
}

impl ComponentRegistry {
    /// Builds the store, Gemini client and pipeline from configuration.
    ///
    /// # Errors
    /// Telemetry setup, HTTP client construction, or database schema creation failed.
    pub async fn build(config: Config) -> Result<Self> {
        let telemetry = Telemetry::new()?;
        let dao = build_store(&config).await?;
        let generator: Arc<dyn TextGenerator> = Arc::new(GeminiClient::new(
            config.gemini_base_url(),
            config.gemini_api_key(),
            config.gemini_model(),
            config.llm_timeout(),
        )?);
        info!(model = %config.gemini_model(), "text generator configured");

        Ok(Self::from_parts(config, telemetry, dao, generator))
    }

    /// Assembles a registry from already-built parts. Used by `build` and tests.
    pub fn from_parts(
        config: Config,
        telemetry: Telemetry,
        dao: Arc<dyn TestResultDao>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let config = Arc::new(config);
        let pipeline = FeedbackSummaryPipeline::from_config(
            &config,
            Arc::clone(&dao),
            generator,
            telemetry.metrics_arc(),
        );

        Self {
            config,
            telemetry,
            dao,
            pipeline,
        }
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn TestResultDao>> {
    match config.store_backend() {
        StoreBackend::Memory => {
            info!("using in-memory test result store");
            Ok(Arc::new(InMemoryTestResultDao::new()))
        }
        StoreBackend::Postgres => {
            let dsn = config
                .database_url()
                .context("DATABASE_URL is required for the postgres store")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections())
                .acquire_timeout(config.db_acquire_timeout())
                .connect(dsn)
                .await
                .context("failed to connect to postgres")?;
            let dao = PgTestResultDao::new(pool);
            dao.ensure_schema().await?;
            info!("using postgres test result store");
            Ok(Arc::new(dao))
        }
    }
}

pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}
