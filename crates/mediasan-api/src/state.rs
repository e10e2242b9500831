use anyhow::Context;
use mediasan_core::Config;
use mediasan_processing::UploadPipeline;
use std::sync::Arc;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub pipeline: UploadPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: UploadPipeline) -> Self {
        Self { config, pipeline }
    }

    /// Build state with the default backends and make sure the working
    /// directories exist.
    pub async fn initialize(config: Config) -> anyhow::Result<Arc<Self>> {
        let pipeline = UploadPipeline::from_config(&config);
        pipeline
            .sanitizer()
            .prepare()
            .await
            .context("Failed to prepare upload directories")?;
        Ok(Arc::new(Self::new(config, pipeline)))
    }
}
