/// Factory: build `AuthPipeline` from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::auth::AuthPipeline;

pub fn build_auth_pipeline(config: &Config) -> Result<Arc<AuthPipeline>, ConfigError> {
    let pipeline = AuthPipeline::initialize(config.auth.clone())?;

    tracing::info!(
        sources = ?pipeline.sources().iter().map(|s| s.label()).collect::<Vec<_>>(),
        "auth pipeline ready"
    );

    Ok(Arc::new(pipeline))
}
