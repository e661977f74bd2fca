//! Quarry API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use quarry_application::{QueryLimits, QueryService};
use quarry_core::AppError;
use quarry_infrastructure::{InMemorySchemaRegistry, JsonFileSchemaSource};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let source = JsonFileSchemaSource::new(config.schema_path.as_str());
    let registry = InMemorySchemaRegistry::load(&source).await?;
    info!(
        schema_path = %source.path().display(),
        schemas = registry.len(),
        "schemas registered"
    );
    let query_service = QueryService::new(Arc::new(registry), QueryLimits::new(config.max_depth)?);

    let app = api_router::build_router(
        AppState { query_service },
        config.cors_allowed_origin.as_deref(),
    )?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, max_depth = config.max_depth, "quarry-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
