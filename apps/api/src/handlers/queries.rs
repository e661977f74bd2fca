use axum::Json;
use axum::extract::{Path, State};
use quarry_application::{PrivateFieldAccess, QueryMode};
use quarry_core::AppError;
use serde_json::{Map, Value};
use tracing::info;

use crate::dto::{QueryCheckRequest, QueryCheckResponse};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn check_query_handler(
    State(state): State<AppState>,
    Path((content_type_uid, mode)): Path<(String, String)>,
    Json(payload): Json<QueryCheckRequest>,
) -> ApiResult<Json<QueryCheckResponse>> {
    let mode = QueryMode::parse_transport(mode.as_str())?;
    let access = PrivateFieldAccess::from_paths(payload.allowed_private_fields);
    let query = payload
        .query
        .unwrap_or_else(|| Value::Object(Map::new()));

    let processed = state
        .query_service
        .process_query(content_type_uid.as_str(), &query, mode, &access)
        .inspect_err(|error| {
            if let AppError::InvalidQuery(violation) = error {
                info!(
                    content_type = %content_type_uid,
                    %violation,
                    "query rejected"
                );
            }
        })?;

    Ok(Json(QueryCheckResponse::from_processed(mode, processed)))
}
