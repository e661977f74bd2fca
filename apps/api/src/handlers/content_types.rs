use axum::Json;
use axum::extract::State;

use crate::dto::ContentTypeResponse;
use crate::state::AppState;

pub async fn list_content_types_handler(
    State(state): State<AppState>,
) -> Json<Vec<ContentTypeResponse>> {
    let content_types = state
        .query_service
        .content_type_uids()
        .into_iter()
        .map(|uid| ContentTypeResponse { uid })
        .collect();

    Json(content_types)
}
