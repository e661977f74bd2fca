use axum::Router;
use axum::routing::{get, post};
use quarry_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;

pub fn build_router(
    app_state: AppState,
    cors_allowed_origin: Option<&str>,
) -> Result<Router, AppError> {
    let router = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/content-types",
            get(handlers::content_types::list_content_types_handler),
        )
        .route(
            "/api/content-types/{uid}/query/{mode}",
            post(handlers::queries::check_query_handler),
        )
        .layer(TraceLayer::new_for_http());

    let router = match cors_allowed_origin {
        Some(origin) => router.layer(cors::build_cors_layer(origin)?),
        None => router,
    };

    Ok(router.with_state(app_state))
}
