use quarry_application::QueryService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub query_service: QueryService,
}
