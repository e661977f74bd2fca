use serde::Serialize;
use ts_rs::TS;

mod queries;

pub use queries::{
    ContentTypeResponse, PopulateBranchResponse, PopulateFragmentResponse, QueryCheckRequest,
    QueryCheckResponse, ResolvedQueryResponse, SearchPlanResponse, SortEntryResponse,
};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::{
        ContentTypeResponse, HealthResponse, PopulateBranchResponse, PopulateFragmentResponse,
        QueryCheckRequest, QueryCheckResponse, ResolvedQueryResponse, SearchPlanResponse,
        SortEntryResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        ContentTypeResponse::export(&config)?;
        QueryCheckRequest::export(&config)?;
        QueryCheckResponse::export(&config)?;
        ResolvedQueryResponse::export(&config)?;
        SortEntryResponse::export(&config)?;
        PopulateBranchResponse::export(&config)?;
        PopulateFragmentResponse::export(&config)?;
        SearchPlanResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;

        Ok(())
    }
}
