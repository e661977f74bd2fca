use quarry_application::{
    PopulateBranch, PopulateFragment, PopulateTarget, ProcessedQuery, QueryMode, ResolvedQuery,
    SearchPlan, SortEntry,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// API representation of a queryable content type.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/content-type-response.ts"
)]
pub struct ContentTypeResponse {
    pub uid: String,
}

/// Incoming payload for query sanitization and validation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/query-check-request.ts"
)]
pub struct QueryCheckRequest {
    #[serde(default)]
    #[ts(type = "Record<string, unknown> | null")]
    pub query: Option<Value>,
    /// Dotted paths of private attributes the caller may read.
    #[serde(default)]
    pub allowed_private_fields: Vec<String>,
}

/// Narrowed query and the plan resolved from it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/query-check-response.ts"
)]
pub struct QueryCheckResponse {
    pub mode: String,
    #[ts(type = "Record<string, unknown>")]
    pub query: Value,
    pub resolved: ResolvedQueryResponse,
}

/// API representation of one resolved query level.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/resolved-query-response.ts"
)]
pub struct ResolvedQueryResponse {
    #[ts(type = "Record<string, unknown> | null")]
    pub filters: Option<Value>,
    pub sort: Vec<SortEntryResponse>,
    pub fields: Vec<String>,
    pub populate: Vec<PopulateBranchResponse>,
    pub search: Option<SearchPlanResponse>,
    pub count: bool,
}

/// API representation of an ordering entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sort-entry-response.ts"
)]
pub struct SortEntryResponse {
    pub path: String,
    pub direction: String,
}

/// API representation of a populated attribute.
///
/// Relation, component and media branches carry `target` and `query`;
/// dynamic zones carry `fragments`.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/populate-branch-response.ts"
)]
pub struct PopulateBranchResponse {
    pub attribute: String,
    pub target: Option<String>,
    pub query: Option<Box<ResolvedQueryResponse>>,
    pub fragments: Vec<PopulateFragmentResponse>,
}

/// API representation of a populated dynamic-zone component.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/populate-fragment-response.ts"
)]
pub struct PopulateFragmentResponse {
    pub component: String,
    pub query: ResolvedQueryResponse,
}

/// API representation of a full-text search plan.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/search-plan-response.ts"
)]
pub struct SearchPlanResponse {
    pub term: String,
    pub attributes: Vec<String>,
}

impl QueryCheckResponse {
    /// Builds the response for a query processed in `mode`.
    #[must_use]
    pub fn from_processed(mode: QueryMode, processed: ProcessedQuery) -> Self {
        Self {
            mode: mode.as_str().to_owned(),
            query: processed.query,
            resolved: ResolvedQueryResponse::from(processed.resolved),
        }
    }
}

impl From<ResolvedQuery> for ResolvedQueryResponse {
    fn from(value: ResolvedQuery) -> Self {
        Self {
            fields: value
                .selection
                .columns()
                .into_iter()
                .map(ToOwned::to_owned)
                .collect(),
            filters: value.filters,
            sort: value.order.into_iter().map(SortEntryResponse::from).collect(),
            populate: value
                .populate
                .into_iter()
                .map(PopulateBranchResponse::from)
                .collect(),
            search: value.search.map(SearchPlanResponse::from),
            count: value.count,
        }
    }
}

impl From<SortEntry> for SortEntryResponse {
    fn from(value: SortEntry) -> Self {
        Self {
            path: value.path,
            direction: value.direction.as_str().to_owned(),
        }
    }
}

impl From<PopulateBranch> for PopulateBranchResponse {
    fn from(value: PopulateBranch) -> Self {
        match value.target {
            PopulateTarget::Schema { uid, query } => Self {
                attribute: value.attribute,
                target: Some(uid.as_str().to_owned()),
                query: Some(Box::new(ResolvedQueryResponse::from(*query))),
                fragments: Vec::new(),
            },
            PopulateTarget::Fragments(fragments) => Self {
                attribute: value.attribute,
                target: None,
                query: None,
                fragments: fragments
                    .into_iter()
                    .map(PopulateFragmentResponse::from)
                    .collect(),
            },
        }
    }
}

impl From<PopulateFragment> for PopulateFragmentResponse {
    fn from(value: PopulateFragment) -> Self {
        Self {
            component: value.component.as_str().to_owned(),
            query: ResolvedQueryResponse::from(value.query),
        }
    }
}

impl From<SearchPlan> for SearchPlanResponse {
    fn from(value: SearchPlan) -> Self {
        Self {
            term: value.term,
            attributes: value.attributes,
        }
    }
}
