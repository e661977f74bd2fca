//! Application services and ports.

#![forbid(unsafe_code)]

mod query_ports;
mod query_service;
mod schema_ports;

pub use query_ports::{
    DEFAULT_MAX_QUERY_DEPTH, FieldSelection, PopulateBranch, PopulateFragment, PopulateTarget,
    PrivateFieldAccess, ProcessedQuery, QueryLimits, QueryMode, ResolvedQuery, SearchPlan,
    SortEntry,
};
pub use query_service::QueryService;
pub use schema_ports::{SchemaRegistry, SchemaSource};
