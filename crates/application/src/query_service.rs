use std::str::FromStr;
use std::sync::Arc;

use quarry_core::{AppError, AppResult, QueryParameter, QueryViolation};
use quarry_domain::{
    Attribute, AttributeKind, FilterOperator, ScalarType, Schema, SchemaUid, SortDirection,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::SchemaRegistry;
use crate::query_ports::{
    FieldSelection, PopulateBranch, PopulateFragment, PopulateTarget, PrivateFieldAccess,
    ProcessedQuery, QueryLimits, QueryMode, ResolvedQuery, SearchPlan, SortEntry,
};

mod classifier;
mod fields;
mod filters;
mod operators;
mod policy;
mod populate;
mod search;
mod sort;
mod walker;


use classifier::Visibility;
use policy::{Denial, DenialAction, DenialPolicy, DeniedReason, SanitizePolicy, ValidatePolicy};
use walker::{QueryScope, QueryWalker, join_path};

/// Application service sanitizing and validating read queries against
/// content-type schemas.
#[derive(Clone)]
pub struct QueryService {
    registry: Arc<dyn SchemaRegistry>,
    limits: QueryLimits,
}

impl QueryService {
    /// Creates a query service over a fully loaded schema registry.
    #[must_use]
    pub fn new(registry: Arc<dyn SchemaRegistry>, limits: QueryLimits) -> Self {
        Self { registry, limits }
    }

    /// Narrows a query to what the caller may read. Never fails on
    /// disallowed clauses.
    pub fn sanitize_query(
        &self,
        content_type_uid: &str,
        query: &Value,
        access: &PrivateFieldAccess,
    ) -> AppResult<ProcessedQuery> {
        self.process_query(content_type_uid, query, QueryMode::Sanitize, access)
    }

    /// Rejects the query with [`AppError::InvalidQuery`] when any clause is
    /// disallowed.
    pub fn validate_query(
        &self,
        content_type_uid: &str,
        query: &Value,
        access: &PrivateFieldAccess,
    ) -> AppResult<ProcessedQuery> {
        self.process_query(content_type_uid, query, QueryMode::Validate, access)
    }

    /// Runs a query through the engine in the given mode.
    pub fn process_query(
        &self,
        content_type_uid: &str,
        query: &Value,
        mode: QueryMode,
        access: &PrivateFieldAccess,
    ) -> AppResult<ProcessedQuery> {
        let schema = self
            .registry
            .find_schema(content_type_uid)
            .ok_or_else(|| {
                AppError::NotFound(format!("content type '{content_type_uid}' does not exist"))
            })?;

        if !schema.kind().is_content_type() {
            return Err(AppError::Validation(format!(
                "'{content_type_uid}' is a component and cannot be queried directly"
            )));
        }

        let policy: &dyn DenialPolicy = match mode {
            QueryMode::Sanitize => &SanitizePolicy,
            QueryMode::Validate => &ValidatePolicy,
        };

        QueryWalker::new(self.registry.as_ref(), access, policy, self.limits)
            .root_query(schema, query)
    }

    /// Lists the UIDs of every queryable content type.
    #[must_use]
    pub fn content_type_uids(&self) -> Vec<String> {
        self.registry
            .list_schemas()
            .into_iter()
            .filter(|schema| schema.kind().is_content_type())
            .map(|schema| schema.uid().as_str().to_owned())
            .collect()
    }
}
