use std::collections::BTreeSet;

use quarry_core::{AppError, AppResult};
use quarry_domain::{SchemaUid, SortDirection};
use serde_json::Value;

/// Default recursion budget for one query.
pub const DEFAULT_MAX_QUERY_DEPTH: usize = 32;

/// How disallowed clauses are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Disallowed clauses are dropped and the narrowed query is returned.
    Sanitize,
    /// The first disallowed clause rejects the whole query.
    Validate,
}

impl QueryMode {
    /// Parses transport value into a query mode.
    pub fn parse_transport(value: &str) -> AppResult<Self> {
        match value {
            "sanitize" => Ok(Self::Sanitize),
            "validate" => Ok(Self::Validate),
            _ => Err(AppError::Validation(format!(
                "unknown query mode '{value}'"
            ))),
        }
    }

    /// Returns the stable transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sanitize => "sanitize",
            Self::Validate => "validate",
        }
    }
}

/// Engine limits applied to every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    max_depth: usize,
}

impl QueryLimits {
    /// Creates limits with a positive recursion budget.
    pub fn new(max_depth: usize) -> AppResult<Self> {
        if max_depth == 0 {
            return Err(AppError::Validation(
                "query max depth must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { max_depth })
    }

    /// Returns how many nested levels a query may descend.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_QUERY_DEPTH,
        }
    }
}

/// Private attributes the caller was explicitly granted.
///
/// Entries are dotted attribute paths from the root content type, such as
/// `name_private` or `relations.name_private`. Dynamic-zone paths skip the
/// component UID. Password attributes are never unlocked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrivateFieldAccess {
    /// Readable private attribute paths.
    pub readable_fields: BTreeSet<String>,
}

impl PrivateFieldAccess {
    /// Creates access for the given attribute paths.
    #[must_use]
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            readable_fields: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns whether the private attribute at `path` is readable.
    #[must_use]
    pub fn allows(&self, path: &str) -> bool {
        self.readable_fields.contains(path)
    }
}

/// One effective ordering entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortEntry {
    /// Dotted attribute path relative to the sorted schema.
    pub path: String,
    /// Sort direction.
    pub direction: SortDirection,
    /// Whether the direction was written in the query.
    pub explicit: bool,
}

/// Scalar columns returned for each entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    /// Identifier columns, always returned.
    pub identifiers: Vec<String>,
    /// Selected attribute columns in schema order for wildcards, request order otherwise.
    pub attributes: Vec<String>,
    /// Whether every visible attribute was selected.
    pub wildcard: bool,
}

impl FieldSelection {
    /// Returns identifiers followed by attributes.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.identifiers
            .iter()
            .chain(self.attributes.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Full-text search resolved against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPlan {
    /// Search term as requested.
    pub term: String,
    /// Attributes the term is matched against.
    pub attributes: Vec<String>,
}

/// Component variant populated inside a dynamic zone.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateFragment {
    /// Component schema.
    pub component: SchemaUid,
    /// Query applied to entries of that component.
    pub query: ResolvedQuery,
}

/// What a populated attribute loads.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateTarget {
    /// Relation, component or media target.
    Schema {
        /// Target schema.
        uid: SchemaUid,
        /// Query applied to the target entries.
        query: Box<ResolvedQuery>,
    },
    /// Selected dynamic-zone variants.
    Fragments(Vec<PopulateFragment>),
}

/// One populated attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateBranch {
    /// Attribute name on the parent schema.
    pub attribute: String,
    /// Loaded target.
    pub target: PopulateTarget,
}

/// Effective read plan for one schema level.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    /// Narrowed filter tree, if any clause survived.
    pub filters: Option<Value>,
    /// Ordering; falls back to the primary key ascending.
    pub order: Vec<SortEntry>,
    /// Returned scalar columns.
    pub selection: FieldSelection,
    /// Populated attributes.
    pub populate: Vec<PopulateBranch>,
    /// Full-text search, root level only.
    pub search: Option<SearchPlan>,
    /// Whether a populated relation returns its entry count instead of entries.
    pub count: bool,
}

/// Result of running a query through the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedQuery {
    /// Query in the caller's notation with disallowed clauses removed.
    pub query: Value,
    /// Resolved plan for the root content type.
    pub resolved: ResolvedQuery,
}
