use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level read query parameter a violation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryParameter {
    /// The query object itself.
    Query,
    /// `filters`
    Filters,
    /// `sort`
    Sort,
    /// `fields`
    Fields,
    /// `populate`
    Populate,
    /// `_q` full-text search.
    Search,
}

impl QueryParameter {
    /// Returns the parameter name as it appears in a query.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Filters => "filters",
            Self::Sort => "sort",
            Self::Fields => "fields",
            Self::Populate => "populate",
            Self::Search => "_q",
        }
    }
}

impl Display for QueryParameter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Reason a read query was rejected in strict validation.
///
/// `path` is the dotted attribute path from the root content type, e.g.
/// `relations.name_private`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryViolation {
    /// The clause references a field absent from the schema.
    #[error("unknown field '{path}' in {parameter}")]
    UnknownField {
        /// Parameter containing the clause.
        parameter: QueryParameter,
        /// Dotted attribute path.
        path: String,
    },

    /// The clause references a private or password field.
    #[error("field '{path}' cannot be used in {parameter}: {reason}")]
    ForbiddenField {
        /// Parameter containing the clause.
        parameter: QueryParameter,
        /// Dotted attribute path.
        path: String,
        /// Short description of the restriction.
        reason: String,
    },

    /// The operator does not apply to the attribute type.
    #[error("operator '{operator}' is not supported for '{path}' in {parameter}")]
    IncompatibleOperator {
        /// Parameter containing the clause.
        parameter: QueryParameter,
        /// Dotted attribute path.
        path: String,
        /// Operator as written in the query.
        operator: String,
    },

    /// The clause has a shape the engine does not accept.
    #[error("invalid {parameter} at '{path}': {detail}")]
    InvalidStructure {
        /// Parameter containing the clause.
        parameter: QueryParameter,
        /// Dotted attribute path, empty for the parameter root.
        path: String,
        /// Description of the malformed shape.
        detail: String,
    },
}

impl QueryViolation {
    /// Returns the parameter the violation was found in.
    #[must_use]
    pub fn parameter(&self) -> QueryParameter {
        match self {
            Self::UnknownField { parameter, .. }
            | Self::ForbiddenField { parameter, .. }
            | Self::IncompatibleOperator { parameter, .. }
            | Self::InvalidStructure { parameter, .. } => *parameter,
        }
    }

    /// Returns the dotted attribute path of the offending clause.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownField { path, .. }
            | Self::ForbiddenField { path, .. }
            | Self::IncompatibleOperator { path, .. }
            | Self::InvalidStructure { path, .. } => path.as_str(),
        }
    }
}
