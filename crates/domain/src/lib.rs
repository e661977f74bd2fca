//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod query;
mod schema;

pub use query::{FilterOperator, SortDirection};
pub use schema::{
    Attribute, AttributeKind, MEDIA_SCHEMA_UID, RelationCardinality, ScalarType, Schema,
    SchemaKind, SchemaUid,
};
