//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_schema_registry;
mod json_file_schema_source;

pub use in_memory_schema_registry::InMemorySchemaRegistry;
pub use json_file_schema_source::JsonFileSchemaSource;
