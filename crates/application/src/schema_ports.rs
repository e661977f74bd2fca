use async_trait::async_trait;
use quarry_core::AppResult;
use quarry_domain::Schema;

/// Read-only view over every registered schema.
///
/// Implementations are fully loaded before the first query is processed and
/// never change afterwards.
pub trait SchemaRegistry: Send + Sync {
    /// Looks up a content type or component schema by UID.
    fn find_schema(&self, uid: &str) -> Option<&Schema>;

    /// Lists registered schemas in UID order.
    fn list_schemas(&self) -> Vec<&Schema>;
}

/// Port loading schema definitions from an external store.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Loads every schema definition.
    async fn load_schemas(&self) -> AppResult<Vec<Schema>>;
}
