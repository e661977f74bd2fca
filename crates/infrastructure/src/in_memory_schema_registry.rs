use std::collections::BTreeMap;

use quarry_application::{SchemaRegistry, SchemaSource};
use quarry_core::{AppError, AppResult};
use quarry_domain::{Attribute, AttributeKind, Schema};
use tracing::info;

#[cfg(test)]
mod tests;

/// Load-once schema registry held in memory.
///
/// Every relation, component, dynamic-zone and media reference is checked
/// on construction, so lookups during a query never dangle.
#[derive(Debug, Default)]
pub struct InMemorySchemaRegistry {
    schemas: BTreeMap<String, Schema>,
}

impl InMemorySchemaRegistry {
    /// Builds a registry from schema definitions.
    pub fn from_schemas(schemas: Vec<Schema>) -> AppResult<Self> {
        let mut by_uid = BTreeMap::new();
        for schema in schemas {
            let uid = schema.uid().as_str().to_owned();
            if by_uid.contains_key(&uid) {
                return Err(AppError::Validation(format!(
                    "schema '{uid}' is defined more than once"
                )));
            }

            by_uid.insert(uid, schema);
        }

        for schema in by_uid.values() {
            for attribute in schema.attributes() {
                check_references(&by_uid, schema, attribute)?;
            }
        }

        info!(schemas = by_uid.len(), "schema registry loaded");
        Ok(Self { schemas: by_uid })
    }

    /// Loads every schema from a source and builds the registry.
    pub async fn load(source: &dyn SchemaSource) -> AppResult<Self> {
        Self::from_schemas(source.load_schemas().await?)
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns whether no schema is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl SchemaRegistry for InMemorySchemaRegistry {
    fn find_schema(&self, uid: &str) -> Option<&Schema> {
        self.schemas.get(uid)
    }

    fn list_schemas(&self) -> Vec<&Schema> {
        self.schemas.values().collect()
    }
}

fn check_references(
    schemas: &BTreeMap<String, Schema>,
    owner: &Schema,
    attribute: &Attribute,
) -> AppResult<()> {
    for target_uid in attribute.kind().referenced_uids() {
        let Some(target) = schemas.get(target_uid) else {
            return Err(AppError::Validation(format!(
                "attribute '{}' of schema '{}' references unknown schema '{target_uid}'",
                attribute.name(),
                owner.uid()
            )));
        };

        let expects_component = matches!(
            attribute.kind(),
            AttributeKind::Component { .. } | AttributeKind::DynamicZone { .. }
        );
        if expects_component == target.kind().is_content_type() {
            return Err(AppError::Validation(format!(
                "attribute '{}' of schema '{}' cannot reference {} '{target_uid}'",
                attribute.name(),
                owner.uid(),
                target.kind().as_str()
            )));
        }
    }

    Ok(())
}
