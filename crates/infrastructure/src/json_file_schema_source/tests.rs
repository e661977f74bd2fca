use quarry_application::{SchemaRegistry, SchemaSource};
use quarry_core::AppError;
use quarry_domain::{Attribute, AttributeKind, RelationCardinality, ScalarType};

use crate::InMemorySchemaRegistry;

use super::JsonFileSchemaSource;

const DOCUMENT_SCHEMA: &str = r#"{
    "uid": "api::document.document",
    "kind": "collectionType",
    "draftAndPublish": true,
    "attributes": {
        "name": { "type": "string" },
        "name_private": { "type": "string", "private": true },
        "name_non_searchable": { "type": "string", "searchable": false },
        "password": { "type": "password" },
        "relations": { "type": "relation", "relation": "oneToMany", "target": "api::document.document" },
        "componentA": { "type": "component", "component": "default.component-a", "repeatable": false },
        "dz": { "type": "dynamiczone", "components": ["default.component-a"] },
        "media": { "type": "media", "multiple": true, "allowedTypes": ["images"] }
    }
}"#;

const SHARED_SCHEMAS: &str = r#"[
    {
        "uid": "default.component-a",
        "kind": "component",
        "attributes": { "name": { "type": "string" } }
    },
    {
        "uid": "plugin::upload.file",
        "kind": "collectionType",
        "attributes": { "url": { "type": "string" } }
    }
]"#;

#[tokio::test]
async fn load_schemas_reads_every_json_document_in_a_directory() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let written = tokio::fs::write(directory.path().join("document.json"), DOCUMENT_SCHEMA).await;
    assert!(written.is_ok());
    let written = tokio::fs::write(directory.path().join("shared.json"), SHARED_SCHEMAS).await;
    assert!(written.is_ok());
    let written = tokio::fs::write(directory.path().join("notes.txt"), "not a schema").await;
    assert!(written.is_ok());

    let source = JsonFileSchemaSource::new(directory.path());
    let schemas = source.load_schemas().await;
    assert!(schemas.is_ok());
    assert_eq!(schemas.unwrap_or_default().len(), 3);

    let registry = InMemorySchemaRegistry::load(&source).await;
    assert!(registry.is_ok());
    let registry = registry.unwrap_or_else(|_| unreachable!());

    let Some(document) = registry.find_schema("api::document.document") else {
        unreachable!()
    };
    let names: Vec<&str> = document.attributes().iter().map(Attribute::name).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "documentId",
            "name",
            "name_private",
            "name_non_searchable",
            "password",
            "relations",
            "componentA",
            "dz",
            "media",
            "createdAt",
            "updatedAt",
            "publishedAt",
        ]
    );

    assert!(document.attribute("name_private").is_some_and(Attribute::is_private));
    assert!(
        document
            .attribute("name_non_searchable")
            .is_some_and(|attribute| !attribute.is_searchable())
    );
    assert!(document.attribute("password").is_some_and(Attribute::is_password));
    assert!(matches!(
        document.attribute("relations").map(Attribute::kind),
        Some(AttributeKind::Relation { cardinality: RelationCardinality::OneToMany, .. })
    ));
    assert!(matches!(
        document.attribute("media").map(Attribute::kind),
        Some(AttributeKind::Media { multiple: true })
    ));
}

#[tokio::test]
async fn load_schemas_reads_a_single_file() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let path = directory.path().join("shared.json");
    let written = tokio::fs::write(&path, SHARED_SCHEMAS).await;
    assert!(written.is_ok());

    let schemas = JsonFileSchemaSource::new(&path).load_schemas().await;
    assert!(schemas.is_ok());

    let schemas = schemas.unwrap_or_default();
    assert_eq!(schemas.len(), 2);
    assert_eq!(
        schemas[0].attribute("name").map(|attribute| attribute.kind().scalar_type()),
        Some(Some(ScalarType::String))
    );
}

#[tokio::test]
async fn load_schemas_rejects_unknown_attribute_types() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let path = directory.path().join("broken.json");
    let written = tokio::fs::write(
        &path,
        r#"{ "uid": "api::broken.broken", "kind": "collectionType", "attributes": { "shape": { "type": "geometry" } } }"#,
    )
    .await;
    assert!(written.is_ok());

    let result = JsonFileSchemaSource::new(&path).load_schemas().await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn load_schemas_requires_relation_targets() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let path = directory.path().join("broken.json");
    let written = tokio::fs::write(
        &path,
        r#"{ "uid": "api::broken.broken", "kind": "collectionType", "attributes": { "owner": { "type": "relation", "relation": "manyToOne" } } }"#,
    )
    .await;
    assert!(written.is_ok());

    let result = JsonFileSchemaSource::new(&path).load_schemas().await;
    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("target")));
}

#[tokio::test]
async fn load_schemas_reports_malformed_json() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let path = directory.path().join("broken.json");
    let written = tokio::fs::write(&path, "{ \"uid\": ").await;
    assert!(written.is_ok());

    let result = JsonFileSchemaSource::new(&path).load_schemas().await;
    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("broken.json")));
}

#[tokio::test]
async fn load_schemas_fails_for_missing_paths() {
    let directory = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
    let result = JsonFileSchemaSource::new(directory.path().join("missing"))
        .load_schemas()
        .await;
    assert!(matches!(result, Err(AppError::Internal(_))));
}
