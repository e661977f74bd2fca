use quarry_application::SchemaRegistry;
use quarry_core::AppError;
use quarry_domain::{
    Attribute, AttributeKind, MEDIA_SCHEMA_UID, RelationCardinality, ScalarType, Schema,
    SchemaKind, SchemaUid,
};

use super::InMemorySchemaRegistry;

fn uid(value: &str) -> SchemaUid {
    SchemaUid::new(value).unwrap_or_else(|_| unreachable!())
}

fn attribute(name: &str, kind: AttributeKind) -> Attribute {
    Attribute::new(name, kind).unwrap_or_else(|_| unreachable!())
}

fn schema(value: &str, kind: SchemaKind, attributes: Vec<Attribute>) -> Schema {
    Schema::new(uid(value), kind, false, attributes).unwrap_or_else(|_| unreachable!())
}

fn article(attributes: Vec<Attribute>) -> Schema {
    schema("api::article.article", SchemaKind::CollectionType, attributes)
}

fn seo_component() -> Schema {
    schema(
        "shared.seo",
        SchemaKind::Component,
        vec![attribute("title", AttributeKind::Scalar(ScalarType::String))],
    )
}

#[test]
fn registry_lists_schemas_in_uid_order() {
    let registry = InMemorySchemaRegistry::from_schemas(vec![
        seo_component(),
        article(vec![attribute(
            "seo",
            AttributeKind::Component {
                component: uid("shared.seo"),
                repeatable: false,
            },
        )]),
    ])
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(registry.len(), 2);
    let listed: Vec<&str> = registry
        .list_schemas()
        .into_iter()
        .map(|schema| schema.uid().as_str())
        .collect();
    assert_eq!(listed, vec!["api::article.article", "shared.seo"]);
    assert!(registry.find_schema("shared.seo").is_some());
    assert!(registry.find_schema("shared.missing").is_none());
}

#[test]
fn registry_rejects_duplicate_uids() {
    let result = InMemorySchemaRegistry::from_schemas(vec![seo_component(), seo_component()]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn registry_rejects_dangling_relation_targets() {
    let result = InMemorySchemaRegistry::from_schemas(vec![article(vec![attribute(
        "author",
        AttributeKind::Relation {
            target: uid("api::author.author"),
            cardinality: RelationCardinality::ManyToOne,
        },
    )])]);
    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("api::author.author")));
}

#[test]
fn registry_rejects_relations_to_components() {
    let result = InMemorySchemaRegistry::from_schemas(vec![
        seo_component(),
        article(vec![attribute(
            "seo",
            AttributeKind::Relation {
                target: uid("shared.seo"),
                cardinality: RelationCardinality::OneToOne,
            },
        )]),
    ]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn registry_rejects_dynamic_zones_over_content_types() {
    let result = InMemorySchemaRegistry::from_schemas(vec![article(vec![attribute(
        "blocks",
        AttributeKind::DynamicZone {
            components: vec![uid("api::article.article")],
        },
    )])]);
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn media_attributes_require_the_upload_schema() {
    let media = attribute("cover", AttributeKind::Media { multiple: false });

    let missing = InMemorySchemaRegistry::from_schemas(vec![article(vec![media.clone()])]);
    assert!(matches!(missing, Err(AppError::Validation(message)) if message.contains(MEDIA_SCHEMA_UID)));

    let upload = schema(
        MEDIA_SCHEMA_UID,
        SchemaKind::CollectionType,
        vec![attribute("url", AttributeKind::Scalar(ScalarType::String))],
    );
    let registry = InMemorySchemaRegistry::from_schemas(vec![article(vec![media]), upload]);
    assert!(registry.is_ok());
}
