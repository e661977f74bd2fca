use std::str::FromStr;

use quarry_core::{AppError, AppResult};
use quarry_domain::{
    Attribute, AttributeKind, RelationCardinality, ScalarType, Schema, SchemaKind, SchemaUid,
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaDefinition {
    uid: String,
    kind: SchemaKind,
    #[serde(default)]
    draft_and_publish: bool,
    #[serde(default)]
    attributes: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AttributeDefinition {
    #[serde(rename = "type")]
    attribute_type: String,
    #[serde(default)]
    private: bool,
    searchable: Option<bool>,
    relation: Option<RelationCardinality>,
    target: Option<String>,
    component: Option<String>,
    #[serde(default)]
    repeatable: bool,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    multiple: bool,
}

/// Parses one document holding a schema object or an array of them.
/// Attributes keep their document order.
pub(super) fn parse_schema_document(contents: &str) -> AppResult<Vec<Schema>> {
    let document: Value = serde_json::from_str(contents)
        .map_err(|error| AppError::Validation(format!("malformed JSON: {error}")))?;

    let definitions = match document {
        Value::Array(items) => items,
        Value::Object(_) => vec![document],
        _ => {
            return Err(AppError::Validation(
                "a schema document must be an object or an array of objects".to_owned(),
            ));
        }
    };

    definitions.into_iter().map(parse_schema).collect()
}

fn parse_schema(value: Value) -> AppResult<Schema> {
    let definition: SchemaDefinition = serde_json::from_value(value)
        .map_err(|error| AppError::Validation(format!("invalid schema: {error}")))?;
    let uid = SchemaUid::new(definition.uid)?;

    let mut attributes = Vec::with_capacity(definition.attributes.len());
    for (name, value) in definition.attributes {
        let attribute: AttributeDefinition = serde_json::from_value(value).map_err(|error| {
            AppError::Validation(format!("invalid attribute '{name}' in schema '{uid}': {error}"))
        })?;
        attributes.push(into_attribute(&uid, name, attribute)?);
    }

    Schema::new(uid, definition.kind, definition.draft_and_publish, attributes)
}

fn into_attribute(
    uid: &SchemaUid,
    name: String,
    definition: AttributeDefinition,
) -> AppResult<Attribute> {
    let missing = |key: &str| {
        AppError::Validation(format!(
            "attribute '{name}' in schema '{uid}' requires '{key}'"
        ))
    };

    let kind = match definition.attribute_type.as_str() {
        "relation" => AttributeKind::Relation {
            target: SchemaUid::new(definition.target.ok_or_else(|| missing("target"))?)?,
            cardinality: definition.relation.ok_or_else(|| missing("relation"))?,
        },
        "component" => AttributeKind::Component {
            component: SchemaUid::new(definition.component.ok_or_else(|| missing("component"))?)?,
            repeatable: definition.repeatable,
        },
        "dynamiczone" => AttributeKind::DynamicZone {
            components: definition
                .components
                .into_iter()
                .map(SchemaUid::new)
                .collect::<AppResult<Vec<_>>>()?,
        },
        "media" => AttributeKind::Media {
            multiple: definition.multiple,
        },
        other => AttributeKind::Scalar(ScalarType::from_str(other)?),
    };

    let attribute = Attribute::new(name, kind)?.with_private(definition.private);
    Ok(match definition.searchable {
        Some(searchable) => attribute.with_searchable(searchable),
        None => attribute,
    })
}
