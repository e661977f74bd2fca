use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use quarry_application::{QueryLimits, QueryService};
use quarry_domain::{
    Attribute, AttributeKind, RelationCardinality, ScalarType, Schema, SchemaKind, SchemaUid,
};
use quarry_infrastructure::InMemorySchemaRegistry;
use serde_json::{Value, json};

use crate::dto::{QueryCheckRequest, QueryCheckResponse};
use crate::error::ApiResult;
use crate::handlers::content_types::list_content_types_handler;
use crate::state::AppState;

use super::check_query_handler;

const ARTICLE: &str = "api::article.article";

fn uid(value: &str) -> SchemaUid {
    SchemaUid::new(value).unwrap_or_else(|_| unreachable!())
}

fn attribute(name: &str, kind: AttributeKind) -> Attribute {
    Attribute::new(name, kind).unwrap_or_else(|_| unreachable!())
}

fn app_state() -> AppState {
    let article = Schema::new(
        uid(ARTICLE),
        SchemaKind::CollectionType,
        false,
        vec![
            attribute("title", AttributeKind::Scalar(ScalarType::String)),
            attribute("notes", AttributeKind::Scalar(ScalarType::Text)).with_private(true),
            attribute("password", AttributeKind::Scalar(ScalarType::Password)),
            attribute(
                "related",
                AttributeKind::Relation {
                    target: uid(ARTICLE),
                    cardinality: RelationCardinality::ManyToMany,
                },
            ),
            attribute(
                "seo",
                AttributeKind::Component {
                    component: uid("shared.seo"),
                    repeatable: false,
                },
            ),
        ],
    )
    .unwrap_or_else(|_| unreachable!());
    let seo = Schema::new(
        uid("shared.seo"),
        SchemaKind::Component,
        false,
        vec![attribute(
            "metaTitle",
            AttributeKind::Scalar(ScalarType::String),
        )],
    )
    .unwrap_or_else(|_| unreachable!());

    let registry =
        InMemorySchemaRegistry::from_schemas(vec![article, seo]).unwrap_or_else(|_| unreachable!());

    AppState {
        query_service: QueryService::new(Arc::new(registry), QueryLimits::default()),
    }
}

async fn check(
    content_type_uid: &str,
    mode: &str,
    query: Value,
    allowed_private_fields: &[&str],
) -> ApiResult<Json<QueryCheckResponse>> {
    check_query_handler(
        State(app_state()),
        Path((content_type_uid.to_owned(), mode.to_owned())),
        Json(QueryCheckRequest {
            query: Some(query),
            allowed_private_fields: allowed_private_fields
                .iter()
                .map(|path| (*path).to_owned())
                .collect(),
        }),
    )
    .await
}

fn status_of(result: ApiResult<Json<QueryCheckResponse>>) -> StatusCode {
    match result {
        Ok(response) => response.into_response().status(),
        Err(error) => error.into_response().status(),
    }
}

#[tokio::test]
async fn sanitize_drops_password_and_private_fields() {
    let response = check(
        ARTICLE,
        "sanitize",
        json!({ "fields": ["title", "notes", "password"], "sort": "password:asc,title:desc" }),
        &[],
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.mode, "sanitize");
    assert_eq!(
        response.query,
        json!({ "fields": ["title"], "sort": "title:desc" })
    );
    assert!(response.resolved.fields.iter().any(|field| field == "title"));
    assert!(!response.resolved.fields.iter().any(|field| field == "password"));
    assert_eq!(response.resolved.sort.len(), 1);
    assert_eq!(response.resolved.sort[0].path, "title");
    assert_eq!(response.resolved.sort[0].direction, "desc");
}

#[tokio::test]
async fn validate_rejects_private_filters_with_bad_request() {
    let result = check(
        ARTICLE,
        "validate",
        json!({ "filters": { "notes": { "$contains": "draft" } } }),
        &[],
    )
    .await;

    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validate_accepts_private_filters_that_were_granted() {
    let query = json!({ "filters": { "notes": { "$contains": "draft" } } });
    let response = check(ARTICLE, "validate", query.clone(), &["notes"])
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(response.mode, "validate");
    assert_eq!(response.query, query);
    assert_eq!(response.resolved.filters, Some(query["filters"].clone()));
}

#[tokio::test]
async fn validate_never_grants_password_fields() {
    let result = check(
        ARTICLE,
        "validate",
        json!({ "fields": ["password"] }),
        &["password"],
    )
    .await;

    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn populate_branches_are_reported_with_their_targets() {
    let response = check(
        ARTICLE,
        "sanitize",
        json!({ "populate": { "related": { "fields": ["title"] }, "seo": true } }),
        &[],
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let targets: Vec<(&str, Option<&str>)> = response
        .resolved
        .populate
        .iter()
        .map(|branch| (branch.attribute.as_str(), branch.target.as_deref()))
        .collect();
    assert_eq!(
        targets,
        vec![("related", Some(ARTICLE)), ("seo", Some("shared.seo"))]
    );
    assert!(response.resolved.populate[0].fragments.is_empty());
}

#[tokio::test]
async fn unknown_modes_are_bad_requests() {
    let result = check(ARTICLE, "repair", json!({}), &[]).await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_content_types_are_not_found() {
    let result = check("api::missing.missing", "sanitize", json!({}), &[]).await;
    assert_eq!(status_of(result), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn components_cannot_be_queried_directly() {
    let result = check("shared.seo", "sanitize", json!({}), &[]).await;
    assert_eq!(status_of(result), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn content_type_listing_skips_components() {
    let Json(content_types) = list_content_types_handler(State(app_state())).await;
    let uids: Vec<&str> = content_types
        .iter()
        .map(|content_type| content_type.uid.as_str())
        .collect();
    assert_eq!(uids, vec![ARTICLE]);
}
