// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use core_resolver::{
    QueryExecutor, RawRequest, VariablesParam,
    schema::{ObjectType, SchemaBuilder},
};
use graphql_router::{GraphQLResponse, GraphQLRouter};
use serde_json::json;
use trellis_env::MapEnvironment;

mod common;

#[tokio::test]
async fn denied_field_is_null_with_one_error() {
    common::test_body(
        &common::router(false),
        r#"{"query": "{ a b }", "variables": {}}"#,
        json!({
            "data": {"a": 1, "b": null},
            "errors": [{
                "message": "Access denied to field \"Query.b\"",
                "locations": [{"line": 1, "column": 5}],
                "path": ["b"],
                "kind": "FieldAccessDenied"
            }]
        }),
    )
    .await;
}

#[tokio::test]
async fn batch_responses_keep_order() {
    for parallel_operations in [false, true] {
        common::test_body(
            &common::router(parallel_operations),
            r#"[{"query": "{x}"}, {"query": "{y}"}]"#,
            json!([
                {"data": {"x": "x"}},
                {"data": {"y": "y"}}
            ]),
        )
        .await;
    }
}

#[tokio::test]
async fn single_object_body_is_not_a_batch() {
    let router = common::router(false);
    let request = RawRequest {
        body: Some(br#"{"query": "{ y }"}"#.as_slice()),
        ..Default::default()
    };

    let response = router.resolve(&request).await;

    assert!(matches!(response, GraphQLResponse::Single(_)));
    assert_eq!(response.envelopes().len(), 1);
}

#[tokio::test]
async fn empty_batch() {
    common::test_body(&common::router(false), "[]", json!([])).await;
}

#[tokio::test]
async fn encoded_and_decoded_variables_agree() {
    let router = common::router(false);
    let query = r#"query Echo($value: String) { echo(value: $value) }"#;

    let encoded = json!({"query": query, "variables": "{\"value\": \"hi\"}"}).to_string();
    let decoded = json!({"query": query, "variables": {"value": "hi"}}).to_string();

    let expected = json!({"data": {"echo": "hi"}});
    common::test_body(&router, &encoded, expected.clone()).await;
    common::test_body(&router, &decoded, expected).await;
}

#[tokio::test]
async fn invalid_variables_fall_back() {
    let router = common::router(false);
    let query = r#"query Echo($value: String) { echo(value: $value) }"#;

    let body = json!([
        {"query": query, "variables": {"value": "first"}},
        {"query": query, "variables": "{broken"}
    ])
    .to_string();

    common::test_body(
        &router,
        &body,
        json!([
            {"data": {"echo": "first"}},
            {"data": {"echo": "first"}}
        ]),
    )
    .await;

    common::test_request(
        &router,
        &RawRequest {
            query: Some(query),
            variables: Some(VariablesParam::Encoded("{broken")),
            ..Default::default()
        },
        json!({"data": {"echo": null}}),
    )
    .await;
}

#[tokio::test]
async fn raw_query_body() {
    common::test_request(
        &common::router(false),
        &RawRequest {
            body: Some(b"{ a y }".as_slice()),
            content_type: Some("application/graphql"),
            ..Default::default()
        },
        json!({"data": {"a": 1, "y": "y"}}),
    )
    .await;
}

#[tokio::test]
async fn missing_query_is_a_validation_error() {
    common::test_request(
        &common::router(false),
        &RawRequest::default(),
        json!({
            "data": null,
            "errors": [{"message": "Missing query", "kind": "ParseOrValidationError"}]
        }),
    )
    .await;
}

#[test]
fn parallel_operations_from_env() {
    let env = MapEnvironment::from([("TRELLIS_PARALLEL_OPERATIONS", "not-a-bool")]);
    let schema = SchemaBuilder::new()
        .object(ObjectType::new("Query"))
        .build()
        .unwrap();
    let executor = Arc::new(QueryExecutor::new(Arc::new(schema)));

    assert!(GraphQLRouter::from_env(executor, &env).is_err());
}
