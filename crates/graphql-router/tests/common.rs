// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use core_resolver::{
    FieldResolveFn, QueryExecutor, RawRequest, async_resolve_fn,
    access_control::{AuthorizationGate, DenyList, SecurityCapabilities},
    resolve_fn,
    schema::{ArgumentDefinition, FieldDefinition, ObjectType, SchemaBuilder},
};
use graphql_router::GraphQLRouter;
use serde_json::{Value, json};

fn constant(value: Value) -> Arc<dyn FieldResolveFn> {
    resolve_fn(move |_, _, _| Ok(value.clone()))
}

/// A router over a schema where `a` is 1, `b` is denied, `x` answers late and `y` answers
/// immediately.
pub fn router(parallel_operations: bool) -> GraphQLRouter {
    let schema = SchemaBuilder::new()
        .object(
            ObjectType::new("Query")
                .field(FieldDefinition::new("a", "Int").resolve_with(constant(json!(1))))
                .field(FieldDefinition::new("b", "Int").resolve_with(constant(json!(2))))
                .field(FieldDefinition::new("x", "String").resolve_with(async_resolve_fn(
                    |_, _| async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(json!("x"))
                    },
                )))
                .field(FieldDefinition::new("y", "String").resolve_with(constant(json!("y"))))
                .field(
                    FieldDefinition::new("echo", "String")
                        .argument(ArgumentDefinition::new("value", "String"))
                        .resolve_with(resolve_fn(|_, arguments, _| {
                            Ok(arguments.get("value").cloned().unwrap_or(Value::Null))
                        })),
                ),
        )
        .build()
        .unwrap();

    let authorization = AuthorizationGate::new(
        Arc::new(DenyList::new().deny_field("Query.b")),
        SecurityCapabilities::default(),
    );

    let executor = QueryExecutor::new(Arc::new(schema)).with_authorization(Arc::new(authorization));

    GraphQLRouter::new(Arc::new(executor)).with_parallel_operations(parallel_operations)
}

pub async fn test_body(router: &GraphQLRouter, body: &str, expected: Value) {
    let request = RawRequest {
        body: Some(body.as_bytes()),
        ..Default::default()
    };

    test_request(router, &request, expected).await
}

pub async fn test_request(router: &GraphQLRouter, request: &RawRequest<'_>, expected: Value) {
    let result = router.resolve(request).await.to_json().unwrap();

    println!(
        "!! expected: {}",
        serde_json::to_string_pretty(&expected).unwrap()
    );
    println!(
        "!! actual: {}",
        serde_json::to_string_pretty(&result).unwrap()
    );

    assert_eq!(expected, result)
}
