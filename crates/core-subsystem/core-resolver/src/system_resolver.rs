// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{sync::Arc, time::Duration};

use async_graphql_parser::{
    Pos,
    types::{BaseType, ExecutableDocument, Type},
};
use async_recursion::async_recursion;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use common::env_const::{DEFAULT_QUERY_DEPTH_LIMIT, get_query_depth_limit, get_resolve_timeout};
use trellis_env::{EnvError, Environment};

use crate::{
    access_control::{AccessDecision, AuthorizationGate},
    events::{EventSink, NoopEventSink},
    field_resolver::{FieldResolutionError, FieldResolver},
    operation_payload::QueryEntry,
    query_response::{ErrorKind, GraphQLError, ResponseEnvelope},
    resolve_context::ResponsePath,
    schema::{
        BOOLEAN_TYPE, FLOAT_TYPE, ID_TYPE, INT_TYPE, ObjectType, STRING_TYPE, Schema,
        TypeDefinition,
    },
    service::{MapServiceRegistry, ServiceRegistry},
    validation::{
        document::QueryDocument, document_validator::DocumentValidator, field::FieldNode,
        validation_error::ValidationError,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Upper bound for each resolver invocation.
    pub resolve_timeout: Option<Duration>,
    pub query_depth_limit: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            resolve_timeout: None,
            query_depth_limit: DEFAULT_QUERY_DEPTH_LIMIT,
        }
    }
}

impl ExecutionOptions {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self {
            resolve_timeout: get_resolve_timeout(env)?,
            query_depth_limit: get_query_depth_limit(env)?,
        })
    }
}

/// Executes queries against a schema.
///
/// The schema, the service registry, the authorization gate and the event sink are shared
/// read-only by every execution.
pub struct QueryExecutor {
    schema: Arc<Schema>,
    services: Arc<dyn ServiceRegistry>,
    authorization: Arc<AuthorizationGate>,
    events: Arc<dyn EventSink>,
    options: ExecutionOptions,
    root_value: Value,
}

impl QueryExecutor {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            services: Arc::new(MapServiceRegistry::new()),
            authorization: Arc::new(AuthorizationGate::allow_all()),
            events: Arc::new(NoopEventSink),
            options: ExecutionOptions::default(),
            root_value: Value::Object(Map::new()),
        }
    }

    pub fn with_services(mut self, services: Arc<dyn ServiceRegistry>) -> Self {
        self.services = services;
        self
    }

    pub fn with_authorization(mut self, authorization: Arc<AuthorizationGate>) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_options(mut self, options: ExecutionOptions) -> Self {
        self.options = options;
        self
    }

    /// The parent value of top-level fields.
    pub fn with_root_value(mut self, root_value: Value) -> Self {
        self.root_value = root_value;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub async fn execute(&self, entry: &QueryEntry) -> ResponseEnvelope {
        self.execute_with_cancellation(entry, &CancellationToken::new())
            .await
    }

    /// Execute one query. Resolvers still running when `cancellation` fires fail with a
    /// timeout error; fields resolved before that are kept.
    pub async fn execute_with_cancellation(
        &self,
        entry: &QueryEntry,
        cancellation: &CancellationToken,
    ) -> ResponseEnvelope {
        self.execute_request(
            entry.query.as_deref(),
            entry.operation_name.clone(),
            entry.variables.clone(),
            cancellation,
        )
        .await
    }

    #[instrument(name = "QueryExecutor::execute_request", skip(self, variables, cancellation))]
    pub async fn execute_request(
        &self,
        query: Option<&str>,
        operation_name: Option<String>,
        variables: Map<String, Value>,
        cancellation: &CancellationToken,
    ) -> ResponseEnvelope {
        debug!(?query, ?variables, "Executing query");

        let document = match self.validate(query, operation_name, variables) {
            Ok(document) => document,
            Err(error) => {
                warn!(%error, "Query rejected");
                return ResponseEnvelope::rejected(error.into());
            }
        };

        self.execute_document(&document, cancellation).await
    }

    /// Parse and validate a query against the schema.
    pub fn validate(
        &self,
        query: Option<&str>,
        operation_name: Option<String>,
        variables: Map<String, Value>,
    ) -> Result<QueryDocument, ValidationError> {
        let query = query
            .filter(|query| !query.trim().is_empty())
            .ok_or(ValidationError::MissingQuery)?;

        let document = parse_query(query)?;

        let document_validator = DocumentValidator::new(
            &self.schema,
            operation_name,
            variables,
            self.options.query_depth_limit,
        );

        document_validator.validate(document)
    }

    /// Execute an already validated document.
    pub async fn execute_document(
        &self,
        document: &QueryDocument,
        cancellation: &CancellationToken,
    ) -> ResponseEnvelope {
        if let AccessDecision::Deny(denied) = self.authorization.check_operation(document).await {
            warn!(operation_name = ?document.name, "Operation access denied");
            return ResponseEnvelope::rejected(GraphQLError::new(
                denied.message,
                ErrorKind::OperationAccessDenied,
            ));
        }

        let Some(root_type) = self.schema.get_object_type(&document.root_type) else {
            return ResponseEnvelope::rejected(
                ValidationError::OperationNotFound(document.root_type.clone(), Pos::default())
                    .into(),
            );
        };

        let execution = Execution {
            schema: &self.schema,
            document,
            resolver: FieldResolver::new(
                &self.schema,
                self.services.as_ref(),
                &self.authorization,
                self.events.as_ref(),
                self.options.resolve_timeout,
                cancellation,
            ),
        };

        let mut errors = vec![];
        let data = execution
            .resolve_selection(
                root_type,
                &document.fields,
                &self.root_value,
                &ResponsePath::default(),
                &mut errors,
            )
            .await;

        ResponseEnvelope {
            data: data.map(Value::Object).unwrap_or(Value::Null),
            errors,
        }
    }
}

/// State of one execution of a document.
///
/// Resolution functions return `None` when a value is null in a non-null position. The error
/// causing it has already been recorded, and the caller nulls the nearest nullable ancestor.
struct Execution<'a> {
    schema: &'a Schema,
    document: &'a QueryDocument,
    resolver: FieldResolver<'a>,
}

impl<'a> Execution<'a> {
    /// Resolve fields in document order. Fields after a failing one are still resolved so that
    /// their errors are reported too.
    #[async_recursion]
    async fn resolve_selection(
        &self,
        object_type: &ObjectType,
        fields: &[FieldNode],
        parent: &Value,
        path: &ResponsePath,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Map<String, Value>> {
        let mut data = Map::new();
        let mut nulled = false;

        for field in fields {
            let output_name = field.output_name();
            let field_path = path.field(output_name.clone());

            let value = if field.name.as_str() == "__typename" {
                Some(Value::String(object_type.name.clone()))
            } else {
                self.resolve_field(object_type, field, parent, &field_path, errors)
                    .await
            };

            match value {
                Some(value) => {
                    data.insert(output_name, value);
                }
                None => nulled = true,
            }
        }

        (!nulled).then_some(data)
    }

    async fn resolve_field(
        &self,
        object_type: &ObjectType,
        field: &FieldNode,
        parent: &Value,
        path: &ResponsePath,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Value> {
        let Some(field_definition) = object_type.get_field(field.name.as_str()) else {
            error!(field = %field.name, object_type = %object_type.name, "Field not defined");
            let error = FieldResolutionError::UndefinedField {
                type_name: object_type.name.clone(),
                field_name: field.name.to_string(),
            };
            errors.push(GraphQLError::field(&error, field, path));
            return Some(Value::Null);
        };

        let resolved = self
            .resolver
            .resolve(
                field_definition,
                field,
                object_type,
                parent,
                path,
                self.document,
            )
            .await;

        match resolved {
            Ok(value) => {
                self.complete_value(&field_definition.ty, field, value, path, errors)
                    .await
            }
            Err(error) => {
                errors.push(GraphQLError::field(&error, field, path));
                field_definition.ty.nullable.then_some(Value::Null)
            }
        }
    }

    /// Shape a resolved value according to the field's type: recurse into lists and objects,
    /// check scalars and enums, and apply null propagation.
    #[async_recursion]
    async fn complete_value(
        &self,
        ty: &Type,
        field: &FieldNode,
        value: Value,
        path: &ResponsePath,
        errors: &mut Vec<GraphQLError>,
    ) -> Option<Value> {
        if value.is_null() {
            if !ty.nullable {
                let error = FieldResolutionError::NullValue(path.to_string());
                errors.push(GraphQLError::field(&error, field, path));
                return None;
            }
            return Some(Value::Null);
        }

        let completed = match &ty.base {
            BaseType::List(elem_type) => match value {
                Value::Array(elems) => {
                    let mut completed = Vec::with_capacity(elems.len());
                    let mut nulled = false;

                    for (index, elem) in elems.into_iter().enumerate() {
                        match self
                            .complete_value(elem_type, field, elem, &path.index(index), errors)
                            .await
                        {
                            Some(elem) => completed.push(elem),
                            None => nulled = true,
                        }
                    }

                    (!nulled).then_some(Value::Array(completed))
                }
                other => {
                    let error = FieldResolutionError::InvalidValue {
                        type_name: ty.to_string(),
                        value: other.to_string(),
                    };
                    errors.push(GraphQLError::field(&error, field, path));
                    None
                }
            },
            BaseType::Named(type_name) => {
                match self.schema.get_type_definition(type_name.as_str()) {
                    Some(TypeDefinition::Object(object_type)) => self
                        .resolve_selection(object_type, &field.children, &value, path, errors)
                        .await
                        .map(Value::Object),
                    Some(type_definition) => match complete_leaf(type_definition, value) {
                        Ok(value) => Some(value),
                        Err(error) => {
                            errors.push(GraphQLError::field(&error, field, path));
                            None
                        }
                    },
                    None => {
                        let error = FieldResolutionError::InvalidValue {
                            type_name: type_name.to_string(),
                            value: value.to_string(),
                        };
                        errors.push(GraphQLError::field(&error, field, path));
                        None
                    }
                }
            }
        };

        match completed {
            Some(value) => Some(value),
            None => ty.nullable.then_some(Value::Null),
        }
    }
}

/// Check (and for `ID`, convert) a scalar or enum result.
fn complete_leaf(
    type_definition: &TypeDefinition,
    value: Value,
) -> Result<Value, FieldResolutionError> {
    let valid = match type_definition {
        TypeDefinition::Scalar(scalar) => match scalar.name.as_str() {
            INT_TYPE => value
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok()),
            FLOAT_TYPE => value.is_number(),
            STRING_TYPE => value.is_string(),
            ID_TYPE => value.is_string() || value.is_i64() || value.is_u64(),
            BOOLEAN_TYPE => value.is_boolean(),
            _ => true,
        },
        TypeDefinition::Enum(enum_type) => value
            .as_str()
            .is_some_and(|name| enum_type.has_value(name)),
        TypeDefinition::Object(_) | TypeDefinition::InputObject(_) => false,
    };

    if !valid {
        return Err(FieldResolutionError::InvalidValue {
            type_name: type_definition.name().to_string(),
            value: value.to_string(),
        });
    }

    match value {
        Value::Number(number) if type_definition.name() == ID_TYPE => {
            Ok(Value::String(number.to_string()))
        }
        value => Ok(value),
    }
}

#[instrument(name = "system_resolver::parse_query")]
fn parse_query(query: &str) -> Result<ExecutableDocument, ValidationError> {
    async_graphql_parser::parse_query(query).map_err(|error| {
        error!(%error, "Failed to parse query");
        let (message, pos1, pos2) = match error {
            async_graphql_parser::Error::Syntax {
                message,
                start,
                end,
            } => {
                // Error::Syntax's message is formatted with newlines, escape them properly
                let message = message.escape_debug();
                (format!("Syntax error:\\n{message}"), start, end)
            }
            async_graphql_parser::Error::MultipleRoots { root, schema, pos } => {
                (format!("Multiple roots of {root} type"), schema, Some(pos))
            }
            async_graphql_parser::Error::MissingQueryRoot { pos } => {
                ("Missing query root".to_string(), pos, None)
            }
            async_graphql_parser::Error::MultipleOperations {
                anonymous,
                operation,
            } => (
                "Multiple operations".to_string(),
                anonymous,
                Some(operation),
            ),
            async_graphql_parser::Error::OperationDuplicated {
                operation: _,
                first,
                second,
            } => ("Operation duplicated".to_string(), first, Some(second)),
            async_graphql_parser::Error::FragmentDuplicated {
                fragment,
                first,
                second,
            } => (
                format!("Fragment {fragment} duplicated"),
                first,
                Some(second),
            ),
            async_graphql_parser::Error::MissingOperation => {
                ("Missing operation".to_string(), Pos::default(), None)
            }
            _ => ("Unknown error".to_string(), Pos::default(), None),
        };

        ValidationError::QueryParsingFailed(message, pos1, pos2)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use serde_json::json;

    use super::*;
    use crate::{
        access_control::{DenyList, SecurityCapabilities},
        events::{EventDispatcher, ResolvePhase},
        field_resolver::{async_resolve_fn, resolve_fn},
        schema::{EnumType, FieldDefinition, SchemaBuilder},
        service::MethodTable,
    };

    struct Fixture {
        schema: Arc<Schema>,
        resolutions: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let resolutions = Arc::new(AtomicUsize::new(0));

        let counted = |value: Value| {
            let resolutions = resolutions.clone();
            resolve_fn(move |_, _, _| {
                resolutions.fetch_add(1, Ordering::SeqCst);
                Ok(value.clone())
            })
        };

        let schema = SchemaBuilder::new()
            .object(
                ObjectType::new("Query")
                    .field(FieldDefinition::new("a", "Int").resolve_with(counted(json!(1))))
                    .field(FieldDefinition::new("b", "Int").resolve_with(counted(json!(2))))
                    .field(
                        FieldDefinition::new("strict", "Int!").resolve_with(counted(Value::Null)),
                    )
                    .field(FieldDefinition::new("badInt", "Int").resolve_with(counted(json!("x"))))
                    .field(
                        FieldDefinition::new("status", "Status")
                            .resolve_with(counted(json!("LIVE"))),
                    )
                    .field(FieldDefinition::new("posts", "[Post]").service_method("blog", "posts"))
                    .field(
                        FieldDefinition::new("drafts", "[Post]").service_method("shop", "drafts"),
                    )
                    .field(FieldDefinition::new("concert", "Concert").resolve_with(counted(
                        json!({"id": 7, "title": "Encore", "headliner": null}),
                    )))
                    .field(FieldDefinition::new("slow", "Int").resolve_with(async_resolve_fn(
                        |_, _| async {
                            tokio::time::sleep(Duration::from_secs(60)).await;
                            Ok(json!(0))
                        },
                    ))),
            )
            .object(
                ObjectType::new("Post")
                    .field(FieldDefinition::new("id", "ID!"))
                    .field(FieldDefinition::new("title", "String!")),
            )
            .object(
                ObjectType::new("Concert")
                    .field(FieldDefinition::new("id", "ID!"))
                    .field(FieldDefinition::new("title", "String!"))
                    .field(FieldDefinition::new("headliner", "Artist!")),
            )
            .object(ObjectType::new("Artist").field(FieldDefinition::new("name", "String")))
            .enumeration(EnumType::new("Status", &["LIVE", "CANCELLED"]))
            .build()
            .unwrap();

        Fixture {
            schema: Arc::new(schema),
            resolutions,
        }
    }

    fn blog_service() -> Arc<MapServiceRegistry> {
        Arc::new(MapServiceRegistry::new().register(
            "blog",
            Arc::new(MethodTable::new().with_method(
                "posts",
                resolve_fn(|_, _, _| {
                    Ok(json!([
                        {"id": 1, "title": "First"},
                        {"id": "p2", "title": null}
                    ]))
                }),
            )),
        ))
    }

    fn deny(policy: DenyList) -> Arc<AuthorizationGate> {
        Arc::new(AuthorizationGate::new(
            Arc::new(policy),
            SecurityCapabilities::default(),
        ))
    }

    async fn run(executor: &QueryExecutor, query: &str) -> Value {
        executor
            .execute(&QueryEntry::new(query))
            .await
            .to_json()
            .unwrap()
    }

    #[tokio::test]
    async fn field_denial_keeps_siblings() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema)
            .with_authorization(deny(DenyList::new().deny_field("Query.b")));

        assert_eq!(
            run(&executor, "{ a b }").await,
            json!({
                "data": {"a": 1, "b": null},
                "errors": [{
                    "message": "Access denied to field \"Query.b\"",
                    "locations": [{"line": 1, "column": 5}],
                    "path": ["b"],
                    "kind": "FieldAccessDenied"
                }]
            })
        );
        assert_eq!(fixture.resolutions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn operation_denial_resolves_nothing() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema)
            .with_authorization(deny(DenyList::new().deny_operation("Stats")));

        assert_eq!(
            run(&executor, "query Stats { a b }").await,
            json!({
                "data": null,
                "errors": [{
                    "message": "Access denied to operation \"Stats\"",
                    "kind": "OperationAccessDenied"
                }]
            })
        );
        assert_eq!(fixture.resolutions.load(Ordering::SeqCst), 0);

        assert_eq!(
            run(&executor, "query Other { a }").await,
            json!({"data": {"a": 1}})
        );
    }

    #[tokio::test]
    async fn disabled_operation_check_skips_policy() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema).with_authorization(Arc::new(
            AuthorizationGate::new(
                Arc::new(DenyList::new().deny_operation("Stats")),
                SecurityCapabilities {
                    operation_check: false,
                    field_check: true,
                },
            ),
        ));

        assert_eq!(
            run(&executor, "query Stats { a }").await,
            json!({"data": {"a": 1}})
        );
    }

    #[tokio::test]
    async fn missing_service_is_scoped_to_field() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema).with_services(blog_service());

        let response = run(&executor, "{ a drafts { id } b }").await;

        assert_eq!(response["data"], json!({"a": 1, "drafts": null, "b": 2}));
        assert_eq!(
            response["errors"],
            json!([{
                "message": "Resolve service \"shop\" not found for field \"drafts\"",
                "locations": [{"line": 1, "column": 5}],
                "path": ["drafts"],
                "kind": "ServiceNotFound"
            }])
        );
    }

    #[tokio::test]
    async fn list_items_carry_their_index() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema).with_services(blog_service());

        let response = run(&executor, "{ posts { id title } }").await;

        assert_eq!(
            response["data"],
            json!({"posts": [{"id": "1", "title": "First"}, null]})
        );
        assert_eq!(response["errors"][0]["path"], json!(["posts", 1, "title"]));
        assert_eq!(response["errors"][0]["kind"], json!("ResolutionRuntimeError"));
    }

    #[tokio::test]
    async fn null_propagates_to_nearest_nullable_ancestor() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema.clone());

        let response = run(&executor, "{ concert { title headliner { name } } a }").await;
        assert_eq!(response["data"], json!({"concert": null, "a": 1}));
        assert_eq!(
            response["errors"][0]["path"],
            json!(["concert", "headliner"])
        );

        let response = run(&executor, "{ a strict b }").await;
        assert_eq!(response["data"], Value::Null);
        assert_eq!(response["errors"].as_array().map(Vec::len), Some(1));
        // Siblings after the failing field still ran
        assert_eq!(fixture.resolutions.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn events_wrap_each_resolution() {
        let fixture = fixture();
        let log = Arc::new(Mutex::new(vec![]));
        let mut dispatcher = EventDispatcher::new();

        let pre_log = log.clone();
        dispatcher.subscribe(ResolvePhase::PreResolve, move |event| {
            pre_log
                .lock()
                .unwrap()
                .push(format!("pre {}", event.path));
        });
        let post_log = log.clone();
        dispatcher.subscribe(ResolvePhase::PostResolve, move |event| {
            post_log
                .lock()
                .unwrap()
                .push(format!("post {}", event.path));
            if event.field.name == "b" {
                event.set_resolved_value(json!(20));
            }
        });

        let executor =
            QueryExecutor::new(fixture.schema).with_event_sink(Arc::new(dispatcher));

        assert_eq!(
            run(&executor, "{ a b __typename }").await,
            json!({"data": {"a": 1, "b": 20, "__typename": "Query"}})
        );
        assert_eq!(
            *log.lock().unwrap(),
            vec!["pre a", "post a", "pre b", "post b"]
        );
    }

    #[tokio::test]
    async fn output_values_are_checked() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema);

        let response = run(
            &executor,
            "{ badInt status concert { id typename: __typename } }",
        )
        .await;

        assert_eq!(
            response["data"],
            json!({
                "badInt": null,
                "status": "LIVE",
                "concert": {"id": "7", "typename": "Concert"}
            })
        );
        assert_eq!(
            response["errors"][0]["message"],
            json!("Value \"x\" is not valid for type \"Int\"")
        );
    }

    #[tokio::test]
    async fn timed_out_field_keeps_siblings() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema).with_options(ExecutionOptions {
            resolve_timeout: Some(Duration::from_millis(10)),
            ..Default::default()
        });

        let response = run(&executor, "{ a slow b }").await;

        assert_eq!(response["data"], json!({"a": 1, "slow": null, "b": 2}));
        assert_eq!(response["errors"][0]["kind"], json!("ResolutionTimeout"));
        assert_eq!(response["errors"][0]["path"], json!(["slow"]));
    }

    #[tokio::test]
    async fn rejected_queries() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema);

        assert_eq!(
            executor
                .execute(&QueryEntry::default())
                .await
                .to_json()
                .unwrap(),
            json!({
                "data": null,
                "errors": [{"message": "Missing query", "kind": "ParseOrValidationError"}]
            })
        );

        let response = run(&executor, "{ a").await;
        assert_eq!(response["data"], Value::Null);
        assert_eq!(response["errors"][0]["kind"], json!("ParseOrValidationError"));
        assert!(response["errors"][0]["locations"].is_array());

        let response = run(&executor, "{ nope }").await;
        assert_eq!(response["errors"][0]["kind"], json!("ParseOrValidationError"));
        assert_eq!(fixture.resolutions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancellation_keeps_resolved_fields() {
        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema);

        let cancellation = CancellationToken::new();
        let canceller = cancellation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let response = executor
            .execute_with_cancellation(&QueryEntry::new("{ a slow b }"), &cancellation)
            .await
            .to_json()
            .unwrap();

        assert_eq!(response["data"], json!({"a": 1, "slow": null, "b": null}));
        assert_eq!(response["errors"][0]["path"], json!(["slow"]));
        assert_eq!(response["errors"][0]["kind"], json!("ResolutionTimeout"));
        assert_eq!(response["errors"][1]["path"], json!(["b"]));
        assert_eq!(response["errors"][1]["kind"], json!("ResolutionTimeout"));
    }

    #[tokio::test]
    async fn undefined_field_is_reported_by_name() {
        use async_graphql_parser::types::OperationType;
        use async_graphql_value::Name;
        use indexmap::IndexMap;

        let fixture = fixture();
        let executor = QueryExecutor::new(fixture.schema);

        let field = |name: &str, column: usize| FieldNode {
            alias: None,
            name: Name::new(name),
            arguments: IndexMap::new(),
            children: vec![],
            pos: Pos { line: 1, column },
        };
        let document = QueryDocument {
            name: None,
            operation_type: OperationType::Query,
            root_type: "Query".to_string(),
            fields: vec![field("ghost", 3), field("a", 9)],
        };

        let response = executor
            .execute_document(&document, &CancellationToken::new())
            .await
            .to_json()
            .unwrap();

        assert_eq!(
            response,
            json!({
                "data": {"ghost": null, "a": 1},
                "errors": [{
                    "message": "Field \"ghost\" is not defined on type \"Query\"",
                    "locations": [{"line": 1, "column": 3}],
                    "path": ["ghost"],
                    "kind": "ResolutionRuntimeError"
                }]
            })
        );
    }

    #[test]
    fn options_from_env() {
        let env = trellis_env::MapEnvironment::from([
            ("TRELLIS_RESOLVE_TIMEOUT_MS", "250"),
            ("TRELLIS_QUERY_DEPTH_LIMIT", "8"),
        ]);

        assert_eq!(
            ExecutionOptions::from_env(&env).unwrap(),
            ExecutionOptions {
                resolve_timeout: Some(Duration::from_millis(250)),
                query_depth_limit: 8,
            }
        );
    }
}
