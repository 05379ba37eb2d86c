// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument, warn};

use crate::{
    access_control::{AccessDecision, AccessDenied, AuthorizationGate},
    events::{EventSink, ResolveEvent},
    query_response::ErrorKind,
    resolve_context::{ResolveContext, ResponsePath},
    schema::{FieldDefinition, FieldResolution, ObjectType, Schema},
    service::ServiceRegistry,
    validation::{document::QueryDocument, field::FieldNode, underlying_type},
};

/// Computes the value of a field from its parent value and arguments.
#[async_trait]
pub trait FieldResolveFn: Send + Sync {
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        context: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError>;
}

struct SyncResolveFn<F>(F);

#[async_trait]
impl<F> FieldResolveFn for SyncResolveFn<F>
where
    F: Fn(&Value, &Map<String, Value>, &ResolveContext<'_>) -> Result<Value, ResolverError>
        + Send
        + Sync,
{
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        context: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        (self.0)(parent, arguments, context)
    }
}

/// Wrap a synchronous function as a resolver.
pub fn resolve_fn<F>(f: F) -> Arc<dyn FieldResolveFn>
where
    F: Fn(&Value, &Map<String, Value>, &ResolveContext<'_>) -> Result<Value, ResolverError>
        + Send
        + Sync
        + 'static,
{
    Arc::new(SyncResolveFn(f))
}

struct AsyncResolveFn<F>(F);

#[async_trait]
impl<F, Fut> FieldResolveFn for AsyncResolveFn<F>
where
    F: Fn(Value, Map<String, Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ResolverError>> + Send,
{
    async fn resolve(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        _context: &ResolveContext<'_>,
    ) -> Result<Value, ResolverError> {
        (self.0)(parent.clone(), arguments.clone()).await
    }
}

/// Wrap an async function taking owned copies of the parent value and arguments. Resolvers
/// that need the [ResolveContext] implement [FieldResolveFn] directly.
pub fn async_resolve_fn<F, Fut>(f: F) -> Arc<dyn FieldResolveFn>
where
    F: Fn(Value, Map<String, Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
{
    Arc::new(AsyncResolveFn(f))
}

/// Failure reported by a resolver.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("{0}")]
    Message(String),

    #[error("{0}")]
    Delegate(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        ResolverError::Message(message.into())
    }
}

#[derive(Error, Debug)]
pub enum FieldResolutionError {
    #[error("{0}")]
    AccessDenied(#[from] AccessDenied),

    #[error("Resolve service \"{service_id}\" not found for field \"{field_name}\"")]
    ServiceNotFound {
        service_id: String,
        field_name: String,
    },

    #[error(
        "Resolve method \"{method_name}\" not found in \"{service_id}\" service for field \"{field_name}\""
    )]
    MethodNotFound {
        service_id: String,
        method_name: String,
        field_name: String,
    },

    #[error("Resolution of field \"{0}\" timed out")]
    Timeout(String),

    #[error("Resolution of field \"{0}\" was cancelled")]
    Cancelled(String),

    #[error("{0}")]
    Resolver(#[from] ResolverError),

    #[error("Resolver for field \"{0}\" panicked")]
    Panicked(String),

    #[error("Cannot return null for non-nullable field \"{0}\"")]
    NullValue(String),

    #[error("Value {value} is not valid for type \"{type_name}\"")]
    InvalidValue { type_name: String, value: String },

    #[error("Field \"{field_name}\" is not defined on type \"{type_name}\"")]
    UndefinedField {
        type_name: String,
        field_name: String,
    },
}

impl FieldResolutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FieldResolutionError::AccessDenied(_) => ErrorKind::FieldAccessDenied,
            FieldResolutionError::ServiceNotFound { .. } => ErrorKind::ServiceNotFound,
            FieldResolutionError::MethodNotFound { .. } => ErrorKind::MethodNotFound,
            FieldResolutionError::Timeout(_) | FieldResolutionError::Cancelled(_) => {
                ErrorKind::ResolutionTimeout
            }
            FieldResolutionError::Resolver(_)
            | FieldResolutionError::Panicked(_)
            | FieldResolutionError::NullValue(_)
            | FieldResolutionError::InvalidValue { .. }
            | FieldResolutionError::UndefinedField { .. } => ErrorKind::ResolutionRuntimeError,
        }
    }
}

/// Resolves one field: arguments, pre-resolve event, authorization, dispatch and post-resolve
/// event, in that order.
pub struct FieldResolver<'a> {
    schema: &'a Schema,
    services: &'a dyn ServiceRegistry,
    authorization: &'a AuthorizationGate,
    events: &'a dyn EventSink,
    resolve_timeout: Option<Duration>,
    cancellation: &'a CancellationToken,
}

impl<'a> FieldResolver<'a> {
    pub fn new(
        schema: &'a Schema,
        services: &'a dyn ServiceRegistry,
        authorization: &'a AuthorizationGate,
        events: &'a dyn EventSink,
        resolve_timeout: Option<Duration>,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            schema,
            services,
            authorization,
            events,
            resolve_timeout,
            cancellation,
        }
    }

    #[instrument(
        name = "FieldResolver::resolve",
        skip_all,
        fields(field = %field_definition.name, path = %path)
    )]
    pub async fn resolve(
        &self,
        field_definition: &FieldDefinition,
        field: &FieldNode,
        parent_type: &ObjectType,
        parent: &Value,
        path: &ResponsePath,
        operation: &QueryDocument,
    ) -> Result<Value, FieldResolutionError> {
        let arguments = collect_arguments(field_definition, field);

        let mut event = ResolveEvent::new(field_definition, &field.children, path);
        self.events.pre_resolve(&mut event);

        let context =
            ResolveContext::new(field_definition, field, &parent_type.name, path, operation);

        if let AccessDecision::Deny(denied) = self.authorization.check_field(&context).await {
            warn!(field = %context.coordinate(), "Field access denied");
            return Err(denied.into());
        }

        let value = self.dispatch(parent, &arguments, &context).await?;

        event.set_resolved_value(value);
        self.events.post_resolve(&mut event);

        Ok(event.into_resolved_value().unwrap_or(Value::Null))
    }

    async fn dispatch(
        &self,
        parent: &Value,
        arguments: &Map<String, Value>,
        context: &ResolveContext<'_>,
    ) -> Result<Value, FieldResolutionError> {
        let field_definition = context.field_definition;

        match &field_definition.resolution {
            FieldResolution::ServiceMethod {
                service_id,
                method_name,
            } => {
                let service_not_found = || FieldResolutionError::ServiceNotFound {
                    service_id: service_id.clone(),
                    field_name: field_definition.name.clone(),
                };

                if !self.services.has(service_id) {
                    return Err(service_not_found());
                }
                let service = self.services.get(service_id).ok_or_else(service_not_found)?;

                let method = service.method(method_name).ok_or_else(|| {
                    FieldResolutionError::MethodNotFound {
                        service_id: service_id.clone(),
                        method_name: method_name.clone(),
                        field_name: field_definition.name.clone(),
                    }
                })?;

                self.invoke(method.as_ref(), parent, arguments, context)
                    .await
            }
            FieldResolution::Callable(resolver) => {
                self.invoke(resolver.as_ref(), parent, arguments, context)
                    .await
            }
            FieldResolution::Property(property) => Ok(read_property(parent, property)),
            FieldResolution::Default => {
                let type_resolver = self
                    .schema
                    .get_object_type(underlying_type(&field_definition.ty).as_str())
                    .and_then(|object_type| object_type.type_resolver.as_ref());

                match type_resolver {
                    Some(resolver) => {
                        self.invoke(resolver.as_ref(), parent, arguments, context)
                            .await
                    }
                    None => Ok(read_property(parent, &field_definition.name)),
                }
            }
        }
    }

    /// Invoke a resolver, bounded by the resolve timeout and the cancellation token. A panic in
    /// the resolver fails only this field.
    async fn invoke(
        &self,
        resolver: &dyn FieldResolveFn,
        parent: &Value,
        arguments: &Map<String, Value>,
        context: &ResolveContext<'_>,
    ) -> Result<Value, FieldResolutionError> {
        let field_name = &context.field_definition.name;

        let invocation =
            AssertUnwindSafe(resolver.resolve(parent, arguments, context)).catch_unwind();

        let bounded = async {
            match self.resolve_timeout {
                Some(timeout) => tokio::time::timeout(timeout, invocation)
                    .await
                    .map_err(|_| FieldResolutionError::Timeout(field_name.clone())),
                None => Ok(invocation.await),
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                return Err(FieldResolutionError::Cancelled(field_name.clone()));
            }
            outcome = bounded => outcome?,
        };

        match outcome {
            Ok(result) => Ok(result?),
            Err(_) => {
                error!(field = %context.coordinate(), "Resolver panicked");
                Err(FieldResolutionError::Panicked(field_name.clone()))
            }
        }
    }
}

/// Supplied arguments, with declared defaults for those not supplied, in declaration order.
fn collect_arguments(field_definition: &FieldDefinition, field: &FieldNode) -> Map<String, Value> {
    field_definition
        .arguments
        .values()
        .filter_map(|argument| {
            field
                .arguments
                .get(&argument.name)
                .or(argument.default_value.as_ref())
                .map(|value| (argument.name.clone(), value.clone()))
        })
        .collect()
}

fn read_property(parent: &Value, property: &str) -> Value {
    parent.get(property).cloned().unwrap_or(Value::Null)
}
