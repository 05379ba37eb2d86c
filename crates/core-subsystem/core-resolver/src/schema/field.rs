// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use async_graphql_parser::types::{BaseType, Type};
use async_graphql_value::Name;
use indexmap::IndexMap;
use serde_json::Value;

use crate::field_resolver::FieldResolveFn;

/// Parse a type reference such as `[Int!]!`.
///
/// A string that does not parse is kept verbatim as a named type, so that schema building
/// reports it as an unknown type instead of failing here.
pub fn type_ref(ty: &str) -> Type {
    Type::new(ty).unwrap_or_else(|| Type {
        base: BaseType::Named(Name::new(ty)),
        nullable: true,
    })
}

/// How the value of a field is produced.
#[derive(Clone)]
pub enum FieldResolution {
    /// An invocable taking the parent value, the arguments and the resolve context.
    Callable(Arc<dyn FieldResolveFn>),
    /// A method on a service, looked up in the service registry at execution time.
    ServiceMethod {
        service_id: String,
        method_name: String,
    },
    /// Read the named key off the parent value.
    Property(String),
    /// The built-in resolution of the field's type.
    Default,
}

impl std::fmt::Debug for FieldResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldResolution::Callable(_) => write!(f, "Callable"),
            FieldResolution::ServiceMethod {
                service_id,
                method_name,
            } => write!(f, "ServiceMethod(@{service_id}::{method_name})"),
            FieldResolution::Property(name) => write!(f, "Property({name})"),
            FieldResolution::Default => write!(f, "Default"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: Type,
    pub default_value: Option<Value>,
}

impl ArgumentDefinition {
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: type_ref(ty),
            default_value: None,
        }
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = Some(default_value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: Type,
    pub arguments: IndexMap<String, ArgumentDefinition>,
    pub resolution: FieldResolution,
}

impl FieldDefinition {
    /// A field with [FieldResolution::Default] resolution.
    pub fn new(name: impl Into<String>, ty: &str) -> Self {
        Self {
            name: name.into(),
            ty: type_ref(ty),
            arguments: IndexMap::new(),
            resolution: FieldResolution::Default,
        }
    }

    pub fn argument(mut self, argument: ArgumentDefinition) -> Self {
        self.arguments.insert(argument.name.clone(), argument);
        self
    }

    pub fn resolve_with(mut self, resolver: Arc<dyn FieldResolveFn>) -> Self {
        self.resolution = FieldResolution::Callable(resolver);
        self
    }

    pub fn service_method(
        mut self,
        service_id: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        self.resolution = FieldResolution::ServiceMethod {
            service_id: service_id.into(),
            method_name: method_name.into(),
        };
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.resolution = FieldResolution::Property(property.into());
        self
    }
}
