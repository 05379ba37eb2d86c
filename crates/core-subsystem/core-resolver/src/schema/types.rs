// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::field_resolver::FieldResolveFn;

use super::field::{ArgumentDefinition, FieldDefinition};

#[derive(Debug, Clone)]
pub enum TypeDefinition {
    Scalar(ScalarType),
    Object(ObjectType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDefinition {
    pub fn name(&self) -> &str {
        match self {
            TypeDefinition::Scalar(t) => &t.name,
            TypeDefinition::Object(t) => &t.name,
            TypeDefinition::Enum(t) => &t.name,
            TypeDefinition::InputObject(t) => &t.name,
        }
    }

    /// Whether the type may appear as an argument or input object field.
    pub fn is_input(&self) -> bool {
        !matches!(self, TypeDefinition::Object(_))
    }

    /// Whether the type may appear as the type of a selected field.
    pub fn is_output(&self) -> bool {
        !matches!(self, TypeDefinition::InputObject(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            TypeDefinition::Object(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone)]
pub struct ObjectType {
    pub name: String,
    pub fields: IndexMap<String, FieldDefinition>,
    /// Built-in resolution used by fields of this type whose resolution is
    /// [super::FieldResolution::Default].
    pub type_resolver: Option<Arc<dyn FieldResolveFn>>,
}

impl std::fmt::Debug for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectType")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("type_resolver", &self.type_resolver.is_some())
            .finish()
    }
}

impl ObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
            type_resolver: None,
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }

    pub fn with_type_resolver(mut self, resolver: Arc<dyn FieldResolveFn>) -> Self {
        self.type_resolver = Some(resolver);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: String,
    pub fields: IndexMap<String, ArgumentDefinition>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, field: ArgumentDefinition) -> Self {
        self.fields.insert(field.name.clone(), field);
        self
    }
}
