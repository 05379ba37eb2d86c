// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Display;

use serde::Serialize;

use crate::{
    schema::FieldDefinition,
    validation::{document::QueryDocument, field::FieldNode},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a value in the response, such as `["concerts", 0, "title"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl Display for ResponsePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                PathSegment::Field(name) => write!(f, "{name}")?,
                PathSegment::Index(index) => write!(f, "{index}")?,
            }
        }
        Ok(())
    }
}

/// Everything known about one field invocation. Built fresh for every resolution.
pub struct ResolveContext<'a> {
    pub field_definition: &'a FieldDefinition,
    pub field: &'a FieldNode,
    /// Names of the fields selected below this one.
    pub child_field_names: Vec<String>,
    /// The object type the field belongs to.
    pub parent_type: &'a str,
    pub path: &'a ResponsePath,
    pub operation: &'a QueryDocument,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        field_definition: &'a FieldDefinition,
        field: &'a FieldNode,
        parent_type: &'a str,
        path: &'a ResponsePath,
        operation: &'a QueryDocument,
    ) -> Self {
        Self {
            field_definition,
            field,
            child_field_names: field.child_names(),
            parent_type,
            path,
            operation,
        }
    }

    /// The schema coordinate of the field, such as `Query.concerts`.
    pub fn coordinate(&self) -> String {
        format!("{}.{}", self.parent_type, self.field_definition.name)
    }
}
