// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use serde::Serialize;
use serde_json::Value;

use crate::{
    field_resolver::FieldResolutionError, resolve_context::ResponsePath,
    validation::{field::FieldNode, validation_error::ValidationError},
};

/// The category of an error, reported to the caller as `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ParseOrValidationError,
    OperationAccessDenied,
    FieldAccessDenied,
    ServiceNotFound,
    MethodNotFound,
    ResolutionTimeout,
    ResolutionRuntimeError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorLocation {
    pub line: usize,
    pub column: usize,
}

impl From<Pos> for ErrorLocation {
    fn from(pos: Pos) -> Self {
        Self {
            line: pos.line,
            column: pos.column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<ErrorLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<ResponsePath>,
    pub kind: ErrorKind,
}

impl GraphQLError {
    pub fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: None,
            kind,
        }
    }

    /// An error scoped to a field of the response.
    pub fn field(error: &FieldResolutionError, field: &FieldNode, path: &ResponsePath) -> Self {
        Self {
            message: error.to_string(),
            locations: vec![field.pos.into()],
            path: Some(path.clone()),
            kind: error.kind(),
        }
    }
}

impl From<ValidationError> for GraphQLError {
    fn from(error: ValidationError) -> Self {
        Self {
            message: error.to_string(),
            locations: error.positions().into_iter().map(Into::into).collect(),
            path: None,
            kind: ErrorKind::ParseOrValidationError,
        }
    }
}

/// The result of executing one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl ResponseEnvelope {
    /// A query rejected as a whole: no data and a single error.
    pub fn rejected(error: GraphQLError) -> Self {
        Self {
            data: Value::Null,
            errors: vec![error],
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn errors_omitted_when_empty() {
        let envelope = ResponseEnvelope {
            data: json!({"a": 1}),
            errors: vec![],
        };

        assert_eq!(envelope.to_json().unwrap(), json!({"data": {"a": 1}}));
    }

    #[test]
    fn validation_error_shape() {
        let error: GraphQLError =
            ValidationError::SelectionSetTooDeep(Pos { line: 3, column: 7 }).into();

        assert_eq!(
            serde_json::to_value(ResponseEnvelope::rejected(error)).unwrap(),
            json!({
                "data": null,
                "errors": [{
                    "message": "Selection set too deep",
                    "locations": [{"line": 3, "column": 7}],
                    "kind": "ParseOrValidationError"
                }]
            })
        );
    }
}
