// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::validation::validation_error::ValidationError;
use async_graphql_parser::types::{DocumentOperations, ExecutableDocument};
use async_graphql_value::Name;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::schema::Schema;

use super::{document::QueryDocument, operation_validator::OperationValidator};

/// Context for validating a document.
pub struct DocumentValidator<'a> {
    schema: &'a Schema,
    operation_name: Option<String>,
    variables: Map<String, Value>,
    query_depth_limit: usize,
}

impl<'a> DocumentValidator<'a> {
    pub fn new(
        schema: &'a Schema,
        operation_name: Option<String>,
        variables: Map<String, Value>,
        query_depth_limit: usize,
    ) -> Self {
        Self {
            schema,
            operation_name,
            variables,
            query_depth_limit,
        }
    }

    /// Validate the query payload.
    ///
    /// Validations performed:
    /// - Validate that either there is only one operation or the operation name specified matches one of the operations in the document
    /// - Validate that there is at least one operation
    /// - Other validations are delegated to the operation validator
    #[instrument(
        name = "DocumentValidator::validate"
        skip(self, document)
        )]
    pub fn validate(self, document: ExecutableDocument) -> Result<QueryDocument, ValidationError> {
        let (operation_name, raw_operation) = match document.operations {
            DocumentOperations::Single(operation) => Ok((self.operation_name, operation)),
            DocumentOperations::Multiple(mut operations) => match self.operation_name {
                // async-graphql parses a single named operation (`query Foo { ... }`) to
                // `DocumentOperations::Multiple`, so the operation name is only required when
                // there truly are several operations.
                None if operations.len() <= 1 => operations
                    .into_iter()
                    .next()
                    .map(|(operation_name, operation)| {
                        (Some(operation_name.to_string()), operation)
                    })
                    .ok_or(ValidationError::NoOperationFound),
                None => Err(ValidationError::MultipleOperationsNoOperationName),
                Some(operation_name) => match operations.remove(&Name::new(&operation_name)) {
                    None => Err(ValidationError::MultipleOperationsUnmatchedOperationName(
                        operation_name,
                    )),
                    Some(operation) => Ok((Some(operation_name), operation)),
                },
            },
        }?;

        let operation_validator = OperationValidator::new(
            self.schema,
            operation_name,
            self.variables,
            document.fragments,
            self.query_depth_limit,
        );

        operation_validator.validate(raw_operation)
    }
}
