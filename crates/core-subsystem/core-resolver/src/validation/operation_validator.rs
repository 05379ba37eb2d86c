// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashMap;

use async_graphql_parser::{
    Positioned,
    types::{FragmentDefinition, OperationDefinition, OperationType, VariableDefinition},
};
use async_graphql_value::{ConstValue, Name};
use serde_json::{Map, Value};

use crate::{schema::Schema, validation::validation_error::ValidationError};

use super::{
    arguments_validator::{VariableValues, coerce_input},
    document::QueryDocument,
    selection_set_validator::SelectionSetValidator,
};

/// Context for validating an operation.
pub struct OperationValidator<'a> {
    schema: &'a Schema,
    operation_name: Option<String>,
    variables: Map<String, Value>,
    fragment_definitions: HashMap<Name, Positioned<FragmentDefinition>>,
    query_depth_limit: usize,
}

impl<'a> OperationValidator<'a> {
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        operation_name: Option<String>,
        variables: Map<String, Value>,
        fragment_definitions: HashMap<Name, Positioned<FragmentDefinition>>,
        query_depth_limit: usize,
    ) -> Self {
        Self {
            schema,
            operation_name,
            variables,
            fragment_definitions,
            query_depth_limit,
        }
    }

    /// Validate operation. Operation defines a GraphQL top-level operation such
    /// as
    /// ```graphql
    ///    mutation create($name: String!) {
    ///       createName(name: $name) {
    ///          id
    ///       }
    ///    }
    /// ```
    ///
    /// Validations performed:
    /// - The schema has a root type for the operation type (subscriptions are never supported)
    /// - Each variable in [OperationDefinition::variable_definitions] has a value of the declared
    ///   type (see [`Self::validate_variables`] for details)
    /// - The selected fields are valid (see [SelectionSetValidator] for details)
    pub(super) fn validate(
        self,
        operation: Positioned<OperationDefinition>,
    ) -> Result<QueryDocument, ValidationError> {
        let root_type = match operation.node.ty {
            OperationType::Query => self.schema.query_type(),
            OperationType::Mutation => self.schema.mutation_type().ok_or_else(|| {
                ValidationError::OperationNotFound("mutation".to_string(), operation.pos)
            })?,
            OperationType::Subscription => {
                return Err(ValidationError::SubscriptionNotSupported(operation.pos));
            }
        };

        let container_type = self.schema.get_object_type(root_type).ok_or_else(|| {
            ValidationError::OperationNotFound(root_type.to_string(), operation.pos)
        })?;

        let variables = self.validate_variables(&operation.node.variable_definitions)?;

        let selection_set_validator = SelectionSetValidator::new(
            self.schema,
            container_type,
            &variables,
            &self.fragment_definitions,
            self.query_depth_limit,
        );

        let fields = selection_set_validator.validate(&operation.node.selection_set, 1, &[])?;

        Ok(QueryDocument {
            name: self.operation_name,
            operation_type: operation.node.ty,
            root_type: root_type.to_string(),
            fields,
        })
    }

    /// Validate variables.
    ///
    /// Validations performed:
    /// - A variable not supplied in the request takes its default; without a default it must
    ///   be nullable
    /// - A supplied (or default) value coerces to the declared type
    ///
    /// Variables supplied in the request but not declared by the operation are ignored.
    fn validate_variables(
        &self,
        variable_definitions: &[Positioned<VariableDefinition>],
    ) -> Result<VariableValues, ValidationError> {
        variable_definitions
            .iter()
            .map(|variable_definition| {
                let value = self.var_value(&variable_definition.node)?;
                Ok((variable_definition.node.name.node.clone(), value))
            })
            .collect()
    }

    fn var_value(
        &self,
        definition: &VariableDefinition,
    ) -> Result<Option<ConstValue>, ValidationError> {
        let name = &definition.name;
        let var_type = &definition.var_type.node;

        let value = match self.variables.get(name.node.as_str()) {
            Some(value) => Some(ConstValue::from_json(value.to_owned()).map_err(|e| {
                ValidationError::MalformedVariable(name.node.to_string(), name.pos, e)
            })?),
            None => definition
                .default_value
                .as_ref()
                .map(|default_value| default_value.node.clone()),
        };

        match value {
            Some(value) => {
                coerce_input(self.schema, var_type, value.clone()).map_err(|mismatch| {
                    ValidationError::InvalidVariableType {
                        name: name.node.to_string(),
                        expected_type: mismatch.expected,
                        actual_type: mismatch.actual,
                        pos: name.pos,
                    }
                })?;
                Ok(Some(value))
            }
            None if var_type.nullable => Ok(None),
            None => Err(ValidationError::VariableNotFound(
                name.node.to_string(),
                name.pos,
            )),
        }
    }
}
