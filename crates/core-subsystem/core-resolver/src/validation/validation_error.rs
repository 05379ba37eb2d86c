// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing query")]
    MissingQuery,

    #[error("{0}")]
    QueryParsingFailed(String, Pos, Option<Pos>),

    #[error("Variable '{0}' not found")]
    VariableNotFound(String, Pos),

    #[error("Variable '{0}' is not defined by the operation")]
    UndefinedVariable(String, Pos),

    #[error("Variable '{0}' could not be deserialized: {2}")]
    MalformedVariable(String, Pos, serde_json::Error),

    #[error("Variable '{name}' is not of a valid type. Expected '{expected_type}', got '{actual_type}'")]
    InvalidVariableType {
        name: String,
        expected_type: String,
        actual_type: String,
        pos: Pos,
    },

    #[error("Fragment definition '{0}' not found")]
    FragmentDefinitionNotFound(String, Pos),

    #[error("Fragment '{0}' spreads itself")]
    FragmentCycle(String, Pos),

    #[error("Fragment on '{type_condition}' cannot be spread on '{parent_type}'")]
    FragmentTypeMismatch {
        type_condition: String,
        parent_type: String,
        pos: Pos,
    },

    #[error("No such operation '{0}'")]
    OperationNotFound(String, Pos),

    #[error("Subscriptions are not supported")]
    SubscriptionNotSupported(Pos),

    #[error("Field '{0}' is not valid for type '{1}'")]
    InvalidField(String, String, Pos),

    #[error("Field type '{0}' is not valid")]
    InvalidFieldType(String, Pos),

    #[error("Field '{0}' is of a scalar type, which should not specify fields")]
    ScalarWithField(String, Pos),

    #[error("Field '{0}' of type '{1}' must have a selection of subfields")]
    MissingSubselection(String, String, Pos),

    #[error("Fields '{0}' conflict because they select different fields or arguments")]
    FieldConflict(String, Pos),

    #[error("Required argument '{argument_name}' not found for field '{field_name}'")]
    RequiredArgumentNotFound {
        argument_name: String,
        field_name: String,
        pos: Pos,
    },

    #[error("Argument(s) '{0:?}' invalid for '{1}'")]
    StrayArguments(Vec<String>, String, Pos),

    #[error(
        "Argument '{argument_name}' of field '{field_name}' is not of a valid type. Expected '{expected_type}', got '{actual_type}'"
    )]
    InvalidArgumentType {
        argument_name: String,
        field_name: String,
        expected_type: String,
        actual_type: String,
        pos: Pos,
    },

    #[error("Unknown directive '@{0}'")]
    UnknownDirective(String, Pos),

    #[error("Directive '@{0}' requires a Boolean 'if' argument")]
    InvalidDirectiveArgument(String, Pos),

    #[error("Selection set too deep")]
    SelectionSetTooDeep(Pos),

    #[error("No operation found")]
    NoOperationFound,

    #[error("Must provide operation name if query contains multiple operations")]
    MultipleOperationsNoOperationName,

    #[error("operationName '{0}' doesn't match any operation")]
    MultipleOperationsUnmatchedOperationName(String),
}

impl ValidationError {
    /// Source positions to report alongside the message (empty if the error is not tied to
    /// a location in the query).
    pub fn positions(&self) -> Vec<Pos> {
        let (pos1, pos2) = match self {
            ValidationError::QueryParsingFailed(_, pos1, pos2) => (Some(*pos1), *pos2),
            ValidationError::VariableNotFound(_, pos)
            | ValidationError::UndefinedVariable(_, pos)
            | ValidationError::MalformedVariable(_, pos, _)
            | ValidationError::InvalidVariableType { pos, .. }
            | ValidationError::FragmentDefinitionNotFound(_, pos)
            | ValidationError::FragmentCycle(_, pos)
            | ValidationError::FragmentTypeMismatch { pos, .. }
            | ValidationError::OperationNotFound(_, pos)
            | ValidationError::SubscriptionNotSupported(pos)
            | ValidationError::InvalidField(_, _, pos)
            | ValidationError::InvalidFieldType(_, pos)
            | ValidationError::ScalarWithField(_, pos)
            | ValidationError::MissingSubselection(_, _, pos)
            | ValidationError::FieldConflict(_, pos)
            | ValidationError::RequiredArgumentNotFound { pos, .. }
            | ValidationError::StrayArguments(_, _, pos)
            | ValidationError::InvalidArgumentType { pos, .. }
            | ValidationError::UnknownDirective(_, pos)
            | ValidationError::InvalidDirectiveArgument(_, pos)
            | ValidationError::SelectionSetTooDeep(pos) => (Some(*pos), None),
            ValidationError::MissingQuery
            | ValidationError::NoOperationFound
            | ValidationError::MultipleOperationsNoOperationName
            | ValidationError::MultipleOperationsUnmatchedOperationName(_) => (None, None),
        };

        pos1.into_iter()
            .chain(pos2)
            .filter(|pos| *pos != Pos::default())
            .collect()
    }
}
