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
    types::{BaseType, Field, Type},
};
use async_graphql_value::{ConstValue, Name, Value as QueryValue};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    schema::{
        BOOLEAN_TYPE, FLOAT_TYPE, FieldDefinition, ID_TYPE, INT_TYPE, STRING_TYPE, Schema,
        TypeDefinition,
    },
    validation::validation_error::ValidationError,
};

/// Variables declared by the operation. `None` marks a declared variable that was neither
/// supplied nor given a default.
pub(super) type VariableValues = HashMap<Name, Option<ConstValue>>;

pub struct ArgumentValidator<'a> {
    schema: &'a Schema,
    variables: &'a VariableValues,
    field: &'a Positioned<Field>,
}

impl<'a> ArgumentValidator<'a> {
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        variables: &'a VariableValues,
        field: &'a Positioned<Field>,
    ) -> Self {
        Self {
            schema,
            variables,
            field,
        }
    }

    /// Validations performed:
    /// - All required arguments (non-null without a default) are provided
    /// - There are no stray arguments (arguments that are not defined in the field)
    /// - Every supplied value (after variable substitution) coerces to the declared type
    pub(super) fn validate(
        &self,
        field_definition: &FieldDefinition,
    ) -> Result<IndexMap<String, Value>, ValidationError> {
        let field_name = field_definition.name.as_str();

        // Clients often send back a previously fetched object (including `__typename`) as an
        // argument, so it is never considered a stray argument.
        let mut supplied: IndexMap<&str, &Positioned<QueryValue>> = self
            .field
            .node
            .arguments
            .iter()
            .filter(|(name, _)| name.node != "__typename")
            .map(|(name, value)| (name.node.as_str(), value))
            .collect();

        let mut validated = IndexMap::new();

        for argument_definition in field_definition.arguments.values() {
            let argument_name = argument_definition.name.as_str();

            let value = match supplied.shift_remove(argument_name) {
                Some(value) => self.resolve_value(value)?,
                None => None,
            };

            match value {
                Some(value) => {
                    let coerced = coerce_input(self.schema, &argument_definition.ty, value)
                        .map_err(|mismatch| ValidationError::InvalidArgumentType {
                            argument_name: argument_name.to_string(),
                            field_name: field_name.to_string(),
                            expected_type: mismatch.expected,
                            actual_type: mismatch.actual,
                            pos: self.field.pos,
                        })?;
                    validated.insert(argument_name.to_string(), coerced);
                }
                None => {
                    if !argument_definition.ty.nullable
                        && argument_definition.default_value.is_none()
                    {
                        return Err(ValidationError::RequiredArgumentNotFound {
                            argument_name: argument_name.to_string(),
                            field_name: field_name.to_string(),
                            pos: self.field.pos,
                        });
                    }
                }
            }
        }

        if !supplied.is_empty() {
            let stray_arguments = supplied.keys().map(|name| name.to_string()).collect();

            Err(ValidationError::StrayArguments(
                stray_arguments,
                field_name.to_string(),
                self.field.pos,
            ))
        } else {
            Ok(validated)
        }
    }

    /// Substitute variables. Returns `None` if the whole value is a declared variable without
    /// a value, in which case the argument counts as not supplied.
    fn resolve_value(
        &self,
        value: &Positioned<QueryValue>,
    ) -> Result<Option<ConstValue>, ValidationError> {
        resolve_with_variables(self.variables, value)
    }
}

pub(super) fn resolve_with_variables(
    variables: &VariableValues,
    value: &Positioned<QueryValue>,
) -> Result<Option<ConstValue>, ValidationError> {
    if let QueryValue::Variable(name) = &value.node {
        return match variables.get(name) {
            Some(resolved) => Ok(resolved.clone()),
            None => Err(ValidationError::UndefinedVariable(
                name.to_string(),
                value.pos,
            )),
        };
    }

    value
        .node
        .clone()
        .into_const_with(|name| match variables.get(&name) {
            Some(resolved) => Ok(resolved.clone().unwrap_or(ConstValue::Null)),
            None => Err(ValidationError::UndefinedVariable(
                name.to_string(),
                value.pos,
            )),
        })
        .map(Some)
}

#[derive(Debug, PartialEq)]
pub(super) struct InputMismatch {
    pub expected: String,
    pub actual: String,
}

/// Coerce an input value (argument, variable or input object field) to the given type.
///
/// Follows GraphQL input coercion: a single value is accepted where a list is expected, `ID`
/// accepts integers, enum values may be given as strings (as they are when coming from JSON
/// variables), and input object fields not supplied take their declared default.
pub(super) fn coerce_input(
    schema: &Schema,
    ty: &Type,
    value: ConstValue,
) -> Result<Value, InputMismatch> {
    if value == ConstValue::Null {
        return if ty.nullable {
            Ok(Value::Null)
        } else {
            Err(InputMismatch {
                expected: ty.to_string(),
                actual: "null".to_string(),
            })
        };
    }

    match &ty.base {
        BaseType::List(elem_type) => match value {
            ConstValue::List(elems) => elems
                .into_iter()
                .map(|elem| coerce_input(schema, elem_type, elem))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => coerce_input(schema, elem_type, other).map(|elem| Value::Array(vec![elem])),
        },
        BaseType::Named(name) => coerce_named(schema, name.as_str(), value),
    }
}

fn coerce_named(
    schema: &Schema,
    type_name: &str,
    value: ConstValue,
) -> Result<Value, InputMismatch> {
    let mismatch = |actual: String| InputMismatch {
        expected: type_name.to_string(),
        actual,
    };

    match schema.get_type_definition(type_name) {
        Some(TypeDefinition::Scalar(_)) => coerce_scalar(type_name, value).map_err(mismatch),
        Some(TypeDefinition::Enum(enum_type)) => match value {
            ConstValue::Enum(name) if enum_type.has_value(name.as_str()) => {
                Ok(Value::String(name.to_string()))
            }
            ConstValue::String(name) if enum_type.has_value(&name) => Ok(Value::String(name)),
            other => Err(mismatch(describe(&other))),
        },
        Some(TypeDefinition::InputObject(input_object)) => match value {
            ConstValue::Object(mut entries) => {
                let mut object = Map::new();

                for field in input_object.fields.values() {
                    match entries.shift_remove(field.name.as_str()) {
                        Some(value) => {
                            object.insert(
                                field.name.clone(),
                                coerce_input(schema, &field.ty, value)?,
                            );
                        }
                        None => match &field.default_value {
                            Some(default_value) => {
                                object.insert(field.name.clone(), default_value.clone());
                            }
                            None if !field.ty.nullable => {
                                return Err(mismatch(format!(
                                    "object without field '{}'",
                                    field.name
                                )));
                            }
                            None => {}
                        },
                    }
                }

                match entries.keys().next() {
                    Some(stray) => Err(mismatch(format!("object with unknown field '{stray}'"))),
                    None => Ok(Value::Object(object)),
                }
            }
            other => Err(mismatch(describe(&other))),
        },
        Some(TypeDefinition::Object(_)) | None => Err(mismatch(describe(&value))),
    }
}

fn coerce_scalar(type_name: &str, value: ConstValue) -> Result<Value, String> {
    match (type_name, value) {
        (INT_TYPE, ConstValue::Number(number))
            if number
                .as_i64()
                .is_some_and(|n| i32::try_from(n).is_ok()) =>
        {
            Ok(Value::Number(number))
        }
        (FLOAT_TYPE, ConstValue::Number(number)) => Ok(Value::Number(number)),
        (STRING_TYPE | ID_TYPE, ConstValue::String(string)) => Ok(Value::String(string)),
        (ID_TYPE, ConstValue::Number(number)) if !number.is_f64() => {
            Ok(Value::String(number.to_string()))
        }
        (BOOLEAN_TYPE, ConstValue::Boolean(boolean)) => Ok(Value::Bool(boolean)),
        (INT_TYPE | FLOAT_TYPE | STRING_TYPE | ID_TYPE | BOOLEAN_TYPE, other) => {
            Err(describe(&other))
        }
        // Custom scalars accept any value
        (_, other) => other.into_json().map_err(|_| "Binary".to_string()),
    }
}

fn describe(value: &ConstValue) -> String {
    match value {
        ConstValue::Null => "null".to_string(),
        ConstValue::Number(number) if number.is_f64() => "Float".to_string(),
        ConstValue::Number(_) => "Int".to_string(),
        ConstValue::String(_) => "String".to_string(),
        ConstValue::Boolean(_) => "Boolean".to_string(),
        ConstValue::Binary(_) => "Binary".to_string(),
        ConstValue::Enum(name) => name.to_string(),
        ConstValue::List(_) => "List".to_string(),
        ConstValue::Object(_) => "Object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{
        ArgumentDefinition, EnumType, FieldDefinition, InputObjectType, ObjectType, SchemaBuilder,
        type_ref,
    };

    fn schema() -> Schema {
        SchemaBuilder::new()
            .object(ObjectType::new("Query").field(FieldDefinition::new("ok", "Boolean")))
            .enumeration(EnumType::new("Ordering", &["ASC", "DESC"]))
            .input_object(
                InputObjectType::new("ConcertOrdering")
                    .field(ArgumentDefinition::new("title", "Ordering!"))
                    .field(ArgumentDefinition::new("limit", "Int").with_default(json!(10))),
            )
            .build()
            .unwrap()
    }

    fn coerce(ty: &str, value: Value) -> Result<Value, InputMismatch> {
        coerce_input(&schema(), &type_ref(ty), ConstValue::from_json(value).unwrap())
    }

    #[test]
    fn scalars() {
        assert_eq!(coerce("Int", json!(3)), Ok(json!(3)));
        assert_eq!(coerce("Float", json!(3)), Ok(json!(3)));
        assert_eq!(coerce("ID", json!(42)), Ok(json!("42")));
        assert_eq!(coerce("String", json!(null)), Ok(json!(null)));

        assert_eq!(
            coerce("Int", json!(3_000_000_000_i64)),
            Err(InputMismatch {
                expected: "Int".to_string(),
                actual: "Int".to_string()
            })
        );
        assert_eq!(
            coerce("Int!", json!(null)),
            Err(InputMismatch {
                expected: "Int!".to_string(),
                actual: "null".to_string()
            })
        );
        assert_eq!(
            coerce("Boolean", json!("true")),
            Err(InputMismatch {
                expected: "Boolean".to_string(),
                actual: "String".to_string()
            })
        );
    }

    #[test]
    fn single_value_as_list() {
        assert_eq!(coerce("[Int!]", json!(1)), Ok(json!([1])));
        assert_eq!(coerce("[Int!]", json!([1, 2])), Ok(json!([1, 2])));
        assert!(coerce("[Int!]", json!([1, null])).is_err());
    }

    #[test]
    fn input_objects() {
        assert_eq!(
            coerce("ConcertOrdering", json!({"title": "DESC"})),
            Ok(json!({"title": "DESC", "limit": 10}))
        );
        assert_eq!(
            coerce("ConcertOrdering", json!({"title": "UP"})),
            Err(InputMismatch {
                expected: "Ordering".to_string(),
                actual: "String".to_string()
            })
        );
        assert_eq!(
            coerce("ConcertOrdering", json!({"title": "ASC", "year": 1})),
            Err(InputMismatch {
                expected: "ConcertOrdering".to_string(),
                actual: "object with unknown field 'year'".to_string()
            })
        );
        assert_eq!(
            coerce("ConcertOrdering", json!({})),
            Err(InputMismatch {
                expected: "ConcertOrdering".to_string(),
                actual: "object without field 'title'".to_string()
            })
        );
    }
}
