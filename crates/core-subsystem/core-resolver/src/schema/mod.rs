// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The schema the executor runs against.
//!
//! A [Schema] is built once (through [SchemaBuilder]) and then shared read-only by every
//! execution. Building checks that all type references resolve, so that validation and
//! execution can rely on every named type being present.

mod field;
mod types;

use async_graphql_parser::types::Type;
use indexmap::IndexMap;
use thiserror::Error;

pub use field::{ArgumentDefinition, FieldDefinition, FieldResolution, type_ref};
pub use types::{EnumType, InputObjectType, ObjectType, ScalarType, TypeDefinition};

use crate::validation::underlying_type;

pub const QUERY_ROOT_TYPENAME: &str = "Query";
pub const MUTATION_ROOT_TYPENAME: &str = "Mutation";

pub const INT_TYPE: &str = "Int";
pub const FLOAT_TYPE: &str = "Float";
pub const STRING_TYPE: &str = "String";
pub const BOOLEAN_TYPE: &str = "Boolean";
pub const ID_TYPE: &str = "ID";

const BUILTIN_SCALARS: [&str; 5] = [INT_TYPE, FLOAT_TYPE, STRING_TYPE, BOOLEAN_TYPE, ID_TYPE];

#[derive(Debug)]
pub struct Schema {
    types: IndexMap<String, TypeDefinition>,
    query_type: String,
    mutation_type: Option<String>,
}

impl Schema {
    pub fn get_type_definition(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn get_object_type(&self, name: &str) -> Option<&ObjectType> {
        self.get_type_definition(name)
            .and_then(TypeDefinition::as_object)
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn type_definitions(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }
}

pub struct SchemaBuilder {
    types: Vec<TypeDefinition>,
    query_type: String,
    mutation_type: Option<String>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            types: vec![],
            query_type: QUERY_ROOT_TYPENAME.to_string(),
            mutation_type: None,
        }
    }

    pub fn object(mut self, object: ObjectType) -> Self {
        self.types.push(TypeDefinition::Object(object));
        self
    }

    pub fn enumeration(mut self, enumeration: EnumType) -> Self {
        self.types.push(TypeDefinition::Enum(enumeration));
        self
    }

    pub fn input_object(mut self, input_object: InputObjectType) -> Self {
        self.types.push(TypeDefinition::InputObject(input_object));
        self
    }

    /// A custom scalar; its values pass through unchanged.
    pub fn scalar(mut self, name: impl Into<String>) -> Self {
        self.types.push(TypeDefinition::Scalar(ScalarType::new(name)));
        self
    }

    pub fn query_type(mut self, name: impl Into<String>) -> Self {
        self.query_type = name.into();
        self
    }

    pub fn mutation_type(mut self, name: impl Into<String>) -> Self {
        self.mutation_type = Some(name.into());
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut types: IndexMap<String, TypeDefinition> = BUILTIN_SCALARS
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    TypeDefinition::Scalar(ScalarType::new(*name)),
                )
            })
            .collect();

        for type_definition in self.types {
            let name = type_definition.name().to_string();
            if types.contains_key(&name) {
                return Err(SchemaError::DuplicateType(name));
            }
            types.insert(name, type_definition);
        }

        let schema = Schema {
            types,
            query_type: self.query_type,
            mutation_type: self.mutation_type,
        };

        check_root(&schema, &schema.query_type)?;
        if let Some(mutation_type) = &schema.mutation_type {
            check_root(&schema, mutation_type)?;
        }

        for type_definition in schema.types.values() {
            match type_definition {
                TypeDefinition::Object(object) => {
                    for field in object.fields.values() {
                        let coordinate = format!("{}.{}", object.name, field.name);
                        check_reference(&schema, &field.ty, &coordinate, false)?;
                        for argument in field.arguments.values() {
                            check_reference(
                                &schema,
                                &argument.ty,
                                &format!("{coordinate}({}:)", argument.name),
                                true,
                            )?;
                        }
                    }
                }
                TypeDefinition::InputObject(input_object) => {
                    for field in input_object.fields.values() {
                        check_reference(
                            &schema,
                            &field.ty,
                            &format!("{}.{}", input_object.name, field.name),
                            true,
                        )?;
                    }
                }
                TypeDefinition::Scalar(_) | TypeDefinition::Enum(_) => {}
            }
        }

        Ok(schema)
    }
}

fn check_root(schema: &Schema, name: &str) -> Result<(), SchemaError> {
    match schema.get_type_definition(name) {
        Some(TypeDefinition::Object(_)) => Ok(()),
        Some(_) => Err(SchemaError::RootNotObject(name.to_string())),
        None => Err(SchemaError::MissingRootType(name.to_string())),
    }
}

fn check_reference(
    schema: &Schema,
    ty: &Type,
    coordinate: &str,
    input: bool,
) -> Result<(), SchemaError> {
    let type_name = underlying_type(ty);

    match schema.get_type_definition(type_name.as_str()) {
        None => Err(SchemaError::UnknownType {
            type_name: type_name.to_string(),
            coordinate: coordinate.to_string(),
        }),
        Some(td) if input && !td.is_input() => Err(SchemaError::NotAnInputType {
            type_name: type_name.to_string(),
            coordinate: coordinate.to_string(),
        }),
        Some(td) if !input && !td.is_output() => Err(SchemaError::NotAnOutputType {
            type_name: type_name.to_string(),
            coordinate: coordinate.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum SchemaError {
    #[error("Type '{0}' is defined more than once")]
    DuplicateType(String),

    #[error("Root type '{0}' is not defined")]
    MissingRootType(String),

    #[error("Root type '{0}' must be an object type")]
    RootNotObject(String),

    #[error("Unknown type '{type_name}' referenced by '{coordinate}'")]
    UnknownType {
        type_name: String,
        coordinate: String,
    },

    #[error("Type '{type_name}' used by '{coordinate}' is not an input type")]
    NotAnInputType {
        type_name: String,
        coordinate: String,
    },

    #[error("Type '{type_name}' used by '{coordinate}' is not an output type")]
    NotAnOutputType {
        type_name: String,
        coordinate: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue() -> ObjectType {
        ObjectType::new("Venue")
            .field(FieldDefinition::new("id", "ID!"))
            .field(FieldDefinition::new("name", "String"))
    }

    #[test]
    fn builds_with_builtin_scalars() {
        let schema = SchemaBuilder::new()
            .object(ObjectType::new("Query").field(FieldDefinition::new("venues", "[Venue!]!")))
            .object(venue())
            .build()
            .unwrap();

        assert_eq!(schema.query_type(), "Query");
        assert!(schema.get_type_definition("Int").is_some());
        assert!(schema.get_object_type("Venue").is_some());
        assert!(schema.get_object_type("String").is_none());
    }

    #[test]
    fn unknown_field_type() {
        let result = SchemaBuilder::new()
            .object(ObjectType::new("Query").field(FieldDefinition::new("concert", "Concert")))
            .build();

        assert_eq!(
            result.unwrap_err(),
            SchemaError::UnknownType {
                type_name: "Concert".to_string(),
                coordinate: "Query.concert".to_string(),
            }
        );
    }

    #[test]
    fn object_type_as_argument() {
        let result = SchemaBuilder::new()
            .object(
                ObjectType::new("Query").field(
                    FieldDefinition::new("byVenue", "Int")
                        .argument(ArgumentDefinition::new("venue", "Venue")),
                ),
            )
            .object(venue())
            .build();

        assert!(matches!(
            result.unwrap_err(),
            SchemaError::NotAnInputType { .. }
        ));
    }

    #[test]
    fn missing_roots() {
        let result = SchemaBuilder::new().object(venue()).build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::MissingRootType("Query".to_string())
        );

        let result = SchemaBuilder::new()
            .object(ObjectType::new("Query").field(FieldDefinition::new("a", "Int")))
            .mutation_type("Mutation")
            .build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::MissingRootType("Mutation".to_string())
        );
    }

    #[test]
    fn duplicate_types() {
        let result = SchemaBuilder::new()
            .object(ObjectType::new("Query").field(FieldDefinition::new("a", "Int")))
            .scalar("Int")
            .build();

        assert_eq!(
            result.unwrap_err(),
            SchemaError::DuplicateType("Int".to_string())
        );
    }
}
