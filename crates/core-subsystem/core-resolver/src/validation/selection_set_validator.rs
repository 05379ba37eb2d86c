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
    Pos, Positioned,
    types::{
        Directive, Field, FragmentDefinition, FragmentSpread, Selection, SelectionSet,
        TypeCondition,
    },
};
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexMap;

use crate::{
    schema::{ObjectType, Schema, TypeDefinition},
    validation::{field::FieldNode, validation_error::ValidationError},
};

use super::{
    arguments_validator::{ArgumentValidator, VariableValues, resolve_with_variables},
    underlying_type,
};

/// Context for validating a selection set.
pub struct SelectionSetValidator<'a> {
    schema: &'a Schema,
    /// The parent type of this field.
    container_type: &'a ObjectType,
    variables: &'a VariableValues,
    fragment_definitions: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    query_depth_limit: usize,
}

impl<'a> SelectionSetValidator<'a> {
    #[must_use]
    pub fn new(
        schema: &'a Schema,
        container_type: &'a ObjectType,
        variables: &'a VariableValues,
        fragment_definitions: &'a HashMap<Name, Positioned<FragmentDefinition>>,
        query_depth_limit: usize,
    ) -> Self {
        Self {
            schema,
            container_type,
            variables,
            fragment_definitions,
            query_depth_limit,
        }
    }

    /// Validate selection set.
    ///
    /// Validations performed:
    /// - Each field is defined in the `container_type`
    /// - Each fragment referred is defined, applies to the `container_type` and does not spread
    ///   itself (directly or indirectly)
    /// - Arguments to each field are valid (see [ArgumentValidator] for more details)
    /// - Fields are no deeper than the query depth limit
    /// - Fields sharing an output name select the same field with the same arguments
    ///
    /// # Returns
    ///   A vector of fields with fragments inlined, skipped selections removed and fields
    ///   sharing an output name merged.
    pub(super) fn validate(
        &self,
        selection_set: &Positioned<SelectionSet>,
        depth: usize,
        fragment_path: &[Name],
    ) -> Result<Vec<FieldNode>, ValidationError> {
        let fields = self.collect_fields(selection_set, depth, fragment_path)?;
        merge_fields(fields)
    }

    fn collect_fields(
        &self,
        selection_set: &Positioned<SelectionSet>,
        depth: usize,
        fragment_path: &[Name],
    ) -> Result<Vec<FieldNode>, ValidationError> {
        let mut fields = vec![];

        for selection in &selection_set.node.items {
            match &selection.node {
                Selection::Field(field) => {
                    if self.is_included(&field.node.directives)? {
                        fields.push(self.validate_field(field, depth, fragment_path)?);
                    }
                }
                Selection::FragmentSpread(fragment_spread) => {
                    if !self.is_included(&fragment_spread.node.directives)? {
                        continue;
                    }

                    let fragment_name = &fragment_spread.node.fragment_name.node;
                    if fragment_path.contains(fragment_name) {
                        return Err(ValidationError::FragmentCycle(
                            fragment_name.to_string(),
                            fragment_spread.pos,
                        ));
                    }

                    let fragment_definition = self.fragment_definition(fragment_spread)?;
                    self.check_type_condition(
                        &fragment_definition.type_condition,
                        fragment_spread.pos,
                    )?;

                    let mut fragment_path = fragment_path.to_vec();
                    fragment_path.push(fragment_name.clone());

                    fields.extend(self.collect_fields(
                        &fragment_definition.selection_set,
                        depth,
                        &fragment_path,
                    )?);
                }
                Selection::InlineFragment(inline_fragment) => {
                    if !self.is_included(&inline_fragment.node.directives)? {
                        continue;
                    }

                    if let Some(type_condition) = &inline_fragment.node.type_condition {
                        self.check_type_condition(type_condition, inline_fragment.pos)?;
                    }

                    fields.extend(self.collect_fields(
                        &inline_fragment.node.selection_set,
                        depth,
                        fragment_path,
                    )?);
                }
            }
        }

        Ok(fields)
    }

    fn validate_field(
        &self,
        field: &Positioned<Field>,
        depth: usize,
        fragment_path: &[Name],
    ) -> Result<FieldNode, ValidationError> {
        if depth > self.query_depth_limit {
            return Err(ValidationError::SelectionSetTooDeep(field.pos));
        }

        let field_name = &field.node.name.node;
        let alias = field.node.alias.as_ref().map(|alias| alias.node.clone());

        // `__typename` is answered for every object type without being declared on it
        if field_name.as_str() == "__typename" {
            return if !field.node.arguments.is_empty() {
                Err(ValidationError::StrayArguments(
                    field
                        .node
                        .arguments
                        .iter()
                        .map(|arg| arg.0.node.to_string())
                        .collect(),
                    field_name.to_string(),
                    field.pos,
                ))
            } else if !field.node.selection_set.node.items.is_empty() {
                Err(ValidationError::ScalarWithField(
                    field_name.to_string(),
                    field.pos,
                ))
            } else {
                Ok(FieldNode {
                    alias,
                    name: field_name.clone(),
                    arguments: IndexMap::new(),
                    children: vec![],
                    pos: field.pos,
                })
            };
        }

        let field_definition = self
            .container_type
            .get_field(field_name.as_str())
            .ok_or_else(|| {
                ValidationError::InvalidField(
                    field_name.to_string(),
                    self.container_type.name.clone(),
                    field.pos,
                )
            })?;

        let field_type_name = underlying_type(&field_definition.ty);
        let has_selection = !field.node.selection_set.node.items.is_empty();

        let children = match self.schema.get_type_definition(field_type_name.as_str()) {
            Some(TypeDefinition::Object(object_type)) => {
                if !has_selection {
                    return Err(ValidationError::MissingSubselection(
                        field_name.to_string(),
                        field_definition.ty.to_string(),
                        field.pos,
                    ));
                }

                let subfield_validator = SelectionSetValidator::new(
                    self.schema,
                    object_type,
                    self.variables,
                    self.fragment_definitions,
                    self.query_depth_limit,
                );

                subfield_validator.validate(
                    &field.node.selection_set,
                    depth + 1,
                    fragment_path,
                )?
            }
            Some(_) if has_selection => {
                return Err(ValidationError::ScalarWithField(
                    field_name.to_string(),
                    field.pos,
                ));
            }
            Some(_) => vec![],
            None => {
                return Err(ValidationError::InvalidFieldType(
                    field_type_name.to_string(),
                    field.pos,
                ));
            }
        };

        let argument_validator = ArgumentValidator::new(self.schema, self.variables, field);
        let arguments = argument_validator.validate(field_definition)?;

        Ok(FieldNode {
            alias,
            name: field_name.clone(),
            arguments,
            children,
            pos: field.pos,
        })
    }

    /// Evaluate `@skip` and `@include`; any other directive is rejected.
    fn is_included(&self, directives: &[Positioned<Directive>]) -> Result<bool, ValidationError> {
        for directive in directives {
            let directive_name = directive.node.name.node.as_str();

            let included_when = match directive_name {
                "skip" => false,
                "include" => true,
                _ => {
                    return Err(ValidationError::UnknownDirective(
                        directive_name.to_string(),
                        directive.pos,
                    ));
                }
            };

            let invalid_argument = || {
                ValidationError::InvalidDirectiveArgument(
                    directive_name.to_string(),
                    directive.pos,
                )
            };

            let condition = directive
                .node
                .arguments
                .iter()
                .find(|(name, _)| name.node == "if")
                .map(|(_, value)| value)
                .ok_or_else(invalid_argument)?;

            match resolve_with_variables(self.variables, condition)? {
                Some(ConstValue::Boolean(condition)) => {
                    if condition != included_when {
                        return Ok(false);
                    }
                }
                _ => return Err(invalid_argument()),
            }
        }

        Ok(true)
    }

    fn fragment_definition(
        &self,
        fragment: &Positioned<FragmentSpread>,
    ) -> Result<&FragmentDefinition, ValidationError> {
        self.fragment_definitions
            .get(&fragment.node.fragment_name.node)
            .map(|v| &v.node)
            .ok_or_else(|| {
                ValidationError::FragmentDefinitionNotFound(
                    fragment.node.fragment_name.node.as_str().to_string(),
                    fragment.pos,
                )
            })
    }

    fn check_type_condition(
        &self,
        type_condition: &Positioned<TypeCondition>,
        pos: Pos,
    ) -> Result<(), ValidationError> {
        let on = type_condition.node.on.node.as_str();

        if on == self.container_type.name {
            Ok(())
        } else {
            Err(ValidationError::FragmentTypeMismatch {
                type_condition: on.to_string(),
                parent_type: self.container_type.name.clone(),
                pos,
            })
        }
    }
}

/// Merge fields that share an output name (recursively merging their children).
fn merge_fields(fields: Vec<FieldNode>) -> Result<Vec<FieldNode>, ValidationError> {
    let mut merged: IndexMap<String, FieldNode> = IndexMap::new();

    for field in fields {
        let output_name = field.output_name();

        match merged.get_mut(&output_name) {
            Some(existing) => {
                if existing.name != field.name || existing.arguments != field.arguments {
                    return Err(ValidationError::FieldConflict(output_name, field.pos));
                }
                existing.children.extend(field.children);
            }
            None => {
                merged.insert(output_name, field);
            }
        }
    }

    merged
        .into_values()
        .map(|mut field| {
            field.children = merge_fields(std::mem::take(&mut field.children))?;
            Ok(field)
        })
        .collect()
}
