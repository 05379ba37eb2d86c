// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use async_graphql_value::Name;
use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldNode {
    pub alias: Option<Name>,
    /// The name of the field.
    pub name: Name,
    /// Arguments supplied in the query, coerced to their declared types. Arguments that were
    /// not supplied are absent (declared defaults are applied at resolution time).
    pub arguments: IndexMap<String, Value>,
    /// The subfields being selected, in execution order. Empty for leaf fields.
    pub children: Vec<FieldNode>,
    pub pos: Pos,
}

impl FieldNode {
    pub fn output_name(&self) -> String {
        self.alias.as_ref().unwrap_or(&self.name).to_string()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children
            .iter()
            .map(|child| child.name.to_string())
            .collect()
    }
}
