// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::types::OperationType;

use super::field::FieldNode;

/// A validated operation, ready to be executed.
#[derive(Debug, Clone)]
pub struct QueryDocument {
    pub name: Option<String>,
    pub operation_type: OperationType,
    /// The name of the schema type the top-level fields belong to.
    pub root_type: String,
    /// The operation's top-level fields.
    pub fields: Vec<FieldNode>,
}
