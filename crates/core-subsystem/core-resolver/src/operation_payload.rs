// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde_json::{Map, Value};
use tracing::debug;

/// Media type whose body is the query text itself.
pub const RAW_QUERY_MEDIA_TYPE: &str = "application/graphql";

/// One query to execute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryEntry {
    pub query: Option<String>,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
}

impl QueryEntry {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }
}

/// Queries extracted from a request, and whether the request was a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub entries: Vec<QueryEntry>,
    pub is_multi: bool,
}

impl NormalizedRequest {
    fn single(entry: QueryEntry) -> Self {
        Self {
            entries: vec![entry],
            is_multi: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VariablesParam<'a> {
    /// JSON text, typically from a query-string parameter.
    Encoded(&'a str),
    Decoded(Map<String, Value>),
}

/// The parts of a transport request that may carry queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRequest<'a> {
    pub body: Option<&'a [u8]>,
    pub query: Option<&'a str>,
    pub variables: Option<VariablesParam<'a>>,
    pub operation_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

/// Extract the queries of a request. Never fails: malformed input degrades to the parameters
/// (or empty variables), and a missing query is reported when the entry is executed.
pub fn normalize(request: &RawRequest<'_>) -> NormalizedRequest {
    let body = request.body.filter(|body| !body.is_empty());
    let operation_name = request.operation_name.map(str::to_string);

    if let Some(body) = body {
        if is_raw_query(request.content_type) {
            return NormalizedRequest::single(QueryEntry {
                query: Some(String::from_utf8_lossy(body).into_owned()),
                operation_name,
                variables: Map::new(),
            });
        }

        let param_variables = decode_param_variables(request.variables.as_ref());

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Array(elements)) => {
                return NormalizedRequest {
                    entries: normalize_elements(
                        elements,
                        request.query,
                        param_variables,
                        operation_name,
                    ),
                    is_multi: true,
                };
            }
            Ok(element @ Value::Object(_)) => {
                return NormalizedRequest {
                    entries: normalize_elements(
                        vec![element],
                        request.query,
                        param_variables,
                        operation_name,
                    ),
                    is_multi: false,
                };
            }
            Ok(_) => debug!("Request body is neither an object nor an array"),
            Err(error) => debug!(%error, "Request body is not valid JSON"),
        }

        return NormalizedRequest::single(QueryEntry {
            query: request.query.map(str::to_string),
            operation_name,
            variables: param_variables,
        });
    }

    NormalizedRequest::single(QueryEntry {
        query: request.query.map(str::to_string),
        operation_name,
        variables: decode_param_variables(request.variables.as_ref()),
    })
}

/// Each element falls back to the previous element's query and variables (the parameters for
/// the first element). Keys are read independently, so a mistyped key loses only its own value.
fn normalize_elements(
    elements: Vec<Value>,
    query_param: Option<&str>,
    param_variables: Map<String, Value>,
    operation_name: Option<String>,
) -> Vec<QueryEntry> {
    let mut previous_query = query_param.map(str::to_string);
    let mut previous_variables = param_variables;

    elements
        .into_iter()
        .map(|element| {
            let mut element = match element {
                Value::Object(element) => element,
                _ => Map::new(),
            };

            let query = take_string(&mut element, "query").or_else(|| previous_query.clone());
            let element_operation_name = take_string(&mut element, "operationName");
            let variables = element
                .remove("variables")
                .and_then(decode_variables)
                .unwrap_or_else(|| previous_variables.clone());

            previous_query.clone_from(&query);
            previous_variables.clone_from(&variables);

            QueryEntry {
                query,
                operation_name: element_operation_name.or_else(|| operation_name.clone()),
                variables,
            }
        })
        .collect()
}

fn take_string(element: &mut Map<String, Value>, key: &str) -> Option<String> {
    match element.remove(key)? {
        Value::String(value) => Some(value),
        Value::Null => None,
        _ => {
            debug!(key, "Ignoring non-string value");
            None
        }
    }
}

fn decode_variables(variables: Value) -> Option<Map<String, Value>> {
    match variables {
        Value::Object(variables) => Some(variables),
        Value::String(encoded) => decode_encoded_variables(&encoded),
        _ => None,
    }
}

fn decode_encoded_variables(encoded: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Object(variables)) => Some(variables),
        Ok(_) => None,
        Err(error) => {
            debug!(%error, "Ignoring malformed variables");
            None
        }
    }
}

fn decode_param_variables(variables: Option<&VariablesParam<'_>>) -> Map<String, Value> {
    match variables {
        Some(VariablesParam::Encoded(encoded)) => {
            decode_encoded_variables(encoded).unwrap_or_default()
        }
        Some(VariablesParam::Decoded(variables)) => variables.clone(),
        None => Map::new(),
    }
}

fn is_raw_query(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|content_type| content_type.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(RAW_QUERY_MEDIA_TYPE))
}
