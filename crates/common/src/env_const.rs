// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use trellis_env::{EnvError, Environment, get_number};

pub const TRELLIS_LOG: &str = "TRELLIS_LOG";

pub const TRELLIS_QUERY_DEPTH_LIMIT: &str = "TRELLIS_QUERY_DEPTH_LIMIT";
pub const TRELLIS_RESOLVE_TIMEOUT_MS: &str = "TRELLIS_RESOLVE_TIMEOUT_MS";

pub const TRELLIS_SECURITY_OPERATION_CHECK: &str = "TRELLIS_SECURITY_OPERATION_CHECK";
pub const TRELLIS_SECURITY_FIELD_CHECK: &str = "TRELLIS_SECURITY_FIELD_CHECK";
pub const TRELLIS_SECURITY_DENIED_OPERATIONS: &str = "TRELLIS_SECURITY_DENIED_OPERATIONS";
pub const TRELLIS_SECURITY_DENIED_FIELDS: &str = "TRELLIS_SECURITY_DENIED_FIELDS";

pub const TRELLIS_PARALLEL_OPERATIONS: &str = "TRELLIS_PARALLEL_OPERATIONS";

pub const DEFAULT_QUERY_DEPTH_LIMIT: usize = 64;

pub fn get_query_depth_limit(env: &dyn Environment) -> Result<usize, EnvError> {
    Ok(get_number(env, TRELLIS_QUERY_DEPTH_LIMIT)?.unwrap_or(DEFAULT_QUERY_DEPTH_LIMIT))
}

/// Upper bound for a single resolver invocation. Unset means no bound.
pub fn get_resolve_timeout(env: &dyn Environment) -> Result<Option<Duration>, EnvError> {
    Ok(get_number::<u64>(env, TRELLIS_RESOLVE_TIMEOUT_MS)?.map(Duration::from_millis))
}

pub fn is_operation_check_enabled(env: &dyn Environment) -> Result<bool, EnvError> {
    env.enabled(TRELLIS_SECURITY_OPERATION_CHECK, true)
}

pub fn is_field_check_enabled(env: &dyn Environment) -> Result<bool, EnvError> {
    env.enabled(TRELLIS_SECURITY_FIELD_CHECK, true)
}

pub fn get_denied_operations(env: &dyn Environment) -> Vec<String> {
    env.get_list(TRELLIS_SECURITY_DENIED_OPERATIONS, vec![])
}

/// Field coordinates in the `Type.field` form.
pub fn get_denied_fields(env: &dyn Environment) -> Vec<String> {
    env.get_list(TRELLIS_SECURITY_DENIED_FIELDS, vec![])
}

pub fn is_parallel_operations(env: &dyn Environment) -> Result<bool, EnvError> {
    env.enabled(TRELLIS_PARALLEL_OPERATIONS, false)
}
