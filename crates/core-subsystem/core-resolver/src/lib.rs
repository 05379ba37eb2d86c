// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub mod access_control;
pub mod events;
pub mod schema;
pub mod service;
pub mod system_resolver;
pub mod validation;

mod field_resolver;
mod operation_payload;
mod query_response;
mod resolve_context;

pub use field_resolver::{
    FieldResolutionError, FieldResolveFn, FieldResolver, ResolverError, async_resolve_fn,
    resolve_fn,
};
pub use operation_payload::{
    NormalizedRequest, QueryEntry, RAW_QUERY_MEDIA_TYPE, RawRequest, VariablesParam, normalize,
};
pub use query_response::{ErrorKind, ErrorLocation, GraphQLError, ResponseEnvelope};
pub use resolve_context::{PathSegment, ResolveContext, ResponsePath};
pub use system_resolver::{ExecutionOptions, QueryExecutor};
