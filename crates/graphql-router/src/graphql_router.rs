// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use futures::{StreamExt, future::join_all, stream};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use common::env_const::is_parallel_operations;
use core_resolver::{
    QueryEntry, QueryExecutor, RawRequest, ResponseEnvelope, normalize,
    validation::validation_error::ValidationError,
};
use trellis_env::{EnvError, Environment};

/// The response to a request: a single envelope, or one envelope per query of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GraphQLResponse {
    Single(ResponseEnvelope),
    Multi(Vec<ResponseEnvelope>),
}

impl GraphQLResponse {
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn envelopes(&self) -> &[ResponseEnvelope] {
        match self {
            GraphQLResponse::Single(envelope) => std::slice::from_ref(envelope),
            GraphQLResponse::Multi(envelopes) => envelopes,
        }
    }
}

pub struct GraphQLRouter {
    executor: Arc<QueryExecutor>,
    parallel_operations: bool,
}

impl GraphQLRouter {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self {
            executor,
            parallel_operations: false,
        }
    }

    pub fn from_env(executor: Arc<QueryExecutor>, env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self::new(executor).with_parallel_operations(is_parallel_operations(env)?))
    }

    /// Execute the queries of a batch concurrently. Responses keep the order of the batch
    /// either way.
    pub fn with_parallel_operations(mut self, parallel_operations: bool) -> Self {
        self.parallel_operations = parallel_operations;
        self
    }

    pub async fn resolve(&self, request: &RawRequest<'_>) -> GraphQLResponse {
        self.resolve_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Resolves an incoming request. The JSON of each response may contain the data returned by
    /// the query, a list of errors, or both.
    #[instrument(
        name = "GraphQLRouter::resolve",
        skip(self, request, cancellation)
    )]
    pub async fn resolve_with_cancellation(
        &self,
        request: &RawRequest<'_>,
        cancellation: &CancellationToken,
    ) -> GraphQLResponse {
        let normalized = normalize(request);
        debug!(
            entries = normalized.entries.len(),
            is_multi = normalized.is_multi,
            "Normalized request"
        );

        let mut responses = self
            .resolve_entries(&normalized.entries, cancellation)
            .await;

        if normalized.is_multi {
            GraphQLResponse::Multi(responses)
        } else {
            let response = if responses.is_empty() {
                ResponseEnvelope::rejected(ValidationError::MissingQuery.into())
            } else {
                responses.swap_remove(0)
            };
            GraphQLResponse::Single(response)
        }
    }

    /// Execute each entry, returning the responses in entry order.
    pub async fn resolve_entries(
        &self,
        entries: &[QueryEntry],
        cancellation: &CancellationToken,
    ) -> Vec<ResponseEnvelope> {
        if self.parallel_operations {
            join_all(
                entries
                    .iter()
                    .map(|entry| self.executor.execute_with_cancellation(entry, cancellation)),
            )
            .await
        } else {
            stream::iter(entries)
                .then(|entry| self.executor.execute_with_cancellation(entry, cancellation))
                .collect()
                .await
        }
    }
}
