// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Authorization of operations and field resolutions.
//!
//! The [AuthorizationGate] consults a pluggable [SecurityPolicy] once per operation (before any
//! field is resolved) and once per field resolution (before the field's resolver is invoked).
//! Each category of check can be switched off through [SecurityCapabilities].

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use common::env_const::{
    get_denied_fields, get_denied_operations, is_field_check_enabled, is_operation_check_enabled,
};
use trellis_env::{EnvError, Environment};

use crate::{
    resolve_context::{ResolveContext, ResponsePath},
    validation::document::QueryDocument,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessTarget {
    Operation { name: Option<String> },
    Field { name: String, path: ResponsePath },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AccessDenied {
    pub message: String,
    pub target: AccessTarget,
}

impl AccessDenied {
    pub fn operation(document: &QueryDocument, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: AccessTarget::Operation {
                name: document.name.clone(),
            },
        }
    }

    pub fn field(context: &ResolveContext<'_>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: AccessTarget::Field {
                name: context.field_definition.name.clone(),
                path: context.path.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(AccessDenied),
}

/// Decides whether an operation or a field resolution may proceed.
///
/// Implementations may consult external authorization state, but must not mutate state shared
/// between executions.
#[async_trait]
pub trait SecurityPolicy: Send + Sync {
    async fn check_operation(&self, document: &QueryDocument) -> AccessDecision;

    async fn check_field(&self, context: &ResolveContext<'_>) -> AccessDecision;
}

/// Which categories of checks are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityCapabilities {
    pub operation_check: bool,
    pub field_check: bool,
}

impl Default for SecurityCapabilities {
    fn default() -> Self {
        Self {
            operation_check: true,
            field_check: true,
        }
    }
}

impl SecurityCapabilities {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        Ok(Self {
            operation_check: is_operation_check_enabled(env)?,
            field_check: is_field_check_enabled(env)?,
        })
    }
}

pub struct AuthorizationGate {
    policy: Arc<dyn SecurityPolicy>,
    capabilities: SecurityCapabilities,
}

impl AuthorizationGate {
    pub fn new(policy: Arc<dyn SecurityPolicy>, capabilities: SecurityCapabilities) -> Self {
        Self {
            policy,
            capabilities,
        }
    }

    pub fn allow_all() -> Self {
        Self::new(Arc::new(AllowAll), SecurityCapabilities::default())
    }

    pub fn capabilities(&self) -> SecurityCapabilities {
        self.capabilities
    }

    pub async fn check_operation(&self, document: &QueryDocument) -> AccessDecision {
        if !self.capabilities.operation_check {
            return AccessDecision::Allow;
        }
        self.policy.check_operation(document).await
    }

    pub async fn check_field(&self, context: &ResolveContext<'_>) -> AccessDecision {
        if !self.capabilities.field_check {
            return AccessDecision::Allow;
        }
        self.policy.check_field(context).await
    }
}

pub struct AllowAll;

#[async_trait]
impl SecurityPolicy for AllowAll {
    async fn check_operation(&self, _document: &QueryDocument) -> AccessDecision {
        AccessDecision::Allow
    }

    async fn check_field(&self, _context: &ResolveContext<'_>) -> AccessDecision {
        AccessDecision::Allow
    }
}

/// Denies named operations and fields given by their schema coordinate (`Type.field`).
#[derive(Debug, Default, Clone)]
pub struct DenyList {
    operations: HashSet<String>,
    fields: HashSet<String>,
}

impl DenyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deny_operation(mut self, name: impl Into<String>) -> Self {
        self.operations.insert(name.into());
        self
    }

    pub fn deny_field(mut self, coordinate: impl Into<String>) -> Self {
        self.fields.insert(coordinate.into());
        self
    }

    pub fn from_env(env: &dyn Environment) -> Self {
        Self {
            operations: get_denied_operations(env).into_iter().collect(),
            fields: get_denied_fields(env).into_iter().collect(),
        }
    }
}

#[async_trait]
impl SecurityPolicy for DenyList {
    async fn check_operation(&self, document: &QueryDocument) -> AccessDecision {
        match &document.name {
            Some(name) if self.operations.contains(name) => AccessDecision::Deny(
                AccessDenied::operation(document, format!("Access denied to operation \"{name}\"")),
            ),
            _ => AccessDecision::Allow,
        }
    }

    async fn check_field(&self, context: &ResolveContext<'_>) -> AccessDecision {
        let coordinate = context.coordinate();

        if self.fields.contains(&coordinate) {
            AccessDecision::Deny(AccessDenied::field(
                context,
                format!("Access denied to field \"{coordinate}\""),
            ))
        } else {
            AccessDecision::Allow
        }
    }
}

/// Allows only what every member policy allows; the first denial is reported.
pub struct CompositePolicy {
    policies: Vec<Arc<dyn SecurityPolicy>>,
}

impl CompositePolicy {
    pub fn new(policies: Vec<Arc<dyn SecurityPolicy>>) -> Self {
        Self { policies }
    }
}

#[async_trait]
impl SecurityPolicy for CompositePolicy {
    async fn check_operation(&self, document: &QueryDocument) -> AccessDecision {
        for policy in &self.policies {
            if let denied @ AccessDecision::Deny(_) = policy.check_operation(document).await {
                return denied;
            }
        }
        AccessDecision::Allow
    }

    async fn check_field(&self, context: &ResolveContext<'_>) -> AccessDecision {
        for policy in &self.policies {
            if let denied @ AccessDecision::Deny(_) = policy.check_field(context).await {
                return denied;
            }
        }
        AccessDecision::Allow
    }
}
