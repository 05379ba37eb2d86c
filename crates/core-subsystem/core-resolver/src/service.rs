// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Services that fields can delegate their resolution to.
//!
//! A field with [crate::schema::FieldResolution::ServiceMethod] names a service and a method;
//! both are looked up in the executor's [ServiceRegistry] each time the field is resolved.

use std::{collections::HashMap, sync::Arc};

use crate::field_resolver::FieldResolveFn;

pub trait Service: Send + Sync {
    fn method(&self, name: &str) -> Option<Arc<dyn FieldResolveFn>>;
}

pub trait ServiceRegistry: Send + Sync {
    fn has(&self, id: &str) -> bool;

    fn get(&self, id: &str) -> Option<Arc<dyn Service>>;
}

/// A service made of named resolver functions.
#[derive(Default)]
pub struct MethodTable {
    methods: HashMap<String, Arc<dyn FieldResolveFn>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, name: impl Into<String>, method: Arc<dyn FieldResolveFn>) -> Self {
        self.methods.insert(name.into(), method);
        self
    }
}

impl Service for MethodTable {
    fn method(&self, name: &str) -> Option<Arc<dyn FieldResolveFn>> {
        self.methods.get(name).cloned()
    }
}

#[derive(Default)]
pub struct MapServiceRegistry {
    services: HashMap<String, Arc<dyn Service>>,
}

impl MapServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, id: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.services.insert(id.into(), service);
        self
    }
}

impl ServiceRegistry for MapServiceRegistry {
    fn has(&self, id: &str) -> bool {
        self.services.contains_key(id)
    }

    fn get(&self, id: &str) -> Option<Arc<dyn Service>> {
        self.services.get(id).cloned()
    }
}
