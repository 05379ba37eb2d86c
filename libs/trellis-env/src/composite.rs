// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::Environment;
use std::sync::Arc;

/// Layers several environments; lookups return the first hit.
///
/// Typical use is explicit overrides on top of [crate::SystemEnvironment].
pub struct CompositeEnvironment {
    // Highest precedence first
    layers: Vec<Arc<dyn Environment>>,
}

impl CompositeEnvironment {
    pub fn new(layers: Vec<Arc<dyn Environment>>) -> Self {
        Self { layers }
    }
}

impl Environment for CompositeEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapEnvironment;

    #[test]
    fn first_layer_wins() {
        let overrides = MapEnvironment::new().with("TRELLIS_LOG", "debug");
        let defaults = MapEnvironment::new()
            .with("TRELLIS_LOG", "warn")
            .with("TRELLIS_QUERY_DEPTH_LIMIT", "8");

        let env = CompositeEnvironment::new(vec![Arc::new(overrides), Arc::new(defaults)]);

        assert_eq!(env.get("TRELLIS_LOG").as_deref(), Some("debug"));
        assert_eq!(env.get("TRELLIS_QUERY_DEPTH_LIMIT").as_deref(), Some("8"));
        assert_eq!(env.get("TRELLIS_RESOLVE_TIMEOUT_MS"), None);
    }
}
