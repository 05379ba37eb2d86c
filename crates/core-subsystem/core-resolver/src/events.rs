// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Pre- and post-resolve notifications.
//!
//! Every field resolution publishes one [ResolveEvent] twice: before the field is resolved and
//! after. Post-resolve subscribers may replace the resolved value; the value left in the event
//! after all subscribers ran is what ends up in the response.

use serde_json::Value;

use crate::{resolve_context::ResponsePath, schema::FieldDefinition, validation::field::FieldNode};

pub struct ResolveEvent<'a> {
    pub field: &'a FieldDefinition,
    /// The fields selected below the field being resolved.
    pub ast_fields: &'a [FieldNode],
    pub path: &'a ResponsePath,
    resolved_value: Option<Value>,
}

impl<'a> ResolveEvent<'a> {
    pub fn new(
        field: &'a FieldDefinition,
        ast_fields: &'a [FieldNode],
        path: &'a ResponsePath,
    ) -> Self {
        Self {
            field,
            ast_fields,
            path,
            resolved_value: None,
        }
    }

    /// The computed value (`None` before resolution).
    pub fn resolved_value(&self) -> Option<&Value> {
        self.resolved_value.as_ref()
    }

    pub fn set_resolved_value(&mut self, value: Value) {
        self.resolved_value = Some(value);
    }

    pub fn into_resolved_value(self) -> Option<Value> {
        self.resolved_value
    }
}

pub trait EventSink: Send + Sync {
    fn pre_resolve(&self, event: &mut ResolveEvent<'_>);

    fn post_resolve(&self, event: &mut ResolveEvent<'_>);
}

pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn pre_resolve(&self, _event: &mut ResolveEvent<'_>) {}

    fn post_resolve(&self, _event: &mut ResolveEvent<'_>) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvePhase {
    PreResolve,
    PostResolve,
}

impl ResolvePhase {
    pub fn name(&self) -> &'static str {
        match self {
            ResolvePhase::PreResolve => "graphql.pre_resolve",
            ResolvePhase::PostResolve => "graphql.post_resolve",
        }
    }
}

type Subscriber = Box<dyn Fn(&mut ResolveEvent<'_>) + Send + Sync>;

/// An [EventSink] broadcasting to subscribers in subscription order.
///
/// Subscribers are added while setting up (through `&mut self`); once the dispatcher is shared
/// with an executor the subscriber lists are read-only.
#[derive(Default)]
pub struct EventDispatcher {
    pre_resolve: Vec<Subscriber>,
    post_resolve: Vec<Subscriber>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        phase: ResolvePhase,
        handler: impl Fn(&mut ResolveEvent<'_>) + Send + Sync + 'static,
    ) {
        self.subscribers_mut(phase).push(Box::new(handler));
    }

    pub fn publish(&self, phase: ResolvePhase, event: &mut ResolveEvent<'_>) {
        for subscriber in self.subscribers(phase) {
            subscriber(event);
        }
    }

    pub fn subscriber_count(&self, phase: ResolvePhase) -> usize {
        self.subscribers(phase).len()
    }

    fn subscribers(&self, phase: ResolvePhase) -> &[Subscriber] {
        match phase {
            ResolvePhase::PreResolve => &self.pre_resolve,
            ResolvePhase::PostResolve => &self.post_resolve,
        }
    }

    fn subscribers_mut(&mut self, phase: ResolvePhase) -> &mut Vec<Subscriber> {
        match phase {
            ResolvePhase::PreResolve => &mut self.pre_resolve,
            ResolvePhase::PostResolve => &mut self.post_resolve,
        }
    }
}

impl EventSink for EventDispatcher {
    fn pre_resolve(&self, event: &mut ResolveEvent<'_>) {
        self.publish(ResolvePhase::PreResolve, event);
    }

    fn post_resolve(&self, event: &mut ResolveEvent<'_>) {
        self.publish(ResolvePhase::PostResolve, event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    #[test]
    fn subscribers_run_in_order_and_may_replace_the_value() {
        let seen = Arc::new(Mutex::new(vec![]));
        let mut dispatcher = EventDispatcher::new();

        let first = seen.clone();
        dispatcher.subscribe(ResolvePhase::PostResolve, move |event| {
            first
                .lock()
                .unwrap()
                .push(format!("first:{:?}", event.resolved_value()));
            event.set_resolved_value(json!("replaced"));
        });
        let second = seen.clone();
        dispatcher.subscribe(ResolvePhase::PostResolve, move |event| {
            second
                .lock()
                .unwrap()
                .push(format!("second:{:?}", event.resolved_value()));
        });

        let field = FieldDefinition::new("title", "String");
        let path = ResponsePath::default().field("title");
        let mut event = ResolveEvent::new(&field, &[], &path);
        event.set_resolved_value(json!("original"));

        dispatcher.pre_resolve(&mut event);
        dispatcher.post_resolve(&mut event);

        assert_eq!(event.into_resolved_value(), Some(json!("replaced")));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                r#"first:Some(String("original"))"#.to_string(),
                r#"second:Some(String("replaced"))"#.to_string(),
            ]
        );
        assert_eq!(dispatcher.subscriber_count(ResolvePhase::PreResolve), 0);
        assert_eq!(ResolvePhase::PostResolve.name(), "graphql.post_resolve");
    }
}
