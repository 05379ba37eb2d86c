// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Key/value configuration sources.
//!
//! Everything configurable in the execution pipeline is read through [Environment], so that
//! servers can use the process environment while tests supply a [MapEnvironment].

mod composite;
mod map;

use std::str::FromStr;

pub use composite::CompositeEnvironment;
pub use map::MapEnvironment;

pub trait Environment: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn enabled(&self, key: &str, default_value: bool) -> Result<bool, EnvError> {
        match self.get(key) {
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "1" | "yes" | "on" | "enabled" | "enable" => Ok(true),
                "false" | "0" | "no" | "off" | "disabled" | "disable" => Ok(false),
                _ => Err(EnvError::InvalidBoolean {
                    key: key.to_string(),
                    value,
                }),
            },
            None => Ok(default_value),
        }
    }

    fn get_or_else(&self, key: &str, default_value: &str) -> String {
        self.get(key).unwrap_or(default_value.to_string())
    }

    fn get_list(&self, key: &str, default_value: Vec<String>) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or(default_value)
    }
}

/// Numeric value for `key`, or `None` if the key is not set.
pub fn get_number<T: FromStr>(env: &dyn Environment, key: &str) -> Result<Option<T>, EnvError> {
    env.get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| EnvError::InvalidNumber {
                    key: key.to_string(),
                    value,
                })
        })
        .transpose()
}

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error(
        "Invalid value for {key}: {value}. Expected true, 1, yes, on, enabled, enable OR false, 0, no, off, disabled, disable"
    )]
    InvalidBoolean { key: String, value: String },

    #[error("Invalid value for {key}: {value}. Expected a non-negative number")]
    InvalidNumber { key: String, value: String },
}

pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_values() {
        let env = MapEnvironment::from([("A", "yes"), ("B", "Off"), ("C", "maybe")]);

        assert!(env.enabled("A", false).unwrap());
        assert!(!env.enabled("B", true).unwrap());
        assert!(env.enabled("MISSING", true).unwrap());
        assert!(matches!(
            env.enabled("C", true),
            Err(EnvError::InvalidBoolean { .. })
        ));
    }

    #[test]
    fn numeric_values() {
        let env = MapEnvironment::from([("DEPTH", " 12 "), ("BAD", "-3")]);

        assert_eq!(get_number::<usize>(&env, "DEPTH").unwrap(), Some(12));
        assert_eq!(get_number::<usize>(&env, "MISSING").unwrap(), None);
        assert!(matches!(
            get_number::<u64>(&env, "BAD"),
            Err(EnvError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn list_values() {
        let env = MapEnvironment::from([("DENY", "Query.secret, adminStats,,")]);

        assert_eq!(
            env.get_list("DENY", vec![]),
            vec!["Query.secret".to_string(), "adminStats".to_string()]
        );
        assert!(env.get_list("MISSING", vec![]).is_empty());
    }
}
