// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The execution pipeline is instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! `TRELLIS_LOG`, which follows the same conventions as `RUST_LOG`, for example
//! `TRELLIS_LOG=core_resolver=debug` to see every executed query along with its variables.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};
use trellis_env::Environment;

use crate::env_const::TRELLIS_LOG;

/// Initialize the tracing subscriber.
///
/// Installs a compact `tracing_subscriber::fmt` layer. Without `TRELLIS_LOG`, only warnings and
/// errors are shown.
pub fn init(env: &dyn Environment) -> Result<(), LoggingError> {
    let filter = create_filter(env);
    let fmt_layer = tracing_subscriber::fmt::layer().compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

fn create_filter(env: &dyn Environment) -> EnvFilter {
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::WARN.into());

    match env.get(TRELLIS_LOG) {
        Some(directives) => builder.parse_lossy(directives),
        None => builder.parse_lossy(""),
    }
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Tracing subscriber already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}
