// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tracing` wiring: an `EnvFilter` driven by `RUST_LOG` (default `info`),
//! human-readable output on stderr, and an optional rolling file appender
//! for long-running `serve` processes.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Holding the returned guard keeps the non-blocking file writer flushing;
/// dropping it early silently truncates the tail of the log.
pub fn init(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "switchboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .json()
                .init();
            Some(guard)
        }
        None => {
            fmt().with_env_filter(filter).init();
            None
        }
    }
}
