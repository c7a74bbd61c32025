// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Switchboard - agent workflow orchestration daemon.

use clap::Parser;
use sb_daemon::cli::{run, Cli};
use sb_daemon::error::ExitCode;
use std::process::ExitCode as ProcessExitCode;

#[tokio::main]
async fn main() -> ProcessExitCode {
    let cli = Cli::parse();
    let log_dir = std::env::var("SWITCHBOARD_LOG_DIR").ok().map(std::path::PathBuf::from);
    let _guard = sb_daemon::telemetry::init(log_dir.as_deref());

    match run(cli).await {
        ExitCode::Ok => ProcessExitCode::from(0),
        ExitCode::Fatal => ProcessExitCode::from(1),
        ExitCode::Config => ProcessExitCode::from(2),
    }
}
