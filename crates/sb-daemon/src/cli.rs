// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line entry points: `serve` runs the full daemon, `bootstrap-goals`
//! loads a batch of goals from a JSON file into the durable store without
//! starting the HTTP surface or any background loop.

use crate::config::Settings;
use crate::error::ExitCode;
use crate::orchestrator::Orchestrator;
use clap::{Parser, Subcommand};
use sb_core::GoalId;
use sb_wire::CreateGoalRequest;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "switchboard", version, about = "Agent workflow orchestration daemon")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API, the dashboard websocket, and every background loop.
    Serve,
    /// Load a JSON array of goal definitions into the durable store and exit.
    BootstrapGoals {
        #[arg(long)]
        file: PathBuf,
    },
}

pub async fn run(cli: Cli) -> ExitCode {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            return ExitCode::Config;
        }
    };

    match cli.command {
        Commands::Serve => serve(settings).await,
        Commands::BootstrapGoals { file } => bootstrap_goals(settings, file).await,
    }
}

async fn serve(settings: Settings) -> ExitCode {
    let orchestrator = match Orchestrator::build(settings).await {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            tracing::error!(error = %err, "failed to start switchboard");
            return ExitCode::Fatal;
        }
    };

    match orchestrator.serve().await {
        Ok(()) => ExitCode::Ok,
        Err(err) => {
            tracing::error!(error = %err, "switchboard exited with an error");
            ExitCode::Fatal
        }
    }
}

async fn bootstrap_goals(settings: Settings, file: PathBuf) -> ExitCode {
    let contents = match std::fs::read_to_string(&file) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::error!(path = %file.display(), error = %err, "failed to read goals file");
            return ExitCode::Fatal;
        }
    };
    let requests: Vec<CreateGoalRequest> = match serde_json::from_str(&contents) {
        Ok(requests) => requests,
        Err(err) => {
            tracing::error!(path = %file.display(), error = %err, "goals file is not a valid JSON array");
            return ExitCode::Fatal;
        }
    };

    let store = match sb_storage::Store::open(&settings.store_dir) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(path = %settings.store_dir.display(), error = %err, "failed to open durable store");
            return ExitCode::Fatal;
        }
    };
    let goals = store.goals();

    let mut failures = 0usize;
    for request in requests {
        let goal = sb_core::Goal {
            goal_id: GoalId::new(),
            objective: request.objective,
            is_active: true,
            conditions: request.conditions,
            remediation_workflow_id: request.remediation_workflow_id,
        };
        if let Err(err) = goals.create(goal) {
            tracing::error!(error = %err, "failed to bootstrap goal");
            failures += 1;
        }
    }

    if failures > 0 {
        ExitCode::Fatal
    } else {
        ExitCode::Ok
    }
}
