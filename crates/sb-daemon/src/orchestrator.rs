// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composition root: wires the bus, the durable store, every background
//! loop, and the HTTP surface into one running process. No globals --
//! every subsystem is constructed here and handed to whatever needs it.

use crate::config::Settings;
use crate::dashboard::{run_dashboard_broadcaster, DashboardBroadcaster};
use crate::http::{build_router, AppState};
use sb_bus::{InMemoryBus, MessageBus, PulsarBus};
use sb_core::SystemClock;
use sb_engine::{
    run_conditional_eval_worker, run_dead_letter_reaper, run_registration_consumer, run_result_consumer,
    run_status_update_consumer, AgentRegistry, DelegationTable, Dispatcher, Executor, WorkflowManager,
};
use sb_planner::{
    run_goal_monitor, run_platform_event_listener, HttpForecastSource, HttpInsightStore, HttpLlmGateway, HttpMetricsSource,
    InsightStore, LlmGateway, NoInsights, Planner,
};
use sb_storage::Store;
use sb_wire::{PLATFORM_EVENTS, RESULTS, TASK_STATUS_UPDATES};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to open durable store at {path}: {source}")]
    Store { path: String, source: sb_storage::StoreError },
    #[error("failed to connect to the bus at {url}: {source}")]
    Bus { url: String, source: sb_bus::BusError },
    #[error("failed to bind http listener on {addr}: {source}")]
    Bind { addr: std::net::SocketAddr, source: std::io::Error },
}

/// Everything the `serve` subcommand needs, assembled once.
pub struct Orchestrator {
    pub router: axum::Router,
    pub settings: Settings,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Orchestrator {
    pub async fn build(settings: Settings) -> Result<Self, OrchestratorError> {
        let store = Store::open(&settings.store_dir).map_err(|source| OrchestratorError::Store {
            path: settings.store_dir.display().to_string(),
            source,
        })?;

        let bus: Arc<dyn MessageBus> = if settings.bus_service_url == "memory" {
            Arc::new(InMemoryBus::new())
        } else {
            Arc::new(
                PulsarBus::connect(&settings.bus_service_url)
                    .await
                    .map_err(|source| OrchestratorError::Bus { url: settings.bus_service_url.clone(), source })?,
            )
        };

        let registry = AgentRegistry::new();
        let manager = WorkflowManager::new(store.workflows(), bus.clone());
        let dispatcher = Dispatcher::new(bus.clone(), registry.clone(), SystemClock);
        let executor = Arc::new(Executor::new(manager.clone(), dispatcher, bus.clone()));

        let gateway: Box<dyn LlmGateway> = match &settings.llm_gateway_url {
            Some(url) => Box::new(HttpLlmGateway::new(url.clone())),
            None => Box::new(HttpLlmGateway::new("http://localhost:11434")),
        };
        let insights: Box<dyn InsightStore> = match &settings.insights_url {
            Some(url) => Box::new(HttpInsightStore::new(url.clone())),
            None => Box::new(NoInsights),
        };
        let planner = Arc::new(Planner::new(gateway, insights, settings.default_model.clone()));

        let metrics: Arc<dyn sb_planner::MetricsSource> = match &settings.metrics_url {
            Some(url) => Arc::new(HttpMetricsSource::new(url.clone())),
            None => Arc::new(HttpMetricsSource::new("http://localhost:9090")),
        };
        let forecast: Arc<dyn sb_planner::ForecastSource> = match &settings.forecast_url {
            Some(url) => Arc::new(HttpForecastSource::new(url.clone())),
            None => Arc::new(HttpForecastSource::new("http://localhost:9091")),
        };

        let dashboard = DashboardBroadcaster::new();

        // Recovery sweep: a workflow left RUNNING across a restart may have
        // blocks whose dependencies are already satisfied but never got
        // dispatched (the crash landed between the WAL write and the
        // dispatch, or between a status update and its re-advance). Nudge
        // every one of them once before accepting new traffic.
        for workflow in manager.list_running() {
            if let Err(err) = executor.advance(workflow.workflow_id).await {
                tracing::warn!(workflow_id = %workflow.workflow_id, error = %err, "failed to resume workflow on startup");
            }
        }

        let delegation = DelegationTable::new();

        let mut handles = Vec::new();
        handles.push(spawn_named("registration-consumer", run_registration_consumer(bus.clone(), registry)));
        handles.push(spawn_named(
            "result-consumer",
            run_result_consumer(bus.clone(), manager.clone(), delegation.clone()),
        ));
        handles.push(spawn_named(
            "status-update-consumer",
            run_status_update_consumer(bus.clone(), manager.clone(), executor.clone()),
        ));
        handles.push(spawn_named(
            "results-dlq-reaper",
            run_dead_letter_reaper(bus.clone(), manager.clone(), RESULTS),
        ));
        handles.push(spawn_named(
            "status-updates-dlq-reaper",
            run_dead_letter_reaper(bus.clone(), manager.clone(), TASK_STATUS_UPDATES),
        ));
        handles.push(spawn_named(
            "conditional-eval-worker",
            run_conditional_eval_worker(bus.clone(), manager.clone()),
        ));
        handles.push(tokio::spawn(run_dashboard_broadcaster_logged(bus.clone(), dashboard.clone())));
        handles.push(tokio::spawn(run_goal_monitor(
            store.goals(),
            executor.clone(),
            planner.clone(),
            metrics,
            forecast,
            settings.goal_monitor_interval,
        )));
        handles.push(spawn_named(
            "platform-event-listener",
            run_platform_event_listener(bus.clone(), executor.clone(), planner.clone()),
        ));
        let _ = PLATFORM_EVENTS; // referenced by run_platform_event_listener internally

        let state = AppState { executor, goals: store.goals(), planner };
        let router = build_router(state, dashboard);

        Ok(Self { router, settings, handles })
    }

    /// Run until every background loop exits (which, barring a fatal bus
    /// error, is only on process shutdown) while serving HTTP concurrently.
    pub async fn serve(self) -> Result<(), OrchestratorError> {
        let listener = tokio::net::TcpListener::bind(self.settings.http_bind_addr)
            .await
            .map_err(|source| OrchestratorError::Bind { addr: self.settings.http_bind_addr, source })?;
        tracing::info!(addr = %self.settings.http_bind_addr, "switchboard listening");

        tokio::select! {
            result = axum::serve(listener, self.router) => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "http server exited");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received shutdown signal");
            }
        }

        for handle in self.handles {
            handle.abort();
        }
        Ok(())
    }
}

fn spawn_named<F>(name: &'static str, future: F) -> tokio::task::JoinHandle<()>
where
    F: std::future::Future<Output = Result<(), sb_bus::BusError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = future.await {
            tracing::error!(loop_name = name, error = %err, "background loop exited with an error");
        }
    })
}

async fn run_dashboard_broadcaster_logged(bus: Arc<dyn MessageBus>, dashboard: DashboardBroadcaster) {
    if let Err(err) = run_dashboard_broadcaster(bus, dashboard).await {
        tracing::error!(loop_name = "dashboard-broadcaster", error = %err, "background loop exited with an error");
    }
}
