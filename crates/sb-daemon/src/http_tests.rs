// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use async_trait::async_trait;
use axum::extract::Json as ExtractJson;
use sb_bus::InMemoryBus;
use sb_core::{BlockStatus, FakeClock, Goal};
use sb_engine::{AgentRegistry, Dispatcher, WorkflowManager};
use sb_planner::NoInsights;
use sb_storage::Store;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Mutex as StdMutex;
use tempfile::tempdir;

struct FakeGateway {
    replies: StdMutex<VecDeque<String>>,
}

impl FakeGateway {
    fn new(replies: Vec<&str>) -> Self {
        Self { replies: StdMutex::new(replies.into_iter().map(String::from).collect()) }
    }
}

#[async_trait]
impl LlmGateway for FakeGateway {
    async fn complete(&self, _model: &str, _prompt: &str) -> Result<String, sb_planner::PlannerError> {
        Ok(self.replies.lock().unwrap().pop_front().expect("fake gateway ran out of canned replies"))
    }
}

fn harness(replies: Vec<&str>) -> (tempfile::TempDir, AppState) {
    let dir = tempdir().expect("tempdir");
    let store = Store::open(dir.path()).expect("open");
    let bus: Arc<dyn sb_bus::MessageBus> = Arc::new(InMemoryBus::new());
    let manager = WorkflowManager::new(store.workflows(), bus.clone());
    let registry = AgentRegistry::new();
    let dispatcher = Dispatcher::new(bus.clone(), registry, SystemClock);
    let executor = Arc::new(Executor::new(manager, dispatcher, bus));
    let gateway: Box<dyn LlmGateway> = Box::new(FakeGateway::new(replies));
    let insights: Box<dyn InsightStore> = Box::new(NoInsights);
    let planner = Arc::new(Planner::new(gateway, insights, "gpt-4-turbo"));
    let state = AppState { executor, goals: store.goals(), planner };
    (dir, state)
}

#[tokio::test]
async fn submit_task_with_a_single_clear_task_is_dispatched_immediately() {
    let (_dir, state) = harness(vec![
        r#"{"summary":"check status","is_ambiguous":false,"high_level_steps":["check"]}"#,
        r#"{"shared_context":{},"tasks":[{"kind":"AgentTask","task_id":"tsk-1","dependencies":[],"status":"Pending","agent_personality":"default","prompt":"check"}]}"#,
    ]);

    let response = submit_task(State(state.clone()), ExtractJson(SubmitTaskRequest { prompt: "check status".to_string() }))
        .await
        .expect("submit");
    let body = response.into_response();
    assert_eq!(body.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn submit_task_ambiguous_prompt_creates_a_pending_clarification_workflow() {
    let (_dir, state) = harness(vec![
        r#"{"summary":"vague","is_ambiguous":true,"clarifying_question":"which metric?","high_level_steps":[]}"#,
    ]);

    submit_task(State(state.clone()), ExtractJson(SubmitTaskRequest { prompt: "make it better".to_string() }))
        .await
        .expect("submit");

    let running = state.executor.manager().list_running();
    assert_eq!(running.len(), 1);
    assert_eq!(running[0].status, WorkflowStatus::PendingClarification);
}

#[tokio::test]
async fn clarify_settles_a_pending_clarification_workflow_onto_a_concrete_plan() {
    let (_dir, state) = harness(vec![
        r#"{"summary":"vague","is_ambiguous":true,"clarifying_question":"which metric?","high_level_steps":[]}"#,
        r#"{"summary":"reduce p99","is_ambiguous":false,"high_level_steps":["investigate"]}"#,
        r#"{"shared_context":{},"tasks":[{"kind":"AgentTask","task_id":"tsk-1","dependencies":[],"status":"Pending","agent_personality":"default","prompt":"investigate p99"}]}"#,
    ]);

    let response = submit_task(State(state.clone()), ExtractJson(SubmitTaskRequest { prompt: "make it better".to_string() }))
        .await
        .expect("submit")
        .into_response();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let submitted: SubmitTaskResponse = serde_json::from_slice(&body).expect("json");

    let clarified = clarify(
        State(state.clone()),
        Path(submitted.workflow_id),
        ExtractJson(ClarifyRequest { answer: "reduce p99 latency".to_string() }),
    )
    .await
    .expect("clarify");

    assert_eq!(clarified.0.status, WorkflowStatus::Running);
    assert_eq!(clarified.0.tasks.len(), 1);
}

#[tokio::test]
async fn context_patch_is_visible_on_the_next_get() {
    let (_dir, state) = harness(vec![]);
    let workflow = Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "x".to_string(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks: Vec::new(),
        event_id: None,
        created_at: 0,
    };
    state.executor.manager().create(workflow.clone()).expect("create");

    let patch: Value = serde_json::json!({"region": "us-east-1"}).into();
    let status = patch_context(State(state.clone()), Path(workflow.workflow_id), ExtractJson(patch)).await.expect("patch");
    assert_eq!(status, StatusCode::NO_CONTENT);

    let fetched = get_context(State(state.clone()), Path(workflow.workflow_id)).await.expect("get context");
    assert_eq!(fetched.0.get_path("region"), Some(&Value::String("us-east-1".to_string())));
}

#[tokio::test]
async fn approve_rejects_without_the_required_role() {
    let (_dir, state) = harness(vec![]);
    let task_id = TaskId::new();
    let workflow = Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "x".to_string(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks: vec![TaskBlock::ApprovalBlock {
            task_id,
            dependencies: BTreeSet::new(),
            status: BlockStatus::PendingApproval,
            message: "deploy?".to_string(),
            required_role: Some("sre".to_string()),
            result: None,
        }],
        event_id: None,
        created_at: 0,
    };
    state.executor.manager().create(workflow.clone()).expect("create");

    let status = approve_task(
        State(state.clone()),
        Path((workflow.workflow_id, task_id)),
        HeaderMap::new(),
        ExtractJson(ApproveTaskRequest { approved: true }),
    )
    .await
    .expect("approve call succeeds");
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn approve_rejected_fails_the_block_with_a_rejected_result() {
    let (_dir, state) = harness(vec![]);
    let task_id = TaskId::new();
    let workflow = Workflow {
        workflow_id: WorkflowId::new(),
        original_prompt: "x".to_string(),
        status: WorkflowStatus::Running,
        shared_context: Value::default(),
        tasks: vec![TaskBlock::ApprovalBlock {
            task_id,
            dependencies: BTreeSet::new(),
            status: BlockStatus::PendingApproval,
            message: "deploy?".to_string(),
            required_role: None,
            result: None,
        }],
        event_id: None,
        created_at: 0,
    };
    state.executor.manager().create(workflow.clone()).expect("create");

    let status = approve_task(
        State(state.clone()),
        Path((workflow.workflow_id, task_id)),
        HeaderMap::new(),
        ExtractJson(ApproveTaskRequest { approved: false }),
    )
    .await
    .expect("approve call succeeds");
    assert_eq!(status, StatusCode::NO_CONTENT);

    let fetched = state.executor.manager().get(workflow.workflow_id).expect("get");
    assert_eq!(fetched.status, WorkflowStatus::Failed);
}

#[tokio::test]
async fn goal_crud_round_trips() {
    let (_dir, state) = harness(vec![]);
    let created = create_goal(
        State(state.clone()),
        ExtractJson(CreateGoalRequest { objective: "keep errors low".to_string(), conditions: Vec::new(), remediation_workflow_id: None }),
    )
    .await
    .expect("create")
    .into_response();
    assert_eq!(created.status(), StatusCode::CREATED);

    let listed = list_goals(State(state.clone())).await;
    assert_eq!(listed.0.len(), 1);

    let goal_id = listed.0[0].goal_id;
    let fetched: Goal = get_goal(State(state.clone()), Path(goal_id)).await.expect("get goal").0;
    assert_eq!(fetched.objective, "keep errors low");
}
