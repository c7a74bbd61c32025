// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;

fn disk_full_data() -> Value {
    let mut map = BTreeMap::new();
    map.insert("service".to_string(), Value::String("payments-api".to_string()));
    map.insert("host".to_string(), Value::String("ip-10-0-1-23".to_string()));
    Value::Object(map)
}

#[test]
fn instantiates_the_disk_full_template_with_substitution() {
    let generated = instantiate(ANOMALY_DISK_FULL, &disk_full_data()).expect("template registered").expect("render");

    assert_eq!(generated.tasks.len(), 2);
    match &generated.tasks[0] {
        TaskBlock::AgentTask { prompt, agent_personality, .. } => {
            assert!(prompt.contains("ip-10-0-1-23"));
            assert!(prompt.contains("payments-api"));
            assert_eq!(agent_personality, "sre");
        }
        other => panic!("expected an AgentTask, got {other:?}"),
    }
}

#[test]
fn second_task_depends_on_the_first() {
    let generated = instantiate(ANOMALY_DISK_FULL, &disk_full_data()).expect("template registered").expect("render");
    let first_id = match &generated.tasks[0] {
        TaskBlock::AgentTask { task_id, .. } => *task_id,
        other => panic!("expected an AgentTask, got {other:?}"),
    };
    match &generated.tasks[1] {
        TaskBlock::AgentTask { dependencies, .. } => assert!(dependencies.contains(&first_id)),
        other => panic!("expected an AgentTask, got {other:?}"),
    }
}

#[test]
fn unknown_event_type_has_no_template() {
    assert!(instantiate("anomaly.detected.something_else", &Value::Null).is_none());
}
