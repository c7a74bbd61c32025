// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural validation of a workflow's block tree against I1-I3: unique
//! task ids, dependencies that resolve within the same workflow, and an
//! acyclic dependency graph.

use crate::error::CoreError;
use crate::ids::TaskId;
use crate::workflow::Workflow;
use std::collections::{BTreeMap, BTreeSet};

pub fn validate_workflow(workflow: &Workflow) -> Result<(), CoreError> {
    let blocks = workflow.blocks();
    let mut seen = BTreeSet::new();
    for id in blocks.keys() {
        if !seen.insert(*id) {
            return Err(CoreError::DuplicateTaskId(*id));
        }
    }

    for (task_id, block) in &blocks {
        for dep in block.dependencies() {
            if !blocks.contains_key(dep) {
                return Err(CoreError::UnknownDependency {
                    task_id: *task_id,
                    dependency: *dep,
                });
            }
        }
    }

    detect_cycle(&blocks.iter().map(|(id, b)| (*id, b.dependencies().clone())).collect())
}

fn detect_cycle(edges: &BTreeMap<TaskId, BTreeSet<TaskId>>) -> Result<(), CoreError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }
    let mut marks: BTreeMap<TaskId, Mark> = BTreeMap::new();

    fn visit(
        node: TaskId,
        edges: &BTreeMap<TaskId, BTreeSet<TaskId>>,
        marks: &mut BTreeMap<TaskId, Mark>,
    ) -> Result<(), CoreError> {
        match marks.get(&node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => return Err(CoreError::CyclicDependency(node)),
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        if let Some(deps) = edges.get(&node) {
            for dep in deps {
                visit(*dep, edges, marks)?;
            }
        }
        marks.insert(node, Mark::Done);
        Ok(())
    }

    for node in edges.keys() {
        visit(*node, edges, &mut marks)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
