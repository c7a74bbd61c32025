// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::MaterializedState;
use sb_core::Goal;

pub(super) fn apply_created(state: &mut MaterializedState, goal: &Goal) {
    state.goals.entry(goal.goal_id).or_insert_with(|| goal.clone());
}

pub(super) fn apply_updated(state: &mut MaterializedState, goal: &Goal) {
    state.goals.insert(goal.goal_id, goal.clone());
}
