// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot schema migrations. Snapshots are versioned JSON envelopes
//! (`{"v": u32, "seq": u64, "state": ...}`); a registered chain of
//! single-step [`Migration`]s walks a snapshot forward to the version the
//! running binary expects.

use crate::error::MigrationError;
use serde_json::Value;

pub trait Migration: Send + Sync {
    fn source_version(&self) -> u32;
    fn target_version(&self) -> u32;
    fn migrate(&self, snapshot: &mut Value) -> Result<(), MigrationError>;
}

pub struct MigrationRegistry {
    pub(crate) migrations: Vec<Box<dyn Migration>>,
}

impl Default for MigrationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self { migrations: Vec::new() }
    }

    fn step_from(&self, version: u32) -> Option<&dyn Migration> {
        self.migrations
            .iter()
            .find(|m| m.source_version() == version)
            .map(|m| m.as_ref())
    }

    /// Walk `snapshot` forward from its recorded `v` to `target_version`,
    /// one registered step at a time. A snapshot newer than any known
    /// version, or one with no registered path to the target, is rejected
    /// rather than silently passed through.
    pub fn migrate_to(&self, mut snapshot: Value, target_version: u32) -> Result<Value, MigrationError> {
        let current = snapshot
            .get("v")
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(0);

        if current > target_version {
            return Err(MigrationError::TooNew(current, target_version));
        }

        let mut version = current;
        while version < target_version {
            let step = self
                .step_from(version)
                .ok_or(MigrationError::NoPath(current, target_version))?;
            step.migrate(&mut snapshot)
                .map_err(|e| MigrationError::Failed(e.to_string()))?;
            version = step.target_version();
            if let Some(obj) = snapshot.as_object_mut() {
                obj.insert("v".to_string(), Value::from(version));
            }
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "migration_tests.rs"]
mod tests;
