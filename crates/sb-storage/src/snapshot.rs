// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic zstd-compressed snapshots of materialized state, so recovery
//! after a restart doesn't have to replay the WAL from the beginning.

use crate::error::WalError;
use crate::migration::MigrationRegistry;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub const CURRENT_SNAPSHOT_VERSION: u32 = 1;

/// Serialize `state` into the versioned envelope, zstd-compress it, and
/// write it atomically (write to a temp file, then rename) to `path`.
pub fn write_snapshot<S: Serialize>(path: impl AsRef<Path>, seq: u64, state: &S) -> Result<(), WalError> {
    let envelope = serde_json::json!({
        "v": CURRENT_SNAPSHOT_VERSION,
        "seq": seq,
        "state": serde_json::to_value(state)?,
    });
    let raw = serde_json::to_vec(&envelope)?;
    let compressed = zstd::encode_all(raw.as_slice(), 0).map_err(WalError::Io)?;

    let path = path.as_ref();
    let tmp_path = path.with_extension("tmp");
    let mut tmp = fs::File::create(&tmp_path)?;
    tmp.write_all(&compressed)?;
    tmp.flush()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read a snapshot back, migrating its envelope forward to
/// `CURRENT_SNAPSHOT_VERSION` if it was written by an older binary.
/// Returns `None` when no snapshot file exists yet.
pub fn read_snapshot(
    path: impl AsRef<Path>,
    registry: &MigrationRegistry,
) -> Result<Option<(u64, Value)>, WalError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let mut compressed = Vec::new();
    fs::File::open(path)?.read_to_end(&mut compressed)?;
    let raw = zstd::decode_all(compressed.as_slice()).map_err(WalError::Io)?;
    let envelope: Value = serde_json::from_slice(&raw)?;

    let migrated = registry
        .migrate_to(envelope, CURRENT_SNAPSHOT_VERSION)
        .map_err(|e| WalError::Io(std::io::Error::other(e.to_string())))?;

    let seq = migrated.get("seq").and_then(Value::as_u64).unwrap_or(0);
    let state = migrated.get("state").cloned().unwrap_or(Value::Null);
    Ok(Some((seq, state)))
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
