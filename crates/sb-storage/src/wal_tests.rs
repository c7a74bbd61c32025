// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::Event;
use sb_core::{AgentId, AgentRegistration};
use tempfile::tempdir;

fn sample_event(suffix: &str) -> Event {
    Event::AgentRegistered {
        registration: AgentRegistration {
            agent_id: AgentId::from_string(format!("agt-{suffix}")),
            task_topic: "agent_task.agt-1".to_string(),
            personality: "researcher".to_string(),
        },
    }
}

#[test]
fn open_creates_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");

    let wal = Wal::open(&path, 0).expect("open");

    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
    assert_eq!(wal.processed_seq(), 0);
}

#[test]
fn append_assigns_increasing_sequence_numbers() {
    let dir = tempdir().expect("tempdir");
    let mut wal = Wal::open(dir.path().join("test.wal"), 0).expect("open");

    let seq1 = wal.append(&sample_event("0000000000000000001")).expect("append");
    let seq2 = wal.append(&sample_event("0000000000000000002")).expect("append");

    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);
    wal.flush().expect("flush");

    let metadata = std::fs::metadata(dir.path().join("test.wal")).expect("metadata");
    assert!(metadata.len() > 0);
}

#[test]
fn next_unprocessed_yields_entries_in_order_then_none() {
    let dir = tempdir().expect("tempdir");
    let mut wal = Wal::open(dir.path().join("test.wal"), 0).expect("open");
    wal.append(&sample_event("0000000000000000001")).expect("append");
    wal.append(&sample_event("0000000000000000002")).expect("append");
    wal.flush().expect("flush");

    let entry1 = wal.next_unprocessed().expect("read").expect("some");
    assert_eq!(entry1.seq, 1);
    wal.mark_processed(entry1.seq);

    let entry2 = wal.next_unprocessed().expect("read").expect("some");
    assert_eq!(entry2.seq, 2);
    wal.mark_processed(entry2.seq);

    assert!(wal.next_unprocessed().expect("read").is_none());
}

#[test]
fn mark_processed_is_idempotent_and_monotonic() {
    let dir = tempdir().expect("tempdir");
    let mut wal = Wal::open(dir.path().join("test.wal"), 0).expect("open");
    wal.append(&sample_event("0000000000000000001")).expect("append");
    wal.flush().expect("flush");

    wal.mark_processed(1);
    wal.mark_processed(1);
    wal.mark_processed(0);

    assert_eq!(wal.processed_seq(), 1);
}

#[test]
fn reopening_resumes_write_seq_from_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).expect("open");
        wal.append(&sample_event("0000000000000000001")).expect("append");
        wal.append(&sample_event("0000000000000000002")).expect("append");
        wal.append(&sample_event("0000000000000000003")).expect("append");
        wal.flush().expect("flush");
    }

    let mut wal = Wal::open(&path, 2).expect("reopen with processed_seq=2");
    assert_eq!(wal.write_seq(), 3);
    assert_eq!(wal.processed_seq(), 2);

    let entry = wal.next_unprocessed().expect("read").expect("some");
    assert_eq!(entry.seq, 3);
    assert!(wal.next_unprocessed().expect("read").is_none());
}

#[test]
fn compact_resets_log_to_checkpoint_seq() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).expect("open");
    wal.append(&sample_event("0000000000000000001")).expect("append");
    wal.append(&sample_event("0000000000000000002")).expect("append");
    wal.flush().expect("flush");

    wal.compact(2).expect("compact");
    assert_eq!(wal.write_seq(), 2);
    assert_eq!(wal.processed_seq(), 2);
    assert!(wal.next_unprocessed().expect("read").is_none());

    let seq3 = wal.append(&sample_event("0000000000000000003")).expect("append");
    assert_eq!(seq3, 3);
}
