// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only write-ahead log: newline-delimited JSON entries, each
//! carrying a monotonic sequence number. `processed_seq` tracks how far a
//! replay has consumed the log so recovery can resume from a snapshot
//! without re-applying already-materialized entries.

use crate::error::WalError;
use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: Event,
}

pub struct Wal {
    path: PathBuf,
    file: File,
    write_seq: u64,
    processed_seq: u64,
    read_pos: u64,
}

impl Wal {
    /// Open (creating if absent) the WAL at `path`. `starting_seq` is the
    /// sequence number of the last entry already folded into a snapshot;
    /// entries at or below it are skipped by `next_unprocessed`.
    pub fn open(path: impl AsRef<Path>, starting_seq: u64) -> Result<Self, WalError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).read(true).open(&path)?;
        let mut wal = Self {
            path,
            file,
            write_seq: starting_seq,
            processed_seq: starting_seq,
            read_pos: 0,
        };
        wal.write_seq = wal.scan_max_seq()?.max(starting_seq);
        Ok(wal)
    }

    fn scan_max_seq(&self) -> Result<u64, WalError> {
        let file = File::open(&self.path)?;
        let mut max_seq = 0;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(&line)?;
            max_seq = max_seq.max(entry.seq);
        }
        Ok(max_seq)
    }

    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    pub fn processed_seq(&self) -> u64 {
        self.processed_seq
    }

    /// Append an event, returning its assigned sequence number. Does not
    /// implicitly flush; call [`Wal::flush`] for a durability point.
    pub fn append(&mut self, event: &Event) -> Result<u64, WalError> {
        self.write_seq += 1;
        let entry = WalEntry { seq: self.write_seq, event: event.clone() };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{line}")?;
        Ok(self.write_seq)
    }

    pub fn flush(&mut self) -> Result<(), WalError> {
        self.file.flush()?;
        Ok(())
    }

    /// Return the next entry after `processed_seq`, advancing the read
    /// cursor but NOT `processed_seq` itself (the caller marks progress
    /// explicitly via [`Wal::mark_processed`] once the entry has been
    /// folded into materialized state).
    pub fn next_unprocessed(&mut self) -> Result<Option<WalEntry>, WalError> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        reader.seek(SeekFrom::Start(self.read_pos))?;
        let mut line = String::new();
        loop {
            line.clear();
            let bytes = reader.read_line(&mut line)?;
            if bytes == 0 {
                return Ok(None);
            }
            self.read_pos += bytes as u64;
            if line.trim().is_empty() {
                continue;
            }
            let entry: WalEntry = serde_json::from_str(line.trim_end())?;
            if entry.seq > self.processed_seq {
                return Ok(Some(entry));
            }
        }
    }

    pub fn mark_processed(&mut self, seq: u64) {
        self.processed_seq = self.processed_seq.max(seq);
    }

    /// Truncate the log to empty and reset sequence tracking after a
    /// snapshot checkpoint has durably captured everything up to `seq`.
    pub fn compact(&mut self, seq: u64) -> Result<(), WalError> {
        self.file = OpenOptions::new().create(true).write(true).truncate(true).open(&self.path)?;
        self.write_seq = seq;
        self.processed_seq = seq;
        self.read_pos = 0;
        Ok(())
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
