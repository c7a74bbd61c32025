// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trace-context propagation through bus message properties, so a single
//! goal's execution can be reconstructed across the dispatch -> agent ->
//! result hop even though the bus carries no native tracing support.

use std::collections::BTreeMap;

pub const TRACEPARENT_KEY: &str = "traceparent";

/// Inject the current span's trace id into a message property map.
pub fn inject(properties: &mut BTreeMap<String, String>, traceparent: &str) {
    properties.insert(TRACEPARENT_KEY.to_string(), traceparent.to_string());
}

/// Extract a previously injected trace id, if present.
pub fn extract(properties: &BTreeMap<String, String>) -> Option<&str> {
    properties.get(TRACEPARENT_KEY).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inject_then_extract_round_trips() {
        let mut props = BTreeMap::new();
        inject(&mut props, "00-abc-def-01");
        assert_eq!(extract(&props), Some("00-abc-def-01"));
    }

    #[test]
    fn extract_on_missing_key_is_none() {
        let props = BTreeMap::new();
        assert_eq!(extract(&props), None);
    }
}
