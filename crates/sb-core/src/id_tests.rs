// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_hash_map_lookup() {
    let id = TestId::new();
    let mut map = HashMap::new();
    map.insert(id, 42);
    assert_eq!(map.get(id.as_str()), Some(&42));
}

#[test]
fn define_id_short_truncates() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(8), "abcdefgh");
}

#[test]
fn define_id_short_returns_full_when_shorter() {
    let id = TestId::from_string("tst-abc");
    assert_eq!(id.short(8), "abc");
}

#[test]
fn define_id_from_string_roundtrip() {
    let id = TestId::from_string("tst-xyz");
    assert_eq!(id.as_str(), "tst-xyz");
    assert_eq!(id.suffix(), "xyz");
}

#[test]
fn define_id_new_has_prefix_and_length() {
    let id = TestId::new();
    assert!(id.as_str().starts_with(TestId::PREFIX));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}
