// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn missing_secret_is_none() {
    std::env::remove_var("SWITCHBOARD_SECRET_API_KEY");
    let provider = EnvSecretsProvider;
    assert_eq!(provider.get_secret("api_key").await.expect("lookup"), None);
}

#[tokio::test]
#[serial]
async fn present_secret_is_uppercased_and_found() {
    std::env::set_var("SWITCHBOARD_SECRET_API_KEY", "shh");
    let provider = EnvSecretsProvider;
    assert_eq!(provider.get_secret("api_key").await.expect("lookup"), Some("shh".to_string()));
    std::env::remove_var("SWITCHBOARD_SECRET_API_KEY");
}
