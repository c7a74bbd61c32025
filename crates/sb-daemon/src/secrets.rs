// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secrets lookup is modeled as a trait so a real secrets-service client can
//! replace [`EnvSecretsProvider`] without touching any caller. The secrets
//! service itself is out of scope here; this crate only ships the
//! environment-variable-backed default.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("secret backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SecretsProvider: Send + Sync {
    async fn get_secret(&self, key: &str) -> Result<Option<String>, SecretsError>;
}

/// Reads `SWITCHBOARD_SECRET_<KEY>`, uppercased, as the secret's value.
pub struct EnvSecretsProvider;

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn get_secret(&self, key: &str) -> Result<Option<String>, SecretsError> {
        let var = format!("SWITCHBOARD_SECRET_{}", key.to_uppercase());
        Ok(std::env::var(var).ok())
    }
}

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod tests;
