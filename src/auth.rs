//! Credential acquisition
//!
//! The controller treats credentials as a pluggable capability: the
//! surrounding application decides where bearer tokens come from, and tests
//! swap in a double. Acquisition yielding nothing is the unauthenticated
//! state, handled by the turn controller before any request is sent.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Environment variable holding the signed-in user's ID token.
pub const DEFAULT_TOKEN_VAR: &str = "FINBOT_ID_TOKEN";

/// Opaque bearer credential. The token is never printed through `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for placing into an `Authorization` header.
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

/// Source of bearer credentials for outbound requests
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Produce a credential for the signed-in principal, or `None` when
    /// nobody is signed in.
    async fn acquire(&self) -> Option<Credential>;
}

#[async_trait]
impl<T: CredentialProvider + ?Sized> CredentialProvider for Arc<T> {
    async fn acquire(&self) -> Option<Credential> {
        (**self).acquire().await
    }
}

/// Reads the ID token from the environment on every acquisition, so a token
/// refreshed by the surrounding application is picked up mid-session.
pub struct EnvCredentialProvider {
    var: String,
}

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self::from_var(DEFAULT_TOKEN_VAR)
    }

    pub fn from_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn acquire(&self) -> Option<Credential> {
        std::env::var(&self.var)
            .ok()
            .filter(|token| !token.is_empty())
            .map(Credential::new)
    }
}

/// Provider pinned to one fixed token, for embedders that manage the token
/// lifecycle themselves.
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credential: Credential::new(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn acquire(&self) -> Option<Credential> {
        Some(self.credential.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_never_prints_the_token() {
        let credential = Credential::new("super-secret-id-token");
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains("super-secret-id-token"));
        assert!(rendered.contains("redacted"));
    }

    #[tokio::test]
    async fn static_provider_always_yields_its_token() {
        let provider = StaticCredentialProvider::new("tok");
        let credential = provider.acquire().await.expect("credential");
        assert_eq!(credential.token(), "tok");
    }

    #[tokio::test]
    async fn env_provider_treats_empty_value_as_signed_out() {
        // Unique variable name so parallel tests cannot race on it.
        let var = "FINBOT_TEST_TOKEN_EMPTY";
        std::env::set_var(var, "");
        let provider = EnvCredentialProvider::from_var(var);
        assert!(provider.acquire().await.is_none());
        std::env::remove_var(var);
    }
}
