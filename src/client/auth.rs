/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 12/1/26
******************************************************************************/

//! Credential provider: lazy login and bearer-token caching.
//!
//! The token lives on the client instance and is shared between the
//! streaming session and the REST methods. Login replaces the cached token
//! wholesale; concurrent logins may perform redundant round-trips but can
//! never corrupt the cache.

use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::client::model::ApiEnvelope;
use crate::utils::SonasError;

#[derive(Deserialize)]
struct TokenData {
    token: String,
}

/// Obtains and caches the bearer token used to authenticate REST and
/// streaming requests.
///
/// Cloning is cheap and shares the underlying cache, which is guarded by an
/// async `RwLock`: a re-login from one task interleaves safely with reads
/// from another.
#[derive(Clone)]
pub struct CredentialProvider {
    http: reqwest::Client,
    token_url: String,
    username: String,
    password: String,
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialProvider {
    pub(crate) fn new(
        http: reqwest::Client,
        token_url: String,
        username: String,
        password: String,
    ) -> Self {
        Self {
            http,
            token_url,
            username,
            password,
            token: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns an `Authorization` header value of the form `Bearer <token>`,
    /// logging in first when no token is cached.
    ///
    /// # Errors
    ///
    /// Returns [`SonasError::AuthenticationFailed`] when the token endpoint
    /// rejects the credentials; nothing is cached and the next call retries.
    pub async fn bearer_header(&self) -> Result<String, SonasError> {
        if let Some(token) = self.token.read().await.as_deref() {
            return Ok(format!("Bearer {token}"));
        }
        let token = self.login().await?;
        Ok(format!("Bearer {token}"))
    }

    /// Performs the login exchange against the token endpoint and caches the
    /// resulting bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SonasError::AuthenticationFailed`] carrying the response
    /// body on any non-200 answer, or on a 200 body that does not contain
    /// the `{"data":{"token":...}}` envelope.
    pub async fn login(&self) -> Result<String, SonasError> {
        debug!(url = %self.token_url, username = %self.username, "requesting bearer token");
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(SonasError::AuthenticationFailed {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiEnvelope<TokenData> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) => {
                // A 200 without the token envelope is still an auth failure.
                return Err(SonasError::AuthenticationFailed {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        *self.token.write().await = Some(envelope.data.token.clone());
        debug!("bearer token cached");
        Ok(envelope.data.token)
    }

    /// Drops the cached token so the next call that needs one re-logs-in.
    ///
    /// Useful after a mid-session `Unauthorized` when the caller wants the
    /// next session to authenticate freshly.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    #[cfg(test)]
    pub(crate) async fn cached_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

impl fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialProvider")
            .field("token_url", &self.token_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> CredentialProvider {
        CredentialProvider::new(
            reqwest::Client::new(),
            "http://localhost:1/api/v1/auth/token".to_string(),
            "user".to_string(),
            "secret-password".to_string(),
        )
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", provider());
        assert!(debug.contains("user"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-password"));
    }

    #[tokio::test]
    async fn test_bearer_header_uses_cached_token() {
        let provider = provider();
        *provider.token.write().await = Some("cached-token".to_string());

        let header = provider.bearer_header().await.unwrap();
        assert_eq!(header, "Bearer cached-token");
    }

    #[tokio::test]
    async fn test_invalidate_drops_cached_token() {
        let provider = provider();
        *provider.token.write().await = Some("cached-token".to_string());

        provider.invalidate().await;
        assert_eq!(provider.cached_token().await, None);
    }

    #[tokio::test]
    async fn test_clones_share_the_cache() {
        let provider = provider();
        let clone = provider.clone();
        *provider.token.write().await = Some("shared".to_string());

        assert_eq!(clone.cached_token().await, Some("shared".to_string()));
    }
}
