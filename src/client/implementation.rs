/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/1/26
******************************************************************************/

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::client::auth::CredentialProvider;
use crate::client::model::ClientConfig;
use crate::stream::{SessionState, StreamListener, StreamSession};
use crate::subscription::build_batches;
use crate::utils::SonasError;

/// Client for the Sonas pricing service.
///
/// Owns the credentials, the cached bearer token, and the state of the
/// (at most one) active streaming session. REST methods and the streaming
/// session share the token cache, so the first call on either path performs
/// the login.
pub struct SonasClient {
    http_base: Url,
    stream_url: Url,
    max_subscriptions_per_message: usize,
    credentials: CredentialProvider,
    http: reqwest::Client,
    state: Arc<watch::Sender<SessionState>>,
    state_rx: watch::Receiver<SessionState>,
    active: Mutex<Option<CancellationToken>>,
}

impl SonasClient {
    /// Creates a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SonasError::InvalidConfiguration`] when the host (or an
    /// endpoint override) does not form a valid URL.
    pub fn new(config: ClientConfig) -> Result<Self, SonasError> {
        let http_base = config.resolve_http_base()?;
        let ws_base = config.resolve_ws_base()?;
        let stream_url = join(&ws_base, "prices/stream")?;
        let token_url = join(&http_base, "auth/token")?;

        let http = reqwest::Client::new();
        let credentials = CredentialProvider::new(
            http.clone(),
            token_url.to_string(),
            config.username,
            config.password,
        );
        let (state, state_rx) = watch::channel(SessionState::Idle);

        Ok(Self {
            http_base,
            stream_url,
            max_subscriptions_per_message: config.max_subscriptions_per_message,
            credentials,
            http,
            state: Arc::new(state),
            state_rx,
            active: Mutex::new(None),
        })
    }

    /// Creates a client with default configuration for the given host.
    ///
    /// # Errors
    ///
    /// Returns [`SonasError::InvalidConfiguration`] when the host does not
    /// form a valid URL.
    pub fn with_credentials(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SonasError> {
        Self::new(ClientConfig::new(host, username, password))
    }

    /// The credential provider backing this client.
    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// Current state of the streaming session.
    ///
    /// `Idle` until the first `stream_prices` call; `Closed` after a session
    /// ended, whatever the outcome.
    pub fn session_state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    /// Runs a streaming session subscribed to the cross-product of
    /// `products` and `terms`, delivering every event to `listener`.
    ///
    /// The call blocks (asynchronously) for the whole session: connect,
    /// subscribe, then the receive loop until [`SonasClient::stop`] is
    /// called, the server closes the connection, or an unrecoverable failure
    /// occurs. Session-time failures are classified and reported through
    /// `listener.on_error`; this method only returns an error for conditions
    /// detected before any network activity.
    ///
    /// # Errors
    ///
    /// - [`SonasError::SessionActive`] when a session is already running on
    ///   this client.
    /// - [`SonasError::InvalidConfiguration`] when the batch bound is zero.
    pub async fn stream_prices<P, T, L>(
        &self,
        products: &[P],
        terms: &[T],
        listener: &mut L,
    ) -> Result<(), SonasError>
    where
        P: AsRef<str>,
        T: AsRef<str>,
        L: StreamListener,
    {
        let batches = build_batches(products, terms, self.max_subscriptions_per_message)?;

        let cancel = CancellationToken::new();
        {
            let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                return Err(SonasError::SessionActive);
            }
            *slot = Some(cancel.clone());
        }

        let session = StreamSession::new(
            self.stream_url.clone(),
            self.credentials.clone(),
            Arc::clone(&self.state),
            cancel,
        );
        session.run(batches, listener).await;

        *self.active.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }

    /// Requests orderly termination of the active streaming session.
    ///
    /// Takes effect at the next receive-loop iteration boundary: the session
    /// may deliver at most one more already-buffered message, then closes the
    /// connection from the client side without any `on_error` callback.
    /// A no-op when no session is active. Safe to call from any task,
    /// including from inside a listener callback.
    pub fn stop(&self) {
        let slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cancel) = slot.as_ref() {
            cancel.cancel();
        }
    }

    /// Alias for [`SonasClient::stop`], matching the service's client
    /// naming.
    pub fn stop_stream_prices(&self) {
        self.stop();
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.http_base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn join(base: &Url, path: &str) -> Result<Url, SonasError> {
    Url::parse(&format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
    .map_err(|err| SonasError::InvalidConfiguration(format!("invalid endpoint for {path:?}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SonasClient {
        SonasClient::with_credentials("localhost:8080", "user", "pass").unwrap()
    }

    #[test]
    fn test_initial_session_state_is_idle() {
        assert_eq!(client().session_state(), SessionState::Idle);
    }

    #[test]
    fn test_stop_without_session_is_a_noop() {
        let client = client();
        client.stop();
        client.stop_stream_prices();
        assert_eq!(client.session_state(), SessionState::Idle);
    }

    #[test]
    fn test_endpoints_derive_from_host() {
        let client = client();
        assert_eq!(
            client.endpoint("prices/snapshot"),
            "http://localhost:8080/api/v1/prices/snapshot"
        );
        assert_eq!(
            client.stream_url.as_str(),
            "ws://localhost:8080/api/v1/prices/stream"
        );
    }
}
