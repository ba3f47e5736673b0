/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 9/1/26
******************************************************************************/

use serde::Deserialize;
use url::Url;

use crate::subscription::MAX_SUBSCRIPTIONS_PER_MESSAGE;
use crate::utils::SonasError;

/// Configuration for a Sonas client.
///
/// This struct provides a simple way to configure all aspects of a client
/// with sensible defaults: endpoints are derived from the host (plain
/// `http`/`ws` for local hosts, `https`/`wss` otherwise) and the subscription
/// batch bound defaults to the protocol maximum.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service host, e.g. `"localhost:8080"` or `"api.sonas.example"`.
    pub host: String,
    /// Username for the token endpoint.
    pub username: String,
    /// Password for the token endpoint.
    pub password: String,
    /// Maximum (product, term) entries per `SUBSCRIBE` message.
    pub max_subscriptions_per_message: usize,
    /// Explicit REST base URL, overriding the host-derived one.
    pub http_base: Option<Url>,
    /// Explicit streaming base URL, overriding the host-derived one.
    pub ws_base: Option<Url>,
}

impl ClientConfig {
    /// Creates a new configuration for the given host and credentials.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            max_subscriptions_per_message: MAX_SUBSCRIPTIONS_PER_MESSAGE,
            http_base: None,
            ws_base: None,
        }
    }

    /// Sets the maximum number of entries per `SUBSCRIBE` message.
    #[must_use]
    pub fn max_subscriptions_per_message(mut self, max: usize) -> Self {
        self.max_subscriptions_per_message = max;
        self
    }

    /// Sets an explicit REST base URL (e.g. behind a gateway).
    #[must_use]
    pub fn http_base(mut self, base: Url) -> Self {
        self.http_base = Some(base);
        self
    }

    /// Sets an explicit streaming base URL (e.g. behind a gateway).
    #[must_use]
    pub fn ws_base(mut self, base: Url) -> Self {
        self.ws_base = Some(base);
        self
    }

    /// Resolves the REST API base, deriving it from the host when no
    /// override is configured.
    pub(crate) fn resolve_http_base(&self) -> Result<Url, SonasError> {
        match &self.http_base {
            Some(base) => Ok(base.clone()),
            None => {
                let scheme = if self.is_local_host() { "http" } else { "https" };
                parse_base(scheme, &self.host)
            }
        }
    }

    /// Resolves the streaming API base, deriving it from the host when no
    /// override is configured.
    pub(crate) fn resolve_ws_base(&self) -> Result<Url, SonasError> {
        match &self.ws_base {
            Some(base) => Ok(base.clone()),
            None => {
                let scheme = if self.is_local_host() { "ws" } else { "wss" };
                parse_base(scheme, &self.host)
            }
        }
    }

    fn is_local_host(&self) -> bool {
        self.host.starts_with("localhost") || self.host.starts_with("127.")
    }
}

fn parse_base(scheme: &str, host: &str) -> Result<Url, SonasError> {
    Url::parse(&format!("{scheme}://{host}/api/v1"))
        .map_err(|err| SonasError::InvalidConfiguration(format!("invalid host {host:?}: {err}")))
}

/// Products and terms this account is entitled to query and stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataPermissions {
    /// Product identifiers the account may access.
    #[serde(default)]
    pub products: Vec<String>,
    /// Term identifiers the account may access.
    #[serde(default)]
    pub terms: Vec<String>,
}

/// Response envelope wrapping every successful REST payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub(crate) data: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_builder() {
        let base = Url::parse("https://gateway.internal/sonas/api/v1").unwrap();
        let config = ClientConfig::new("api.sonas.example", "user", "pass")
            .max_subscriptions_per_message(250)
            .http_base(base.clone());

        assert_eq!(config.host, "api.sonas.example");
        assert_eq!(config.username, "user");
        assert_eq!(config.password, "pass");
        assert_eq!(config.max_subscriptions_per_message, 250);
        assert_eq!(config.http_base, Some(base));
        assert_eq!(config.ws_base, None);
    }

    #[test]
    fn test_local_host_uses_plain_schemes() {
        let config = ClientConfig::new("localhost:8080", "user", "pass");

        assert_eq!(
            config.resolve_http_base().unwrap().as_str(),
            "http://localhost:8080/api/v1"
        );
        assert_eq!(
            config.resolve_ws_base().unwrap().as_str(),
            "ws://localhost:8080/api/v1"
        );
    }

    #[test]
    fn test_remote_host_uses_tls_schemes() {
        let config = ClientConfig::new("api.sonas.example", "user", "pass");

        assert_eq!(
            config.resolve_http_base().unwrap().as_str(),
            "https://api.sonas.example/api/v1"
        );
        assert_eq!(
            config.resolve_ws_base().unwrap().as_str(),
            "wss://api.sonas.example/api/v1"
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let ws = Url::parse("ws://127.0.0.1:9000/api/v1").unwrap();
        let config = ClientConfig::new("api.sonas.example", "user", "pass").ws_base(ws.clone());

        assert_eq!(config.resolve_ws_base().unwrap(), ws);
        assert_eq!(
            config.resolve_http_base().unwrap().as_str(),
            "https://api.sonas.example/api/v1"
        );
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = ClientConfig::new("not a host", "user", "pass");
        assert!(matches!(
            config.resolve_http_base(),
            Err(SonasError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_envelope_and_permissions_parse() {
        let body = r#"{"data": {"products": ["BS", "HH"], "terms": ["Nov-24"]}}"#;
        let envelope: ApiEnvelope<DataPermissions> = serde_json::from_str(body).unwrap();

        assert_eq!(envelope.data.products, vec!["BS", "HH"]);
        assert_eq!(envelope.data.terms, vec!["Nov-24"]);
    }

    #[test]
    fn test_permissions_fields_default_when_absent() {
        let envelope: ApiEnvelope<DataPermissions> =
            serde_json::from_str(r#"{"data": {"products": ["BS"]}}"#).unwrap();

        assert_eq!(envelope.data.products, vec!["BS"]);
        assert!(envelope.data.terms.is_empty());
    }
}
