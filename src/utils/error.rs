/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 9/1/26
******************************************************************************/

//! Error types for the Sonas client.
//!
//! All fallible operations in this crate return [`SonasError`]. The variants
//! carry the structure a caller needs to decide between re-authenticating,
//! escalating an entitlement problem, or retrying with a fresh session;
//! [`SonasError::kind`] collapses them into the stable [`ErrorKind`] taxonomy.

use thiserror::Error;

/// Error type returned by every fallible operation in this crate.
#[derive(Debug, Error)]
pub enum SonasError {
    /// The login exchange against the token endpoint was rejected.
    ///
    /// No token is cached; the next call that needs a token retries the login.
    #[error("authentication failed ({status}): {body}")]
    AuthenticationFailed {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Response body as returned by the server.
        body: String,
    },

    /// A caller-supplied parameter was rejected before any network activity.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A streaming session is already active on this client instance.
    ///
    /// One client serves one session at a time; await the prior session's
    /// termination or create a second client.
    #[error("a streaming session is already active on this client")]
    SessionActive,

    /// The server rejected the request or handshake with HTTP 401.
    ///
    /// Credentials were rejected or the token expired; re-login and retry.
    #[error("unauthorized: {reason}")]
    Unauthorized {
        /// Response body accompanying the rejection, when present.
        reason: String,
    },

    /// The server rejected the request or handshake with HTTP 403.
    ///
    /// The account lacks the streaming entitlement, or a duplicate session
    /// already exists for this identity. Not retryable without operator
    /// intervention.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Response body accompanying the rejection, when present.
        reason: String,
    },

    /// The connection closed with a non-normal close code, or dropped
    /// without a closing handshake (code 1006).
    #[error("connection closed abnormally ({code}): {reason}")]
    ClosedAbnormally {
        /// Close code from the close frame, or 1006 when none was received.
        code: u16,
        /// Reason text from the close frame, empty when none was supplied.
        reason: String,
    },

    /// Any other WebSocket transport failure.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// An inbound payload was not valid JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// A REST endpoint answered with a non-success status outside 401/403.
    #[error("api error ({status}): {body}")]
    Api {
        /// HTTP status returned by the endpoint.
        status: u16,
        /// Response body as returned by the server.
        body: String,
    },

    /// An HTTP request could not be completed.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A caller-supplied handler returned an error during dispatch.
    ///
    /// The source error is carried as-is; the session treats it exactly like
    /// a transport failure and terminates.
    #[error("message handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Stable classification of a [`SonasError`].
///
/// This is the taxonomy callers should branch on: the concrete variants carry
/// detail, the kind tells the caller which remediation applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Login exchange failed; retrying performs a fresh login.
    AuthenticationFailed,
    /// Caller misuse: bad parameters or a second concurrent session.
    InvalidConfiguration,
    /// HTTP 401: re-authenticate and retry.
    Unauthorized,
    /// HTTP 403: entitlement or duplicate-session problem.
    Forbidden,
    /// Non-normal close code or connection drop.
    ClosedAbnormally,
    /// I/O, encoding, or protocol violation.
    Transport,
    /// Failure propagated from a caller-supplied handler.
    Handler,
}

impl SonasError {
    /// Classify this error into the stable [`ErrorKind`] taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            Self::InvalidConfiguration(_) | Self::SessionActive => ErrorKind::InvalidConfiguration,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ClosedAbnormally { .. } => ErrorKind::ClosedAbnormally,
            Self::Transport(_) | Self::MalformedPayload(_) | Self::Api { .. } | Self::Http(_) => {
                ErrorKind::Transport
            }
            Self::Handler(_) => ErrorKind::Handler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let cases: Vec<(SonasError, ErrorKind)> = vec![
            (
                SonasError::AuthenticationFailed {
                    status: 401,
                    body: "bad credentials".to_string(),
                },
                ErrorKind::AuthenticationFailed,
            ),
            (
                SonasError::InvalidConfiguration("max_per_batch must be at least 1".to_string()),
                ErrorKind::InvalidConfiguration,
            ),
            (SonasError::SessionActive, ErrorKind::InvalidConfiguration),
            (
                SonasError::Unauthorized {
                    reason: String::new(),
                },
                ErrorKind::Unauthorized,
            ),
            (
                SonasError::Forbidden {
                    reason: String::new(),
                },
                ErrorKind::Forbidden,
            ),
            (
                SonasError::ClosedAbnormally {
                    code: 1011,
                    reason: "server restart".to_string(),
                },
                ErrorKind::ClosedAbnormally,
            ),
            (
                SonasError::Api {
                    status: 500,
                    body: String::new(),
                },
                ErrorKind::Transport,
            ),
            (
                SonasError::Handler("consumer gone".into()),
                ErrorKind::Handler,
            ),
        ];

        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "wrong kind for {error:?}");
        }
    }

    #[test]
    fn test_malformed_payload_is_transport() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert_eq!(SonasError::from(err).kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_display_carries_detail() {
        let err = SonasError::ClosedAbnormally {
            code: 1011,
            reason: "server restart".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("1011"));
        assert!(text.contains("server restart"));
    }
}
