//! Classification of transport-level failures.
//!
//! The streaming session funnels every handshake error, mid-stream error,
//! and close frame through this module so callers always see the same
//! taxonomy: 401 and 403 are distinguished from other handshake failures,
//! close frames are split into normal and abnormal closure, and everything
//! else falls through to a transport error.

use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::{Error as WsError, http};

use crate::utils::SonasError;

/// Close code reported when the connection dropped without a close frame.
pub(crate) const ABNORMAL_CLOSURE: u16 = 1006;

/// How a connection ended, as derived from the close frame (or its absence).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CloseKind {
    /// The remote end closed with the normal-closure code.
    Normal { code: u16, reason: String },
    /// The remote end closed with a non-normal code, or vanished.
    Abnormal { code: u16, reason: String },
}

/// Classifies a failed WebSocket handshake.
///
/// A non-101 handshake response surfaces its HTTP status: 401 maps to
/// [`SonasError::Unauthorized`], 403 to [`SonasError::Forbidden`]; anything
/// else stays a transport error.
pub(crate) fn handshake_error(error: WsError) -> SonasError {
    match error {
        WsError::Http(response) if response.status() == StatusCode::UNAUTHORIZED => {
            SonasError::Unauthorized {
                reason: body_text(response),
            }
        }
        WsError::Http(response) if response.status() == StatusCode::FORBIDDEN => {
            SonasError::Forbidden {
                reason: body_text(response),
            }
        }
        other => SonasError::Transport(other),
    }
}

/// Classifies an error raised by the receive half mid-stream.
///
/// A connection reset without a closing handshake is an abnormal closure
/// (code 1006) rather than a generic transport error, since the caller's
/// remediation is the same as for any other abrupt disconnect.
pub(crate) fn receive_error(error: WsError) -> SonasError {
    match error {
        WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            SonasError::ClosedAbnormally {
                code: ABNORMAL_CLOSURE,
                reason: "connection reset without closing handshake".to_string(),
            }
        }
        other => SonasError::Transport(other),
    }
}

/// Classifies a close frame received mid-stream.
///
/// Only the normal-closure code (1000) counts as a normal close; every other
/// code, and the absence of a frame, is abnormal.
pub(crate) fn close_frame(frame: Option<CloseFrame>) -> CloseKind {
    match frame {
        Some(frame) => {
            let code = u16::from(frame.code);
            let reason = frame.reason.as_str().to_string();
            if frame.code == CloseCode::Normal {
                CloseKind::Normal { code, reason }
            } else {
                CloseKind::Abnormal { code, reason }
            }
        }
        None => CloseKind::Abnormal {
            code: ABNORMAL_CLOSURE,
            reason: String::new(),
        },
    }
}

fn body_text(response: http::Response<Option<Vec<u8>>>) -> String {
    response
        .into_body()
        .map(|body| String::from_utf8_lossy(&body).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ErrorKind;

    fn http_error(status: u16, body: &str) -> WsError {
        let response = http::Response::builder()
            .status(status)
            .body(Some(body.as_bytes().to_vec()))
            .unwrap();
        WsError::Http(response)
    }

    #[test]
    fn test_handshake_401_is_unauthorized() {
        let err = handshake_error(http_error(401, "token expired"));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert!(err.to_string().contains("token expired"));
    }

    #[test]
    fn test_handshake_403_is_forbidden() {
        let err = handshake_error(http_error(403, "no streaming entitlement"));
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(err.to_string().contains("no streaming entitlement"));
    }

    #[test]
    fn test_handshake_other_status_is_transport() {
        let err = handshake_error(http_error(500, "boom"));
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_handshake_io_error_is_transport() {
        let err = handshake_error(WsError::ConnectionClosed);
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_receive_reset_is_abnormal_close() {
        let err = receive_error(WsError::Protocol(
            ProtocolError::ResetWithoutClosingHandshake,
        ));
        assert!(matches!(
            err,
            SonasError::ClosedAbnormally { code: 1006, .. }
        ));
    }

    #[test]
    fn test_normal_close_frame() {
        let kind = close_frame(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }));
        assert_eq!(
            kind,
            CloseKind::Normal {
                code: 1000,
                reason: "bye".to_string()
            }
        );
    }

    #[test]
    fn test_non_normal_close_frame() {
        let kind = close_frame(Some(CloseFrame {
            code: CloseCode::Error,
            reason: "server restart".into(),
        }));
        assert_eq!(
            kind,
            CloseKind::Abnormal {
                code: 1011,
                reason: "server restart".to_string()
            }
        );
    }

    #[test]
    fn test_missing_close_frame_is_abnormal() {
        let kind = close_frame(None);
        assert_eq!(
            kind,
            CloseKind::Abnormal {
                code: ABNORMAL_CLOSURE,
                reason: String::new()
            }
        );
    }
}
