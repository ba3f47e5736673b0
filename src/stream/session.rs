//! The streaming session: connection lifecycle, subscription sends, and the
//! receive loop.
//!
//! One session serves one `stream_prices` invocation: connect with a bearer
//! header, send the subscription batches in order, then deliver inbound
//! updates to the listener until the caller stops the session, the remote
//! end closes, or an unrecoverable failure occurs. Every failure is terminal
//! for the session; reconnection is the caller's responsibility.

use std::sync::Arc;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::CredentialProvider;
use crate::stream::classify::{self, CloseKind};
use crate::stream::dispatch;
use crate::stream::listener::StreamListener;
use crate::subscription::{SubscribeCommand, Subscription};
use crate::utils::SonasError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Close reason sent when the caller stops the session.
const STOP_REASON: &str = "client stop";

/// State of a streaming session, published through a watch channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No session has run yet on this client.
    #[default]
    Idle,
    /// Acquiring credentials and opening the transport connection.
    Connecting,
    /// Connection open, subscription batches being sent.
    Subscribing,
    /// Receive loop running, updates flowing to the listener.
    Streaming,
    /// Caller-initiated stop observed, closing the connection.
    Stopping,
    /// Session over; the client may start a new one.
    Closed,
}

/// How the receive loop ended.
enum Exit {
    /// The stop token was cancelled.
    Stopped,
    /// The remote end closed the connection.
    Closed(CloseKind),
    /// A transport, decode, or handler failure terminated the loop.
    Failed(SonasError),
}

/// A single streaming session over the price-stream WebSocket.
///
/// Constructed by [`crate::client::SonasClient::stream_prices`]; owns the
/// connection for its whole lifetime and reports every outcome through the
/// caller's [`StreamListener`].
pub(crate) struct StreamSession {
    ws_url: Url,
    credentials: CredentialProvider,
    state: Arc<watch::Sender<SessionState>>,
    cancel: CancellationToken,
}

impl StreamSession {
    pub(crate) fn new(
        ws_url: Url,
        credentials: CredentialProvider,
        state: Arc<watch::Sender<SessionState>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            ws_url,
            credentials,
            state,
            cancel,
        }
    }

    /// Runs the session to completion.
    ///
    /// Connect-time and subscribe-time failures abort immediately; the
    /// classified error reaches `on_error` before any further protocol
    /// activity. Once streaming, the loop ends only through the stop token,
    /// a connection close, or an unrecoverable failure.
    pub(crate) async fn run<L: StreamListener>(
        self,
        batches: Vec<Vec<Subscription>>,
        listener: &mut L,
    ) {
        self.transition(SessionState::Connecting);

        let header = match self.credentials.bearer_header().await {
            Ok(header) => header,
            Err(err) => {
                self.transition(SessionState::Closed);
                warn!(error = %err, "login failed, session aborted");
                listener.on_error(&err);
                return;
            }
        };

        info!(url = %self.ws_url, "connecting to price stream");
        let (mut write, mut read) = match self.connect(&header).await {
            Ok(socket) => socket,
            Err(err) => {
                self.transition(SessionState::Closed);
                warn!(error = %err, "price stream handshake failed");
                listener.on_error(&err);
                return;
            }
        };

        listener.on_open();
        self.transition(SessionState::Subscribing);

        if let Err(err) = self.send_batches(&mut write, batches).await {
            self.transition(SessionState::Closed);
            warn!(error = %err, "failed to send subscriptions");
            listener.on_error(&err);
            return;
        }

        self.transition(SessionState::Streaming);
        let exit = self.receive_loop(&mut write, &mut read, listener).await;

        match exit {
            Exit::Stopped => {
                self.transition(SessionState::Stopping);
                info!("stop requested, closing price stream");
                let frame = CloseFrame {
                    code: CloseCode::Normal,
                    reason: STOP_REASON.into(),
                };
                if let Err(err) = write.send(Message::Close(Some(frame))).await {
                    debug!(error = %err, "close frame could not be sent");
                }
                let _ = write.flush().await;
                self.transition(SessionState::Closed);
                listener.on_close(u16::from(CloseCode::Normal), STOP_REASON);
            }
            Exit::Closed(CloseKind::Normal { code, reason }) => {
                self.transition(SessionState::Closed);
                info!(code, reason = %reason, "price stream closed by server");
                listener.on_close(code, &reason);
            }
            Exit::Closed(CloseKind::Abnormal { code, reason }) => {
                self.transition(SessionState::Closed);
                warn!(code, reason = %reason, "price stream closed abnormally");
                let err = SonasError::ClosedAbnormally {
                    code,
                    reason: reason.clone(),
                };
                listener.on_error(&err);
                listener.on_close(code, &reason);
            }
            Exit::Failed(err) => {
                self.transition(SessionState::Closed);
                warn!(error = %err, "price stream terminated");
                listener.on_error(&err);
            }
        }
    }

    /// Opens the WebSocket with the bearer header attached.
    async fn connect(&self, header: &str) -> Result<(WsSink, WsSource), SonasError> {
        let mut request = self
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(classify::handshake_error)?;
        let value = HeaderValue::from_str(header).map_err(|err| {
            SonasError::InvalidConfiguration(format!("bearer header not representable: {err}"))
        })?;
        request.headers_mut().insert(AUTHORIZATION, value);

        let (socket, _response) = connect_async(request)
            .await
            .map_err(classify::handshake_error)?;
        Ok(socket.split())
    }

    /// Sends each batch as one `SUBSCRIBE` message, in batch order.
    ///
    /// Each send completes before the next begins so the server observes the
    /// batches in the order the batcher produced them.
    async fn send_batches(
        &self,
        write: &mut WsSink,
        batches: Vec<Vec<Subscription>>,
    ) -> Result<(), SonasError> {
        let total = batches.len();
        for (index, batch) in batches.into_iter().enumerate() {
            debug!(
                batch = index + 1,
                total,
                entries = batch.len(),
                "sending SUBSCRIBE batch"
            );
            let command = SubscribeCommand::new(batch);
            let text = serde_json::to_string(&command)?;
            write.send(Message::Text(text.into())).await?;
        }
        Ok(())
    }

    /// Blocks on the socket, delivering updates until the session ends.
    ///
    /// The select is biased towards the stop token: after `stop()` at most
    /// one already-buffered message is observed before the loop exits.
    async fn receive_loop<L: StreamListener>(
        &self,
        write: &mut WsSink,
        read: &mut WsSource,
        listener: &mut L,
    ) -> Exit {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Exit::Stopped,
                frame = read.next() => match frame {
                    None => {
                        return Exit::Closed(CloseKind::Abnormal {
                            code: classify::ABNORMAL_CLOSURE,
                            reason: String::new(),
                        });
                    }
                    Some(Err(err)) => return Exit::Failed(classify::receive_error(err)),
                    Some(Ok(Message::Close(frame))) => {
                        return Exit::Closed(classify::close_frame(frame));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(err) = write.send(Message::Pong(data)).await {
                            return Exit::Failed(SonasError::Transport(err));
                        }
                    }
                    Some(Ok(message)) => {
                        if let Err(err) = dispatch::dispatch(listener, &message) {
                            return Exit::Failed(err);
                        }
                    }
                },
            }
        }
    }

    fn transition(&self, state: SessionState) {
        debug!(?state, "session state");
        self.state.send_replace(state);
    }
}
