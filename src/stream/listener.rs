use crate::utils::SonasError;
use serde_json::Value;
use tokio::sync::mpsc;

/// Error type a [`StreamListener`] handler may return.
///
/// Handler failures are not swallowed: the streaming session terminates and
/// reports them as [`SonasError::Handler`], because a failing consumer is a
/// signal the caller may depend on to stop the stream.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Interface to be implemented to listen to streaming session events:
/// connection open, price updates, classified errors, and connection close.
///
/// All notifications for one session are dispatched by the session's own
/// task, one at a time, in receipt order; no two methods run concurrently
/// for the same session.
pub trait StreamListener: Send {
    /// Event handler called once after the WebSocket handshake succeeded,
    /// before any `SUBSCRIBE` message is sent.
    fn on_open(&mut self) {}

    /// Event handler called for each decoded inbound payload, in arrival
    /// order.
    ///
    /// Returning an `Err` terminates the session: the error propagates out of
    /// the receive loop exactly like a transport failure and reaches
    /// [`StreamListener::on_error`] as [`SonasError::Handler`].
    fn on_message(&mut self, update: Value) -> Result<(), HandlerError>;

    /// Event handler called once with the classified error that terminated
    /// the session.
    ///
    /// Never called for a caller-initiated stop or a normal remote close.
    fn on_error(&mut self, _error: &SonasError) {}

    /// Event handler called when the connection closed, with the close code
    /// and reason.
    ///
    /// A normal remote close (code 1000) reaches only this handler; an
    /// abnormal close reaches [`StreamListener::on_error`] first.
    fn on_close(&mut self, _code: u16, _reason: &str) {}
}

/// A stream listener that forwards price updates to a tokio mpsc channel.
///
/// This listener allows decoupling the reception of updates from their
/// processing, enabling asynchronous consumption of updates by other tasks.
/// If the receiving half is dropped the next update fails the handler, which
/// terminates the session; a vanished consumer must not be mistaken for a
/// healthy stream.
///
/// # Examples
///
/// ```ignore
/// use sonas_rs::stream::ChannelStreamListener;
///
/// let (mut listener, mut rx) = ChannelStreamListener::create_channel();
///
/// tokio::spawn(async move {
///     while let Some(update) = rx.recv().await {
///         println!("Received update: {update}");
///     }
/// });
///
/// client.stream_prices(&products, &terms, &mut listener).await?;
/// ```
pub struct ChannelStreamListener {
    /// Channel sender for forwarding decoded updates.
    sender: mpsc::UnboundedSender<Value>,
}

impl ChannelStreamListener {
    /// Creates a new `ChannelStreamListener` with the provided sender.
    pub fn new(sender: mpsc::UnboundedSender<Value>) -> Self {
        Self { sender }
    }

    /// Creates a new channel pair and returns both the listener and receiver.
    ///
    /// This is a convenience method that creates both the channel and the
    /// listener in a single call.
    pub fn create_channel() -> (Self, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl StreamListener for ChannelStreamListener {
    fn on_message(&mut self, update: Value) -> Result<(), HandlerError> {
        self.sender
            .send(update)
            .map_err(|_| HandlerError::from("update receiver dropped"))
    }
}
