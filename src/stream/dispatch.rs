//! Delivery of inbound frames to the caller's listener.
//!
//! Each Text or Binary frame is decoded to JSON and handed to
//! [`StreamListener::on_message`] synchronously, one at a time, in receipt
//! order. Handler failures are not caught here: they surface to the receive
//! loop as [`SonasError::Handler`] and terminate the session, because
//! swallowing them would silently drop a halted-consumer signal.

use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use crate::stream::listener::StreamListener;
use crate::utils::SonasError;

/// Outcome of offering one frame to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dispatch {
    /// The frame carried a payload and it was delivered to the listener.
    Delivered,
    /// The frame carried no payload for the listener (control frames).
    Skipped,
}

/// Decodes `message` and delivers its payload to `listener`.
///
/// Text and Binary frames must contain valid JSON; anything else is a
/// protocol violation and terminates the session. Control frames are
/// reported as [`Dispatch::Skipped`] and handled by the receive loop.
pub(crate) fn dispatch<L: StreamListener>(
    listener: &mut L,
    message: &Message,
) -> Result<Dispatch, SonasError> {
    let payload: Value = match message {
        Message::Text(text) => serde_json::from_str(text.as_str())?,
        Message::Binary(data) => serde_json::from_slice(data)?,
        _ => return Ok(Dispatch::Skipped),
    };

    listener
        .on_message(payload)
        .map_err(SonasError::Handler)?;
    Ok(Dispatch::Delivered)
}
