//! # Sonas Rust Client
//!
//! This crate is a Rust client for the Sonas pricing service. It covers the
//! service's REST API (authentication, data permissions, snapshot and
//! historical price queries) and its streaming API: a persistent WebSocket
//! endpoint delivering live price updates for subscribed (product, term)
//! pairs.
//!
//! ## About the streaming session
//!
//! The heart of the crate is the authenticated streaming subscription
//! session. One call to [`client::SonasClient::stream_prices`] runs a whole
//! session:
//!
//! - Lazily logs in against the token endpoint and opens the WebSocket with
//!   the resulting bearer token attached.
//! - Builds the full subscription set as the cross-product of the caller's
//!   product and term lists, partitions it into batches within the
//!   protocol's per-message limit, and sends each batch as one `SUBSCRIBE`
//!   message, in order.
//! - Runs the receive loop, delivering each decoded update to the caller's
//!   [`stream::StreamListener`] in arrival order, one at a time.
//! - Classifies every failure (credentials rejected, entitlement missing,
//!   abrupt disconnect, malformed payload) into a stable taxonomy before
//!   reporting it, so callers can decide between re-authenticating,
//!   escalating, or retrying with a fresh session.
//! - Supports cooperative stop: [`client::SonasClient::stop`] takes effect
//!   at the next receive iteration and closes the connection cleanly,
//!   without an error callback.
//!
//! The session never retries or reconnects on its own and does not replay
//! messages missed while disconnected; recovery is the caller's decision,
//! made with the classified error in hand.
//!
//! ## Features
//!
//! - **Authentication**: HTTP Basic login exchange, bearer-token caching on
//!   the client instance, lazy re-login on first use.
//! - **Subscription batching**: product-major cross-product, chunked to at
//!   most [`subscription::MAX_SUBSCRIPTIONS_PER_MESSAGE`] entries per
//!   message (configurable per client).
//! - **Event listeners**: a small capability trait
//!   ([`stream::StreamListener`]) with open/message/error/close hooks, plus
//!   a ready-made channel adapter ([`stream::ChannelStreamListener`]) for
//!   consuming updates from another task.
//! - **Error classification**: one [`utils::SonasError`] enum with a stable
//!   [`utils::ErrorKind`] mapping; 401 and 403 handshake rejections are
//!   distinguished from transport failures, close frames from dropped
//!   connections.
//! - **REST queries**: data permissions, price snapshot, historical prices,
//!   and the admin historical upload, all sharing the token cache.
//!
//! ## Usage
//!
//! ```ignore
//! use sonas_rs::client::SonasClient;
//! use sonas_rs::stream::ChannelStreamListener;
//! use sonas_rs::utils::setup_logger;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     setup_logger();
//!
//!     let client = SonasClient::with_credentials(
//!         std::env::var("SONAS_HOST")?,
//!         std::env::var("SONAS_USERNAME")?,
//!         std::env::var("SONAS_PASSWORD")?,
//!     )?;
//!
//!     // Discover what this account may stream.
//!     let permissions = client.get_data_permissions().await?;
//!
//!     // Consume updates from a separate task.
//!     let (mut listener, mut rx) = ChannelStreamListener::create_channel();
//!     tokio::spawn(async move {
//!         while let Some(update) = rx.recv().await {
//!             println!("{update}");
//!         }
//!     });
//!
//!     client
//!         .stream_prices(&permissions.products, &permissions.terms, &mut listener)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! Stopping from another task (or from inside a listener callback) is a
//! plain method call:
//!
//! ```ignore
//! client.stop(); // takes effect at the next receive iteration
//! ```

/// Module containing client-related functionality.
///
/// This module provides the main `SonasClient` type together with its
/// configuration, the credential provider that caches the bearer token, and
/// the REST query methods.
pub mod client;

/// Module containing subscription-related functionality.
///
/// This module provides the `Subscription` wire type, the `SUBSCRIBE`
/// message, and the batching of a product/term cross-product into
/// protocol-sized messages.
pub mod subscription;

/// Module containing streaming-related functionality.
///
/// This module provides the streaming session state, the `StreamListener`
/// capability trait, and the channel-based listener adapter.
pub mod stream;

/// Module containing utility functions and error types.
///
/// This module provides the crate-wide error type and its classification,
/// logging setup helpers, and the signal hook bridging SIGINT/SIGTERM to a
/// session stop.
pub mod utils;
