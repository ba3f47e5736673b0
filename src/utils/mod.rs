/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 9/1/26
******************************************************************************/

/// Module containing custom error types used throughout the library.
///
/// This module provides the [`error::SonasError`] enum covering every failure
/// mode of the client, together with the stable [`error::ErrorKind`]
/// classification the streaming session reports through `on_error`.
pub mod error;
mod logger;
mod util;

pub use error::{ErrorKind, SonasError};
pub use logger::{setup_logger, setup_logger_with_level};
pub use util::setup_signal_hook;
