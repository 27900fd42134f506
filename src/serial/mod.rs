//! Serial Transport Module
//!
//! Owns the single serial connection to the LED controller and provides
//! the bounded line-write primitive used by the command gateway.

mod channel;

pub use channel::{ConnectionError, SerialChannel, TransportError};
