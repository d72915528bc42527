//! Command channel for the now-playing widget
//!
//! A small HTTP API shaped like a platform method channel: callers send a
//! method name plus arguments and get back a success value, an error code or
//! "not implemented".

pub mod channel;
pub mod routes;
pub mod server;
pub mod types;

pub use channel::{handle_method_call, CHANNEL_NAME};
pub use server::ControlServer;
pub use types::*;
