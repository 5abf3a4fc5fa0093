//! WebSocket layer: wire messages, the per-connection exchange and relay.
//!
//! The endpoint at `/ws` serves exactly one request/response exchange per
//! connection: one request in, progress events and one terminal event out.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod relay;
