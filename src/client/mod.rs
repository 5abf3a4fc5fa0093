//! Console client for the `/ws` exchange.

pub mod render;
pub mod session;

pub use render::Inbound;
pub use session::{SessionMachine, SessionSummary, run_session};
