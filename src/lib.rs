//! # analysis-gateway
//!
//! WebSocket gateway that runs one text-analysis exchange per connection.
//!
//! A client sends `{"text": ...}`; the server streams a fixed number of
//! progress events at a fixed interval, then one final event carrying the
//! transformed text, then closes. Validation and transform failures become
//! a single error event. A disconnecting client ends its own exchange and
//! nothing else.
//!
//! ## Architecture
//!
//! ```text
//! analysis-client (client/)
//!     │  ws
//!     ├── /ws upgrade (ws/handler)
//!     │     ├── local exchange (ws/connection) ── ProgressPlan + Transform (domain/)
//!     │     └── relay (ws/relay) ── upstream analysis server
//!     │
//!     └── /health, /config/analysis (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod ws;
