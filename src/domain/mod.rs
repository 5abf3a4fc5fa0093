//! Domain layer: the progress plan and the pluggable transform.
//!
//! Nothing here knows about sockets; the WebSocket layer drives these
//! types through one exchange per connection.

pub mod progress;
pub mod transform;

pub use progress::ProgressPlan;
pub use transform::{Transform, TransformError, TransformKind};
