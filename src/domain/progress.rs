//! Fixed-step progress plan for one exchange.
//!
//! [`ProgressPlan`] yields the `(step, total)` pairs in order and renders the
//! human-readable message attached to each progress event.

use std::time::Duration;

use crate::config::AnalysisSettings;

/// Ordered list of progress steps with a fixed delay before each one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPlan {
    total: u32,
    interval: Duration,
}

impl ProgressPlan {
    /// Creates a plan with `total` steps separated by `interval`.
    #[must_use]
    pub const fn new(total: u32, interval: Duration) -> Self {
        Self { total, interval }
    }

    /// Number of steps in the plan.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Delay before each step.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Step numbers `1..=total`, strictly increasing, no gaps.
    pub fn steps(&self) -> impl Iterator<Item = u32> + use<> {
        1..=self.total
    }

    /// Message reported alongside `step`.
    #[must_use]
    pub fn message(&self, step: u32) -> String {
        format!("Analyzing... step {step}/{}", self.total)
    }
}

impl From<&AnalysisSettings> for ProgressPlan {
    fn from(settings: &AnalysisSettings) -> Self {
        Self::new(settings.total_steps, settings.step_interval)
    }
}
