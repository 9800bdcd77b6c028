//! Retry and Backoff Policy

use crate::client::Delivery;
use crate::error::DeliveryError;
use std::time::Duration;

/// Result of a single delivery attempt
#[derive(Debug)]
pub enum AttemptOutcome {
    /// 2xx response with a JSON body
    Delivered(Delivery),
    /// Failure another attempt may fix
    Retryable(DeliveryError),
    /// Failure no retry can fix
    Fatal(DeliveryError),
}

/// What to do after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Payload delivered
    Finish,
    /// Wait, then try again
    RetryAfter(Duration),
    /// Stop and report failure
    GiveUp,
}

/// Bounded retry policy with linearly widening timeouts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts before giving up (default: 3)
    pub max_attempts: u32,
    /// Total time budget in seconds, from `timeout`
    pub budget_secs: u64,
    /// Pause between attempts (default: 1 second)
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            budget_secs: 60,
            pause: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Default policy for a given time budget
    pub fn with_budget(budget_secs: u64) -> Self {
        Self {
            budget_secs,
            ..Default::default()
        }
    }

    /// Timeout for a 1-based attempt: `max(1, budget / 12 * 2 * attempt)` seconds
    pub fn attempt_timeout(&self, attempt: u32) -> Duration {
        let secs = (self.budget_secs as f64 / 12.0) * 2.0 * f64::from(attempt);
        Duration::from_secs_f64(secs.max(1.0))
    }

    /// Decide the next step after `attempt` produced `outcome`
    pub fn next_step(&self, attempt: u32, outcome: &AttemptOutcome) -> NextStep {
        match outcome {
            AttemptOutcome::Delivered(_) => NextStep::Finish,
            AttemptOutcome::Fatal(_) => NextStep::GiveUp,
            AttemptOutcome::Retryable(_) if attempt < self.max_attempts => {
                NextStep::RetryAfter(self.pause)
            }
            AttemptOutcome::Retryable(_) => NextStep::GiveUp,
        }
    }
}
