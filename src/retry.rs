//! Request pacing for the resolver

use std::time::Duration;

use tokio::time::Instant;

/// Pause after every network attempt before the next one starts, courtesy
/// to the remote server. 50 ms matches what the publisher has tolerated so far.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(50);

/// How the resolver spaces and bounds its attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Minimum gap between the end of one attempt and the start of the next
    pub delay: Duration,
    /// Cap on brute-force attempts per language; `None` tries every candidate
    pub max_attempts: Option<usize>,
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            max_attempts: None,
        }
    }

    /// No delay at all, for tests and local mirrors
    pub fn immediate() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Number of candidates to try out of `available`
    pub fn attempts_for(&self, available: usize) -> usize {
        self.max_attempts.map_or(available, |cap| cap.min(available))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_REQUEST_DELAY)
    }
}

/// Enforces the policy delay after each attempt, whatever its outcome.
///
/// Call [`Pacer::ready`] before an attempt and [`Pacer::finished`] once it
/// has completed; the delay runs from the latter.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    last_finished: Option<Instant>,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: None,
        }
    }

    /// Wait until `delay` has passed since the previous attempt finished
    pub async fn ready(&mut self) {
        if let Some(last) = self.last_finished {
            if !self.delay.is_zero() {
                tokio::time::sleep_until(last + self.delay).await;
            }
        }
    }

    pub fn finished(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}
