//! The outcome recorder: a bounded sliding window of recent call outcomes.

use std::collections::VecDeque;

/// The result of one completed or abandoned guarded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// The call returned a real response within the timeout.
    Success,
    /// The call returned an error.
    Failure,
    /// The call exceeded its timeout (or was abandoned by the caller).
    Timeout,
}

impl CallOutcome {
    /// Returns `true` for the outcomes that count toward the failure ratio.
    pub fn counts_as_failure(&self) -> bool {
        !matches!(self, CallOutcome::Success)
    }

    /// A short static label for metrics and log fields.
    pub fn label(&self) -> &'static str {
        match self {
            CallOutcome::Success => "success",
            CallOutcome::Failure => "failure",
            CallOutcome::Timeout => "timeout",
        }
    }
}

/// A fixed-capacity FIFO of the most recent call outcomes, ordered by call
/// completion.
///
/// The window slides: once at capacity, recording a new outcome evicts the
/// oldest. It is not cleared when the circuit trips, only by an explicit
/// [`reset`](OutcomeWindow::reset) after a successful recovery trial.
#[derive(Debug, Clone)]
pub struct OutcomeWindow {
    outcomes: VecDeque<CallOutcome>,
    capacity: usize,
    min_samples: usize,
}

impl OutcomeWindow {
    /// Creates a window holding at most `capacity` outcomes.
    ///
    /// `failure_ratio` reports 0.0 until at least `min_samples` outcomes have
    /// been recorded, so sparse traffic cannot trip the circuit prematurely.
    pub fn new(capacity: usize, min_samples: usize) -> Self {
        Self {
            outcomes: VecDeque::with_capacity(capacity),
            capacity,
            min_samples,
        }
    }

    /// Appends an outcome, evicting the oldest when at capacity.
    pub fn record(&mut self, outcome: CallOutcome) {
        if self.outcomes.len() == self.capacity {
            self.outcomes.pop_front();
        }
        self.outcomes.push_back(outcome);
    }

    /// The fraction of recorded outcomes that are failures or timeouts,
    /// in `[0, 1]`. Returns 0.0 below the minimum sample count.
    pub fn failure_ratio(&self) -> f64 {
        if self.outcomes.len() < self.min_samples || self.outcomes.is_empty() {
            return 0.0;
        }
        self.failure_count() as f64 / self.outcomes.len() as f64
    }

    /// Number of recorded failures and timeouts.
    pub fn failure_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.counts_as_failure())
            .count()
    }

    /// Number of recorded successes.
    pub fn success_count(&self) -> usize {
        self.outcomes.len() - self.failure_count()
    }

    /// Number of outcomes currently in the window.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns `true` if no outcomes have been recorded.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Clears the window.
    pub fn reset(&mut self) {
        self.outcomes.clear();
    }
}
