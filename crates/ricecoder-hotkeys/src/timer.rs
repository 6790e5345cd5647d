//! Cancellable single-shot timer used for sequence auto-resolution

use std::time::{Duration, Instant};

/// How long a session waits for the next key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceTimeout {
    /// Wait for Enter or Escape
    Never,
    /// Resolve after this much inactivity; zero resolves immediately
    After(Duration),
}

impl SequenceTimeout {
    /// `None` means no timeout
    pub fn from_millis(ms: Option<u64>) -> Self {
        match ms {
            Some(ms) => SequenceTimeout::After(Duration::from_millis(ms)),
            None => SequenceTimeout::Never,
        }
    }

    pub fn is_immediate(&self) -> bool {
        matches!(self, SequenceTimeout::After(d) if d.is_zero())
    }
}

/// A single-shot deadline that can be re-armed or cancelled at any time
///
/// The timer never fires by itself: the owner asks [`SequenceTimer::fire`]
/// whether the deadline has passed. Cancelling an idle or fired timer is a
/// no-op.
#[derive(Debug, Default)]
pub struct SequenceTimer {
    deadline: Option<Instant>,
    generation: u64,
}

impl SequenceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending deadline, then arm a new one unless the timeout is `Never`
    pub fn arm(&mut self, now: Instant, timeout: SequenceTimeout) -> bool {
        self.cancel();
        match timeout {
            SequenceTimeout::After(duration) => {
                self.generation += 1;
                self.deadline = Some(now + duration);
                tracing::debug!(generation = self.generation, ?duration, "sequence timer armed");
                true
            }
            SequenceTimeout::Never => false,
        }
    }

    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            tracing::debug!(generation = self.generation, "sequence timer cancelled");
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Number of times the timer has been armed
    #[cfg(test)]
    fn generation(&self) -> u64 {
        self.generation
    }

    /// Disarm and return true if the deadline has passed at `now`
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
