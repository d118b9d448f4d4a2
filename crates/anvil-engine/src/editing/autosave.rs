use std::time::{Duration, Instant};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(30);

/// Debounced autosave timer.
///
/// Every dirty-marking edit calls [`Autosave::arm`], pushing the deadline
/// out; a burst of edits therefore fires at most once per quiet period.
#[derive(Debug, Clone)]
pub struct Autosave {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Autosave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

impl Autosave {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True once the deadline has passed; firing disarms the timer.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: Duration = Duration::from_secs(1);

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut autosave = Autosave::new(5 * SEC);
        autosave.arm(start);

        assert!(!autosave.due(start + 4 * SEC));
        assert!(autosave.due(start + 5 * SEC));
        assert!(!autosave.due(start + 6 * SEC));
        assert!(!autosave.is_pending());
    }

    #[test]
    fn rearming_pushes_deadline_out() {
        let start = Instant::now();
        let mut autosave = Autosave::new(5 * SEC);
        autosave.arm(start);
        autosave.arm(start + 3 * SEC);
        autosave.arm(start + 4 * SEC);

        assert!(!autosave.due(start + 6 * SEC));
        assert!(autosave.due(start + 9 * SEC));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut autosave = Autosave::new(SEC);
        autosave.arm(start);
        autosave.cancel();
        assert!(!autosave.due(start + 10 * SEC));
    }
}
