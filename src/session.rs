use std::time::{Duration, Instant};

use crate::time_series::WpmSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Mutable state of one typing test
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub elapsed_start: Option<Instant>,
    pub typed_count: usize,
    pub correct_count: usize,
    pub running: bool,
    pub finished: bool,
    pub wpm_samples: Vec<WpmSample>,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match (self.running, self.finished) {
            (_, true) => Phase::Finished,
            (true, false) => Phase::Running,
            (false, false) => Phase::Idle,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.elapsed_start
            .map(|start| now.saturating_duration_since(start))
    }

    pub fn incorrect_count(&self) -> usize {
        self.typed_count - self.correct_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        let state = SessionState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.elapsed(Instant::now()), None);
        assert_eq!(state.incorrect_count(), 0);
    }

    #[test]
    fn phase_follows_flags() {
        let mut state = SessionState {
            running: true,
            ..Default::default()
        };
        assert_eq!(state.phase(), Phase::Running);

        state.running = false;
        state.finished = true;
        assert_eq!(state.phase(), Phase::Finished);
    }

    #[test]
    fn elapsed_since_start() {
        let start = Instant::now();
        let state = SessionState {
            elapsed_start: Some(start),
            ..Default::default()
        };
        assert_eq!(
            state.elapsed(start + Duration::from_millis(1500)),
            Some(Duration::from_millis(1500))
        );
    }
}
