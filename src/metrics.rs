use std::time::Duration;

use crate::time_series::WpmSample;

/// Characters per "word" in the standard wpm definition
pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub wpm: u32,
    pub accuracy: u32,
}

impl Metrics {
    pub fn compute(correct: usize, typed: usize, elapsed: Option<Duration>) -> Self {
        Self {
            wpm: elapsed.map_or(0, |e| words_per_minute(correct, e)),
            accuracy: accuracy(correct, typed),
        }
    }
}

/// Net words per minute over `elapsed`, rounded. Zero when no time has passed.
pub fn words_per_minute(correct: usize, elapsed: Duration) -> u32 {
    let minutes = elapsed.as_millis() as f64 / 60_000.0;
    if minutes <= 0.0 {
        return 0;
    }
    ((correct as f64 / CHARS_PER_WORD) / minutes).round() as u32
}

/// Share of typed characters that were correct, as a rounded percentage
pub fn accuracy(correct: usize, typed: usize) -> u32 {
    if typed == 0 {
        return 0;
    }
    ((correct as f64 / typed as f64) * 100.0).round() as u32
}

/// Standard deviation of the sampled wpm values
pub fn consistency(samples: &[WpmSample]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().map(|s| s.wpm).sum::<f64>() / n;
    let variance = samples
        .iter()
        .map(|s| {
            let diff = s.wpm - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some(variance.sqrt())
}
