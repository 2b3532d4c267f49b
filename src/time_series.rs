/// One point of the wpm-over-time series, taken on each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WpmSample {
    pub secs: f64,
    pub wpm: f64,
}

impl WpmSample {
    pub fn new(secs: f64, wpm: f64) -> Self {
        Self { secs, wpm }
    }
}

impl From<WpmSample> for (f64, f64) {
    fn from(s: WpmSample) -> Self {
        (s.secs, s.wpm)
    }
}

/// Highest wpm seen, rounded, for chart bounds
pub fn peak_wpm(samples: &[WpmSample]) -> f64 {
    samples
        .iter()
        .map(|s| s.wpm)
        .fold(0.0, f64::max)
        .round()
}
