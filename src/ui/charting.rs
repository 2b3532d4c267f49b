use crate::time_series::{peak_wpm, WpmSample};

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(samples: &[WpmSample]) -> (f64, f64) {
    let duration = samples.last().map_or(1.0, |s| s.secs).max(1.0);
    (duration, peak_wpm(samples))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
