use std::time::Duration;

use crate::config::SpeedConfig;

/// Number of speed thresholds `score` has crossed.
#[must_use]
pub fn speed_step(score: u32, config: &SpeedConfig) -> u32 {
    score / config.points_per_step.max(1)
}

/// Speed relative to the base interval, e.g. `1.44` after two steps.
#[must_use]
pub fn speed_multiplier(score: u32, config: &SpeedConfig) -> f64 {
    config.step_factor.powi(step_exponent(score, config))
}

/// Tick interval for `score`.
///
/// The base interval is divided by `step_factor` once per crossed threshold
/// and clamped to `min_interval_ms`. Depends on nothing but `score`, so it
/// never grows as the score grows.
#[must_use]
pub fn tick_interval_for_score(score: u32, config: &SpeedConfig) -> Duration {
    let base_micros = config.base_interval_ms as f64 * 1_000.0;
    let floor_micros = config.min_interval_ms.saturating_mul(1_000);

    let scaled = base_micros / speed_multiplier(score, config);
    let micros = if scaled.is_finite() {
        scaled.round() as u64
    } else {
        0
    };

    Duration::from_micros(micros.max(floor_micros))
}

fn step_exponent(score: u32, config: &SpeedConfig) -> i32 {
    i32::try_from(speed_step(score, config)).unwrap_or(i32::MAX)
}
