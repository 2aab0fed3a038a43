use std::f64::consts::PI;

use super::{SampledSignal, TimeGrid};
use crate::error::{DspError, DspResult};

/// Carrier grid sampled at `oversampling * carrier_frequency` covering
/// `[0, duration)`.
pub fn carrier_grid(
    duration: f64,
    carrier_frequency: f64,
    oversampling: usize,
) -> DspResult<TimeGrid> {
    if !carrier_frequency.is_finite() || carrier_frequency <= 0.0 {
        return Err(DspError::invalid_param(
            "carrier_frequency",
            format!("must be positive, got {carrier_frequency}"),
        ));
    }
    if oversampling == 0 {
        return Err(DspError::invalid_param(
            "oversampling",
            "must be at least 1",
        ));
    }
    TimeGrid::covering(duration, oversampling as f64 * carrier_frequency)
}

/// Cosine carrier `c[i] = cos(2π f_c t_i)` on `grid`.
pub fn generate_carrier(
    grid: &TimeGrid,
    carrier_frequency: f64,
) -> DspResult<SampledSignal> {
    if !carrier_frequency.is_finite() || carrier_frequency <= 0.0 {
        return Err(DspError::invalid_param(
            "carrier_frequency",
            format!("must be positive, got {carrier_frequency}"),
        ));
    }
    let omega = 2.0 * PI * carrier_frequency;
    let samples = grid
        .instants()
        .map(|t| (omega * t).cos())
        .collect();
    SampledSignal::new(grid.rate, samples)
}

/// Test tone `amplitude * cos(2π f t)` lasting `duration` seconds.
pub fn generate_tone(
    frequency: f64,
    sample_rate: f64,
    duration: f64,
    amplitude: f64,
) -> DspResult<SampledSignal> {
    let grid = TimeGrid::covering(duration, sample_rate)?;
    let omega = 2.0 * PI * frequency;
    let samples = grid
        .instants()
        .map(|t| amplitude * (omega * t).cos())
        .collect();
    SampledSignal::new(sample_rate, samples)
}

pub fn silence(sample_rate: f64, len: usize) -> DspResult<SampledSignal> {
    SampledSignal::new(sample_rate, vec![0.0; len])
}
