//! Piecewise-linear resampling between time grids.
//!
//! Values requested outside the source range are clamped to the first or
//! last source sample.

use super::{SampledSignal, TimeGrid};
use crate::error::{DspError, DspResult};

/// Linear interpolation of the points `(xp, fp)` at every `x`.
///
/// `xp` must be non-decreasing. Queries left of `xp[0]` give `fp[0]`,
/// queries right of the last point give the last value.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> DspResult<Vec<f64>> {
    if xp.len() != fp.len() {
        return Err(DspError::shape_mismatch("interp", xp.len(), fp.len()));
    }
    if xp.is_empty() {
        return Err(DspError::invalid_param("xp", "needs at least one point"));
    }
    if xp.windows(2).any(|w| w[1] < w[0]) {
        return Err(DspError::invalid_param("xp", "must be non-decreasing"));
    }

    let last = xp.len() - 1;
    let values = x
        .iter()
        .map(|&t| {
            if t <= xp[0] {
                return fp[0];
            }
            if t >= xp[last] {
                return fp[last];
            }
            // first index with xp[idx] > t; always in 1..=last here
            let upper = xp.partition_point(|&v| v <= t);
            let lower = upper - 1;
            let span = xp[upper] - xp[lower];
            if span == 0.0 {
                return fp[upper];
            }
            let frac = (t - xp[lower]) / span;
            fp[lower] + frac * (fp[upper] - fp[lower])
        })
        .collect();
    Ok(values)
}

/// Sample `signal` at every instant of `grid`.
pub fn interpolate(signal: &SampledSignal, grid: &TimeGrid) -> DspResult<Vec<f64>> {
    let source = signal.samples();
    let last = source.len() - 1;

    let values = grid
        .instants()
        .map(|t| {
            let mut position = t * signal.rate();
            let nearest = position.round();
            if (position - nearest).abs() < 1e-9 {
                position = nearest;
            }
            if position <= 0.0 {
                return source[0];
            }
            if position >= last as f64 {
                return source[last];
            }
            let index = position.floor() as usize;
            let frac = position - index as f64;
            source[index] + frac * (source[index + 1] - source[index])
        })
        .collect();
    Ok(values)
}

/// `interpolate`, wrapped as a signal at the grid's rate.
pub fn resample(signal: &SampledSignal, grid: &TimeGrid) -> DspResult<SampledSignal> {
    let samples = interpolate(signal, grid)?;
    SampledSignal::new(grid.rate, samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interp_clamps_and_interpolates() {
        let xp = [1.0, 2.0, 3.0];
        let fp = [3.0, 2.0, 0.0];
        let out = interp(&[0.0, 1.0, 1.5, 2.72, 3.14], &xp, &fp).unwrap();
        let expected = [3.0, 3.0, 2.5, 0.56, 0.0];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn interp_rejects_mismatched_points() {
        let err = interp(&[0.5], &[0.0, 1.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            DspError::ShapeMismatch {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn interp_rejects_decreasing_points() {
        assert!(interp(&[0.5], &[1.0, 0.0], &[1.0, 2.0]).is_err());
        assert!(interp(&[0.5], &[], &[]).is_err());
    }

    #[test]
    fn identical_grid_is_identity() {
        let samples: Vec<f64> = (0..257).map(|i| ((i * 37) % 101) as f64 - 50.0).collect();
        let signal = SampledSignal::new(8192.0, samples.clone()).unwrap();
        let out = interpolate(&signal, &signal.time_grid()).unwrap();
        assert_eq!(out.len(), samples.len());
        for (a, b) in out.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn uniform_path_agrees_with_general_interp() {
        let signal = SampledSignal::new(10.0, vec![0.0, 1.0, 4.0, 9.0, 16.0]).unwrap();
        let grid = TimeGrid::new(40.0, 24).unwrap();
        let xp: Vec<f64> = signal.time_grid().instants().collect();
        let x: Vec<f64> = grid.instants().collect();
        let general = interp(&x, &xp, signal.samples()).unwrap();
        let uniform = interpolate(&signal, &grid).unwrap();
        for (a, b) in general.iter().zip(&uniform) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn upsampling_clamps_past_last_sample() {
        let signal = SampledSignal::new(2.0, vec![0.0, 2.0]).unwrap();
        let grid = TimeGrid::covering(signal.duration(), 8.0).unwrap();
        let out = resample(&signal, &grid).unwrap();
        assert_eq!(out.rate(), 8.0);
        assert_eq!(out.samples(), &[0.0, 0.5, 1.0, 1.5, 2.0, 2.0, 2.0, 2.0]);
    }
}
