//! Sampled signals and the uniform time grids they live on.

pub mod carrier;
pub mod resample;

pub use carrier::{carrier_grid, generate_carrier, generate_tone, silence};
pub use resample::{interp, interpolate, resample};

use crate::error::{DspError, DspResult};

/// A real-valued signal sampled at a fixed rate.
///
/// Always holds at least one sample and a positive, finite rate. Every
/// transformation in the crate builds a new `SampledSignal` instead of
/// editing one in place.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSignal {
    rate: f64,
    samples: Vec<f64>,
}

impl SampledSignal {
    pub fn new(rate: f64, samples: Vec<f64>) -> DspResult<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DspError::invalid_param(
                "sample_rate",
                format!("must be positive and finite, got {rate}"),
            ));
        }
        if samples.is_empty() {
            return Err(DspError::invalid_param(
                "samples",
                "a sampled signal needs at least one sample",
            ));
        }
        Ok(Self { rate, samples })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Never true; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, `N / rate`.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.rate
    }

    /// The grid this signal is sampled on.
    pub fn time_grid(&self) -> TimeGrid {
        TimeGrid {
            rate: self.rate,
            len: self.samples.len(),
        }
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f64 {
        self.samples
            .iter()
            .fold(0.0, |acc: f64, &s| acc.max(s.abs()))
    }

    pub fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

/// Uniformly spaced sample instants `t_i = i / rate` for `i < len`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeGrid {
    pub rate: f64,
    pub len: usize,
}

impl TimeGrid {
    pub fn new(rate: f64, len: usize) -> DspResult<Self> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(DspError::invalid_param(
                "grid_rate",
                format!("must be positive and finite, got {rate}"),
            ));
        }
        Ok(Self { rate, len })
    }

    /// Grid covering `[0, duration)` at `rate`, i.e. `ceil(duration * rate)`
    /// instants. Products that land on an integer up to rounding noise are
    /// taken as exact so `1 s * 8000 Hz` gives 8000 instants, not 8001.
    pub fn covering(duration: f64, rate: f64) -> DspResult<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(DspError::invalid_param(
                "duration",
                format!("must be positive and finite, got {duration}"),
            ));
        }
        let exact = duration * rate;
        let rounded = exact.round();
        let len = if (exact - rounded).abs() <= 1e-9 * exact.max(1.0) {
            rounded
        } else {
            exact.ceil()
        };
        Self::new(rate, len as usize)
    }

    pub fn instant(&self, index: usize) -> f64 {
        index as f64 / self.rate
    }

    pub fn instants(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len).map(move |i| self.instant(i))
    }

    /// Spacing between consecutive instants.
    pub fn step(&self) -> f64 {
        1.0 / self.rate
    }

    pub fn duration(&self) -> f64 {
        self.len as f64 / self.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rate() {
        assert!(matches!(
            SampledSignal::new(0.0, vec![1.0]),
            Err(DspError::InvalidParameter { .. })
        ));
        assert!(SampledSignal::new(-8000.0, vec![1.0]).is_err());
        assert!(SampledSignal::new(f64::NAN, vec![1.0]).is_err());
    }

    #[test]
    fn rejects_empty_samples() {
        assert!(SampledSignal::new(8000.0, Vec::new()).is_err());
    }

    #[test]
    fn duration_and_grid_follow_rate() {
        let signal = SampledSignal::new(4.0, vec![0.0, 1.0, -2.0, 0.5, 0.0, 0.0]).unwrap();
        assert_eq!(signal.duration(), 1.5);
        assert_eq!(signal.peak(), 2.0);

        let grid = signal.time_grid();
        let instants: Vec<f64> = grid.instants().collect();
        assert_eq!(instants, vec![0.0, 0.25, 0.5, 0.75, 1.0, 1.25]);
    }

    #[test]
    fn covering_grid_counts_half_open_interval() {
        assert_eq!(TimeGrid::covering(1.0, 8000.0).unwrap().len, 8000);
        assert_eq!(TimeGrid::covering(0.1, 30.0).unwrap().len, 3);
        assert_eq!(TimeGrid::covering(0.105, 30.0).unwrap().len, 4);
        // 73113 samples at 8192 Hz carried onto a 120 kHz grid
        let duration = 73113.0 / 8192.0;
        let grid = TimeGrid::covering(duration, 120_000.0).unwrap();
        assert_eq!(grid.len, (duration * 120_000.0).ceil() as usize);
    }

    #[test]
    fn covering_rejects_zero_duration() {
        assert!(TimeGrid::covering(0.0, 8000.0).is_err());
    }
}
