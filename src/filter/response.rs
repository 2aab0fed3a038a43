use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use super::FilterCoefficients;
use crate::error::{DspError, DspResult};

/// Magnitude response sampled on `[0, Nyquist)`.
#[derive(Clone, Debug, Serialize)]
pub struct FrequencyResponse {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl FrequencyResponse {
    pub fn magnitudes_db(&self) -> Vec<f64> {
        self.magnitudes
            .iter()
            .map(|m| 20.0 * m.max(f64::MIN_POSITIVE).log10())
            .collect()
    }

    /// Magnitude at the sampled frequency closest to `frequency`.
    pub fn magnitude_at(&self, frequency: f64) -> Option<f64> {
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .min_by(|(a, _), (b, _)| (*a - frequency).abs().total_cmp(&(*b - frequency).abs()))
            .map(|(_, m)| *m)
    }
}

/// Evaluates `|H(e^{jω})|` at `points` evenly spaced frequencies from 0 up
/// to (not including) Nyquist.
pub fn frequency_response(
    coefficients: &FilterCoefficients,
    sample_rate: f64,
    points: usize,
) -> DspResult<FrequencyResponse> {
    if points == 0 {
        return Err(DspError::invalid_param("points", "must be at least 1"));
    }
    let evaluate = |c: &[f64], z_inv: Complex64| {
        c.iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &v| acc * z_inv + v)
    };

    let mut frequencies = Vec::with_capacity(points);
    let mut magnitudes = Vec::with_capacity(points);
    for k in 0..points {
        let omega = PI * k as f64 / points as f64;
        let z_inv = Complex64::from_polar(1.0, -omega);
        let h = evaluate(&coefficients.b, z_inv) / evaluate(&coefficients.a, z_inv);
        frequencies.push(omega * sample_rate / (2.0 * PI));
        magnitudes.push(h.norm());
    }
    Ok(FrequencyResponse {
        frequencies,
        magnitudes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterFamily, FilterSpec, design};

    #[test]
    fn butterworth_is_half_power_at_cutoff() {
        let spec = FilterSpec::lowpass(FilterFamily::Butterworth, 4, 1000.0).unwrap();
        let coefficients = design(&spec, 8000.0).unwrap();
        let response = frequency_response(&coefficients, 8000.0, 8000).unwrap();

        assert_eq!(response.frequencies[0], 0.0);
        assert!((response.magnitudes[0] - 1.0).abs() < 1e-9);
        let at_cutoff = response.magnitude_at(1000.0).unwrap();
        assert!((at_cutoff - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!(response.magnitude_at(3500.0).unwrap() < 1e-3);
    }

    #[test]
    fn decibels_of_unit_gain_are_zero() {
        let coefficients = FilterCoefficients::new(vec![1.0], vec![1.0]).unwrap();
        let response = frequency_response(&coefficients, 100.0, 4).unwrap();
        assert_eq!(response.frequencies, vec![0.0, 12.5, 25.0, 37.5]);
        assert!(response.magnitudes_db().iter().all(|db| db.abs() < 1e-12));
    }
}
