//! IIR filter design (Butterworth, Chebyshev type I, Bessel) and direct-form
//! application.
//!
//! A [`FilterSpec`] is validated when it is built, [`design`] turns it into
//! transfer-function coefficients for a given sample rate, and
//! [`FilterCoefficients::apply`] runs the causal recursive filter over a
//! signal with zero initial conditions.

pub mod apply;
pub mod design;
pub mod response;

pub use apply::lfilter;
pub use design::design;
pub use response::{FrequencyResponse, frequency_response};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DspError, DspResult};
use crate::signal::SampledSignal;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFamily {
    /// Maximally flat passband.
    Butterworth,
    /// Chebyshev type I, equiripple passband.
    Chebyshev,
    /// Maximally flat group delay.
    Bessel,
}

impl FromStr for FilterFamily {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "butter" | "butterworth" => Ok(Self::Butterworth),
            "cheb" | "cheby1" | "chebyshev" => Ok(Self::Chebyshev),
            "bessel" => Ok(Self::Bessel),
            other => Err(DspError::invalid_param(
                "filter_family",
                format!("unknown filter family '{other}'"),
            )),
        }
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Butterworth => "butterworth",
            Self::Chebyshev => "chebyshev",
            Self::Bessel => "bessel",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BandType {
    Low,
    High,
    Band,
}

impl FromStr for BandType {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "lowpass" => Ok(Self::Low),
            "high" | "highpass" => Ok(Self::High),
            "band" | "bandpass" => Ok(Self::Band),
            other => Err(DspError::invalid_param(
                "band_type",
                format!("unknown band type '{other}'"),
            )),
        }
    }
}

/// Pass band with its cutoff frequencies in Hz.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Band {
    LowPass { cutoff: f64 },
    HighPass { cutoff: f64 },
    BandPass { low: f64, high: f64 },
}

impl Band {
    /// Builds a band from a band type and a cutoff list. Band-pass takes
    /// exactly two cutoffs, the other types exactly one.
    pub fn from_cutoffs(band_type: BandType, cutoffs: &[f64]) -> DspResult<Self> {
        match (band_type, cutoffs) {
            (BandType::Low, &[cutoff]) => Ok(Self::LowPass { cutoff }),
            (BandType::High, &[cutoff]) => Ok(Self::HighPass { cutoff }),
            (BandType::Band, &[low, high]) => Ok(Self::BandPass { low, high }),
            (BandType::Band, _) => Err(DspError::invalid_param(
                "cutoff",
                format!(
                    "band-pass needs exactly two cutoff frequencies, got {}",
                    cutoffs.len()
                ),
            )),
            (_, _) => Err(DspError::invalid_param(
                "cutoff",
                format!(
                    "low/high-pass needs exactly one cutoff frequency, got {}",
                    cutoffs.len()
                ),
            )),
        }
    }

    pub fn band_type(&self) -> BandType {
        match self {
            Self::LowPass { .. } => BandType::Low,
            Self::HighPass { .. } => BandType::High,
            Self::BandPass { .. } => BandType::Band,
        }
    }

    fn cutoffs(&self) -> Vec<f64> {
        match *self {
            Self::LowPass { cutoff } | Self::HighPass { cutoff } => vec![cutoff],
            Self::BandPass { low, high } => vec![low, high],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub family: FilterFamily,
    pub band: Band,
    pub order: usize,
    /// Passband ripple in dB, only read for Chebyshev designs.
    pub ripple: f64,
}

impl FilterSpec {
    pub fn new(family: FilterFamily, band: Band, order: usize, ripple: f64) -> DspResult<Self> {
        if order == 0 {
            return Err(DspError::invalid_param("order", "must be at least 1"));
        }
        let cutoffs = band.cutoffs();
        if let Some(bad) = cutoffs.iter().find(|c| !c.is_finite() || **c <= 0.0) {
            return Err(DspError::invalid_param(
                "cutoff",
                format!("cutoff frequencies must be positive, got {bad}"),
            ));
        }
        if let Band::BandPass { low, high } = band {
            if low >= high {
                return Err(DspError::invalid_param(
                    "cutoff",
                    format!("band-pass edges must satisfy low < high, got {low} and {high}"),
                ));
            }
        }
        if family == FilterFamily::Chebyshev && (!ripple.is_finite() || ripple <= 0.0) {
            return Err(DspError::invalid_param(
                "ripple",
                format!("chebyshev ripple must be positive dB, got {ripple}"),
            ));
        }
        Ok(Self {
            family,
            band,
            order,
            ripple,
        })
    }

    pub fn lowpass(family: FilterFamily, order: usize, cutoff: f64) -> DspResult<Self> {
        Self::new(
            family,
            Band::LowPass { cutoff },
            order,
            crate::utils::consts::DEFAULT_CHEBYSHEV_RIPPLE_DB,
        )
    }

    /// Cutoffs divided by the Nyquist frequency of `sample_rate`. Every
    /// value has to land strictly inside `(0, 1)`.
    pub fn normalized_cutoffs(&self, sample_rate: f64) -> DspResult<Vec<f64>> {
        let nyquist = sample_rate * 0.5;
        let normalized: Vec<f64> = self
            .band
            .cutoffs()
            .into_iter()
            .map(|c| c / nyquist)
            .collect();
        if let Some(bad) = normalized.iter().find(|w| **w <= 0.0 || **w >= 1.0) {
            return Err(DspError::invalid_param(
                "cutoff",
                format!(
                    "cutoff must lie below the Nyquist frequency {nyquist} Hz (normalized {bad})"
                ),
            ));
        }
        Ok(normalized)
    }
}

/// Numerator `b` and denominator `a` of a rational transfer function,
/// highest power of `z^-1` last.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoefficients {
    pub b: Vec<f64>,
    pub a: Vec<f64>,
}

impl FilterCoefficients {
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> DspResult<Self> {
        if b.is_empty() {
            return Err(DspError::invalid_param("b", "numerator is empty"));
        }
        match a.first() {
            None => Err(DspError::invalid_param("a", "denominator is empty")),
            Some(&a0) if a0 == 0.0 => Err(DspError::invalid_param(
                "a",
                "leading denominator coefficient must be non-zero",
            )),
            Some(_) => Ok(Self { b, a }),
        }
    }

    /// Gain at 0 Hz, `sum(b) / sum(a)`.
    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Gain at the Nyquist frequency.
    pub fn nyquist_gain(&self) -> f64 {
        let alternate = |c: &[f64]| {
            c.iter()
                .enumerate()
                .map(|(i, v)| if i % 2 == 0 { *v } else { -*v })
                .sum::<f64>()
        };
        alternate(&self.b) / alternate(&self.a)
    }

    pub fn apply(&self, signal: &SampledSignal) -> DspResult<SampledSignal> {
        let filtered = lfilter(self, signal.samples())?;
        SampledSignal::new(signal.rate(), filtered)
    }
}

/// Designs the filter for `signal`'s rate and runs it over the signal.
pub fn filter_signal(signal: &SampledSignal, spec: &FilterSpec) -> DspResult<SampledSignal> {
    let coefficients = design(spec, signal.rate())?;
    tracing::debug!(
        family = %spec.family,
        order = spec.order,
        taps = coefficients.b.len(),
        "applying designed filter"
    );
    coefficients.apply(signal)
}
