//! Analog AM and FM modulation onto an oversampled cosine carrier, and the
//! matching coherent demodulators.
//!
//! Every modulator follows the same steps. It lays a carrier grid over the
//! message's duration at `oversampling * carrier_frequency`, linearly
//! interpolates the message onto that grid, then combines it with the
//! carrier. Demodulators take the modulated waveform on that grid and
//! return an estimate of the message on the same grid; callers resample it
//! back to the audio rate.

pub mod am;
pub mod fm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::error::{DspError, DspResult};
use crate::filter::{FilterFamily, FilterSpec};
use crate::signal::{SampledSignal, TimeGrid, carrier_grid, generate_carrier, resample};
use crate::utils::consts::{DEFAULT_CHEBYSHEV_RIPPLE_DB, DEFAULT_OVERSAMPLING, DEMOD_FILTER_ORDER};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationKind {
    #[default]
    Am,
    Fm,
}

impl FromStr for ModulationKind {
    type Err = DspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "am" => Ok(Self::Am),
            "fm" => Ok(Self::Fm),
            other => Err(DspError::invalid_param(
                "modulation",
                format!("expected 'am' or 'fm', got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for ModulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Am => f.write_str("AM"),
            Self::Fm => f.write_str("FM"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmVariant {
    /// `(1 + k·m)·c`, carrier transmitted alongside the sidebands.
    #[default]
    Full,
    /// `k·m·c`, double sideband with the carrier suppressed.
    SuppressedCarrier,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModulationParams {
    /// Modulation percentage; the index is `percentage / 100`.
    pub percentage: f64,
    pub carrier_frequency: f64,
    pub oversampling: usize,
}

impl ModulationParams {
    pub fn new(percentage: f64, carrier_frequency: f64, oversampling: usize) -> DspResult<Self> {
        let params = Self {
            percentage,
            carrier_frequency,
            oversampling,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_default_oversampling(percentage: f64, carrier_frequency: f64) -> DspResult<Self> {
        Self::new(percentage, carrier_frequency, DEFAULT_OVERSAMPLING)
    }

    pub fn validate(&self) -> DspResult<()> {
        if !self.percentage.is_finite() {
            return Err(DspError::invalid_param(
                "percentage",
                format!("must be finite, got {}", self.percentage),
            ));
        }
        if !self.carrier_frequency.is_finite() || self.carrier_frequency <= 0.0 {
            return Err(DspError::invalid_param(
                "carrier_frequency",
                format!("must be positive, got {}", self.carrier_frequency),
            ));
        }
        if self.oversampling == 0 {
            return Err(DspError::invalid_param("oversampling", "must be at least 1"));
        }
        Ok(())
    }

    pub fn index(&self) -> f64 {
        self.percentage / 100.0
    }

    /// Sample rate of the carrier grid.
    pub fn grid_rate(&self) -> f64 {
        self.oversampling as f64 * self.carrier_frequency
    }
}

/// Low-pass used after mixing with the local carrier. The cutoff is always
/// half the carrier frequency.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemodFilter {
    pub family: FilterFamily,
    pub order: usize,
    pub ripple: f64,
}

impl Default for DemodFilter {
    fn default() -> Self {
        Self {
            family: FilterFamily::Butterworth,
            order: DEMOD_FILTER_ORDER,
            ripple: DEFAULT_CHEBYSHEV_RIPPLE_DB,
        }
    }
}

impl DemodFilter {
    pub fn spec(&self, carrier_frequency: f64) -> DspResult<FilterSpec> {
        FilterSpec::new(
            self.family,
            crate::filter::Band::LowPass {
                cutoff: carrier_frequency / 2.0,
            },
            self.order,
            self.ripple,
        )
    }
}

/// Output of a modulator. Keeps the carrier and the upsampled message so
/// demodulation and diagnostics share the exact grid the waveform was built
/// on.
#[derive(Clone, Debug)]
pub struct Modulated {
    pub signal: SampledSignal,
    pub carrier: SampledSignal,
    pub message: SampledSignal,
}

impl Modulated {
    pub fn grid(&self) -> TimeGrid {
        self.signal.time_grid()
    }
}

/// Carrier on the oversampled grid plus the message interpolated onto it.
pub(crate) fn carrier_and_message(
    message: &SampledSignal,
    params: &ModulationParams,
) -> DspResult<(SampledSignal, SampledSignal)> {
    params.validate()?;
    let grid = carrier_grid(
        message.duration(),
        params.carrier_frequency,
        params.oversampling,
    )?;
    let carrier = generate_carrier(&grid, params.carrier_frequency)?;
    let upsampled = resample(message, &grid)?;
    tracing::debug!(
        message_samples = message.len(),
        grid_samples = grid.len,
        grid_rate = grid.rate,
        "message interpolated onto carrier grid"
    );
    Ok((carrier, upsampled))
}

/// Sample-wise product of two signals on the same grid.
pub(crate) fn mix(a: &SampledSignal, b: &SampledSignal) -> DspResult<Vec<f64>> {
    if a.len() != b.len() {
        return Err(DspError::shape_mismatch("carrier mixing", a.len(), b.len()));
    }
    if a.rate() != b.rate() {
        return Err(DspError::invalid_param(
            "sample_rate",
            format!("cannot mix signals at {} Hz and {} Hz", a.rate(), b.rate()),
        ));
    }
    Ok(a.samples()
        .iter()
        .zip(b.samples())
        .map(|(x, y)| x * y)
        .collect())
}

/// Modulates `message` as configured.
pub fn modulate(message: &SampledSignal, config: &Configuration) -> DspResult<Modulated> {
    let params = config.params()?;
    tracing::info!(
        kind = %config.modulation,
        percentage = params.percentage,
        carrier_hz = params.carrier_frequency,
        "modulating"
    );
    match config.modulation {
        ModulationKind::Am => am::modulate(message, &params, config.am_variant),
        ModulationKind::Fm => fm::modulate(message, &params),
    }
}

/// Recovers the message from a waveform modulated with `config`. The result
/// stays on the carrier grid.
pub fn demodulate(modulated: &SampledSignal, config: &Configuration) -> DspResult<SampledSignal> {
    let params = config.params()?;
    tracing::info!(kind = %config.modulation, carrier_hz = params.carrier_frequency, "demodulating");
    match config.modulation {
        ModulationKind::Am => {
            let detected = am::demodulate(modulated, params.carrier_frequency, &config.demod_filter)?;
            am::recover_message(&detected, params.index(), config.am_variant)
        }
        ModulationKind::Fm => fm::demodulate(
            modulated,
            params.carrier_frequency,
            params.index(),
            &config.demod_filter,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_from_cli_text() {
        assert_eq!("am".parse::<ModulationKind>().unwrap(), ModulationKind::Am);
        assert_eq!("FM".parse::<ModulationKind>().unwrap(), ModulationKind::Fm);
        assert!("pm".parse::<ModulationKind>().is_err());
    }

    #[test]
    fn params_reject_bad_carrier() {
        assert!(ModulationParams::new(50.0, 0.0, 4).is_err());
        assert!(ModulationParams::new(50.0, -1.0, 4).is_err());
        assert!(ModulationParams::new(50.0, 2000.0, 0).is_err());
        assert!(ModulationParams::new(f64::NAN, 2000.0, 4).is_err());
    }

    #[test]
    fn index_is_percentage_over_hundred() {
        let params = ModulationParams::with_default_oversampling(15.0, 30_000.0).unwrap();
        assert!((params.index() - 0.15).abs() < 1e-15);
        assert_eq!(params.grid_rate(), 120_000.0);
    }

    #[test]
    fn mixing_requires_equal_lengths() {
        let a = SampledSignal::new(8000.0, vec![1.0; 4]).unwrap();
        let b = SampledSignal::new(8000.0, vec![1.0; 5]).unwrap();
        assert!(matches!(mix(&a, &b), Err(DspError::ShapeMismatch { .. })));
    }

    #[test]
    fn demod_filter_cuts_at_half_carrier() {
        let spec = DemodFilter::default().spec(2000.0).unwrap();
        assert_eq!(spec.band, crate::filter::Band::LowPass { cutoff: 1000.0 });
        assert_eq!(spec.order, DEMOD_FILTER_ORDER);
    }
}
