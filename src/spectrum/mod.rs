//! Fourier analysis used for diagnostics: full spectra, bin frequencies and
//! short-time power spectrograms.

pub mod spectrogram;

pub use spectrogram::{Scaling, Spectrogram, spectrogram};

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::Serialize;

use crate::signal::SampledSignal;

/// Forward DFT of a real sequence.
pub fn fft(samples: &[f64]) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = samples.iter().map(|&s| Complex64::new(s, 0.0)).collect();
    if buffer.is_empty() {
        return buffer;
    }
    let mut planner = FftPlanner::<f64>::new();
    let plan = planner.plan_fft_forward(buffer.len());
    plan.process(&mut buffer);
    buffer
}

/// Frequencies of the `n` DFT bins for samples `spacing` seconds apart, in
/// the order `fft` returns them: zero, positive, then negative frequencies.
pub fn fftfreq(n: usize, spacing: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = 1.0 / (n as f64 * spacing);
    let positive = (n - 1) / 2 + 1;
    (0..n)
        .map(|i| {
            let bin = if i < positive {
                i as f64
            } else {
                i as f64 - n as f64
            };
            bin * scale
        })
        .collect()
}

/// A signal's DFT together with the frequency of every bin.
#[derive(Clone, Debug)]
pub struct Spectrum {
    pub bins: Vec<Complex64>,
    pub frequencies: Vec<f64>,
}

/// One-sided magnitude spectrum, the form written to disk.
#[derive(Clone, Debug, Serialize)]
pub struct MagnitudeSpectrum {
    pub frequencies: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl Spectrum {
    pub fn of(signal: &SampledSignal) -> Self {
        let bins = fft(signal.samples());
        let frequencies = fftfreq(signal.len(), 1.0 / signal.rate());
        Self { bins, frequencies }
    }

    /// Magnitudes of the non-negative frequency bins below Nyquist.
    pub fn positive(&self) -> MagnitudeSpectrum {
        let half = self.bins.len() / 2;
        MagnitudeSpectrum {
            frequencies: self.frequencies[..half].to_vec(),
            magnitudes: self.bins[..half].iter().map(|c| c.norm()).collect(),
        }
    }

    /// Frequency of the strongest positive bin, ignoring DC. `None` when the
    /// signal is too short to have one.
    pub fn dominant_frequency(&self) -> Option<f64> {
        let half = self.bins.len() / 2;
        (1..half)
            .max_by(|&a, &b| self.bins[a].norm().total_cmp(&self.bins[b].norm()))
            .map(|index| self.frequencies[index])
    }
}

/// Shortcut for `Spectrum::of(signal).dominant_frequency()`.
pub fn dominant_frequency(signal: &SampledSignal) -> Option<f64> {
    Spectrum::of(signal).dominant_frequency()
}
