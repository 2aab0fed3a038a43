use std::f64::consts::PI;

use num_complex::Complex64;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

use crate::error::{DspError, DspResult};
use crate::signal::SampledSignal;

/// Fraction of a segment tapered by the Tukey window.
const TUKEY_ALPHA: f64 = 0.25;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// Power spectrum in V², normalized by `(Σw)²`.
    #[default]
    Spectrum,
    /// Power spectral density in V²/Hz, normalized by `fs·Σw²`.
    Density,
}

#[derive(Clone, Debug, Serialize)]
pub struct Spectrogram {
    pub frequencies: Vec<f64>,
    /// Centre of each segment in seconds.
    pub times: Vec<f64>,
    /// `power[f][t]` for frequency bin `f` and segment `t`.
    pub power: Vec<Vec<f64>>,
}

impl Spectrogram {
    pub fn segments(&self) -> usize {
        self.times.len()
    }

    /// Power converted to decibels, floored to avoid `log10(0)`.
    pub fn power_db(&self) -> Vec<Vec<f64>> {
        self.power
            .iter()
            .map(|row| row.iter().map(|p| 10.0 * p.max(1e-20).log10()).collect())
            .collect()
    }
}

/// Short-time power spectrum of `signal` over `segment_len`-sample windows
/// overlapping by one eighth.
///
/// Each segment has its mean removed and is weighted with a periodic
/// Tukey window before the FFT. Only non-negative frequencies are returned,
/// with the power of mirrored bins folded in.
pub fn spectrogram(
    signal: &SampledSignal,
    segment_len: usize,
    scaling: Scaling,
) -> DspResult<Spectrogram> {
    if segment_len < 2 {
        return Err(DspError::invalid_param(
            "segment_len",
            format!("needs at least 2 samples per segment, got {segment_len}"),
        ));
    }
    if signal.len() < segment_len {
        return Err(DspError::invalid_param(
            "segment_len",
            format!(
                "signal has {} samples, shorter than one {segment_len}-sample segment",
                signal.len()
            ),
        ));
    }

    let overlap = segment_len / 8;
    let step = segment_len - overlap;
    let count = (signal.len() - segment_len) / step + 1;
    let window = tukey_window(segment_len, TUKEY_ALPHA);
    let bins = segment_len / 2 + 1;

    let scale = match scaling {
        Scaling::Spectrum => 1.0 / window.iter().sum::<f64>().powi(2),
        Scaling::Density => 1.0 / (signal.rate() * window.iter().map(|w| w * w).sum::<f64>()),
    };
    // mirrored bins: everything except DC and, for even lengths, Nyquist
    let folded_end = if segment_len % 2 == 0 { bins - 1 } else { bins };

    let mut planner = FftPlanner::<f64>::new();
    let plan = planner.plan_fft_forward(segment_len);

    let mut power = vec![Vec::with_capacity(count); bins];
    let mut times = Vec::with_capacity(count);
    let samples = signal.samples();

    for segment in 0..count {
        let start = segment * step;
        let chunk = &samples[start..start + segment_len];
        let mean = chunk.iter().sum::<f64>() / segment_len as f64;

        let mut buffer: Vec<Complex64> = chunk
            .iter()
            .zip(&window)
            .map(|(s, w)| Complex64::new((s - mean) * w, 0.0))
            .collect();
        plan.process(&mut buffer);

        for (k, row) in power.iter_mut().enumerate() {
            let mut value = buffer[k].norm_sqr() * scale;
            if k > 0 && k < folded_end {
                value *= 2.0;
            }
            row.push(value);
        }
        times.push((start as f64 + segment_len as f64 / 2.0) / signal.rate());
    }

    let frequencies = (0..bins)
        .map(|k| k as f64 * signal.rate() / segment_len as f64)
        .collect();

    Ok(Spectrogram {
        frequencies,
        times,
        power,
    })
}

/// Periodic Tukey window: the symmetric window of length `len + 1` with
/// its last point dropped.
fn tukey_window(len: usize, alpha: f64) -> Vec<f64> {
    let m = len + 1;
    let span = (m - 1) as f64;
    let taper = alpha * span / 2.0;
    (0..len)
        .map(|n| {
            let n = n as f64;
            if n < taper {
                0.5 * (1.0 + (PI * (n / taper - 1.0)).cos())
            } else if n > span - taper {
                0.5 * (1.0 + (PI * ((span - n) / taper - 1.0)).cos())
            } else {
                1.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::generate_tone;

    #[test]
    fn segment_layout_follows_overlap() {
        let tone = generate_tone(1000.0, 8000.0, 1.0, 1.0).unwrap();
        let result = spectrogram(&tone, 1024, Scaling::Spectrum).unwrap();
        // step = 1024 - 128 = 896, (8000 - 1024) / 896 + 1 = 8
        assert_eq!(result.segments(), 8);
        assert_eq!(result.frequencies.len(), 513);
        assert_eq!(result.power.len(), 513);
        assert!(result.power.iter().all(|row| row.len() == 8));
        assert!((result.times[0] - 512.0 / 8000.0).abs() < 1e-12);
        assert!((result.times[1] - (896.0 + 512.0) / 8000.0).abs() < 1e-12);
    }

    #[test]
    fn tone_power_peaks_at_its_bin() {
        let tone = generate_tone(1000.0, 8000.0, 1.0, 1.0).unwrap();
        let result = spectrogram(&tone, 1024, Scaling::Spectrum).unwrap();
        // 1000 Hz / (8000 / 1024) = bin 128
        for segment in 0..result.segments() {
            let loudest = (0..result.frequencies.len())
                .max_by(|&a, &b| result.power[a][segment].total_cmp(&result.power[b][segment]))
                .unwrap();
            assert_eq!(loudest, 128);
        }
    }

    #[test]
    fn spectrum_scaling_reports_tone_power() {
        // a unit cosine centred on a bin carries A^2 / 2 = 0.5 V^2
        let tone = generate_tone(1000.0, 8000.0, 1.0, 1.0).unwrap();
        let result = spectrogram(&tone, 1024, Scaling::Spectrum).unwrap();
        let peak = result.power[128][0];
        assert!((peak - 0.5).abs() < 0.02, "peak power {peak}");
    }

    #[test]
    fn short_signal_is_rejected() {
        let tone = generate_tone(100.0, 8000.0, 0.01, 1.0).unwrap();
        assert!(matches!(
            spectrogram(&tone, 1024, Scaling::Density),
            Err(DspError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn tukey_window_is_flat_in_the_middle() {
        let window = tukey_window(16, 0.25);
        assert_eq!(window.len(), 16);
        assert_eq!(window[0], 0.0);
        assert_eq!(window[8], 1.0);
        assert!(window.iter().all(|w| (0.0..=1.0).contains(w)));
    }
}
