use std::f64::consts::PI;

use num_complex::Complex64;

use super::{DemodFilter, Modulated, ModulationParams, carrier_and_message};
use crate::error::{DspError, DspResult};
use crate::filter::{design, lfilter};
use crate::signal::SampledSignal;

/// Running trapezoidal integral of `y` with spacing `dx`, starting at zero.
/// The output has the same length as `y`.
pub fn cumulative_trapezoid(y: &[f64], dx: f64) -> Vec<f64> {
    let mut integral = Vec::with_capacity(y.len());
    let mut acc = 0.0;
    if !y.is_empty() {
        integral.push(acc);
    }
    for pair in y.windows(2) {
        acc += 0.5 * dx * (pair[0] + pair[1]);
        integral.push(acc);
    }
    integral
}

/// Frequency-modulates `message`: `s(t) = cos(2π f_c t + k·∫m)` with
/// `k = percentage / 100` rad/s per unit amplitude.
pub fn modulate(message: &SampledSignal, params: &ModulationParams) -> DspResult<Modulated> {
    let (carrier, upsampled) = carrier_and_message(message, params)?;
    let k = params.index();
    let grid = carrier.time_grid();
    let phase = cumulative_trapezoid(upsampled.samples(), grid.step());
    let omega = 2.0 * PI * params.carrier_frequency;

    let samples = grid
        .instants()
        .zip(&phase)
        .map(|(t, phi)| (omega * t + k * phi).cos())
        .collect();
    let signal = SampledSignal::new(grid.rate, samples)?;

    tracing::debug!(
        index = k,
        peak_deviation_hz = k * upsampled.peak() / (2.0 * PI),
        "frequency modulation complete"
    );
    Ok(Modulated {
        signal,
        carrier,
        message: upsampled,
    })
}

/// Quadrature FM discriminator.
///
/// Mixes down with `cos` and `-sin` of the local carrier, low-passes both
/// branches at half the carrier frequency and measures the phase advance
/// between consecutive baseband samples. Dividing by `index / rate` turns
/// the phase step back into the message amplitude. The first output sample
/// has no predecessor and is zero.
pub fn demodulate(
    modulated: &SampledSignal,
    carrier_frequency: f64,
    index: f64,
    filter: &DemodFilter,
) -> DspResult<SampledSignal> {
    if index == 0.0 || !index.is_finite() {
        return Err(DspError::invalid_param(
            "percentage",
            format!("cannot discriminate a signal modulated with index {index}"),
        ));
    }
    let grid = modulated.time_grid();
    let omega = 2.0 * PI * carrier_frequency;

    let (in_phase, quadrature): (Vec<f64>, Vec<f64>) = grid
        .instants()
        .zip(modulated.samples())
        .map(|(t, s)| {
            let (sin, cos) = (omega * t).sin_cos();
            (s * cos, -s * sin)
        })
        .unzip();

    let coefficients = design(&filter.spec(carrier_frequency)?, grid.rate)?;
    let in_phase = lfilter(&coefficients, &in_phase)?;
    let quadrature = lfilter(&coefficients, &quadrature)?;

    let scale = grid.rate / index;
    let mut previous: Option<Complex64> = None;
    let samples = in_phase
        .iter()
        .zip(&quadrature)
        .map(|(&i, &q)| {
            let current = Complex64::new(i, q);
            let step = previous.map_or(0.0, |p| (current * p.conj()).arg());
            previous = Some(current);
            step * scale
        })
        .collect();
    SampledSignal::new(grid.rate, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::generate_tone;
    use crate::spectrum::dominant_frequency;

    #[test]
    fn trapezoid_starts_at_zero() {
        assert_eq!(cumulative_trapezoid(&[1.0, 1.0, 1.0], 0.5), vec![0.0, 0.5, 1.0]);
        assert_eq!(cumulative_trapezoid(&[0.0, 2.0, 4.0], 1.0), vec![0.0, 1.0, 4.0]);
        assert!(cumulative_trapezoid(&[], 1.0).is_empty());
        assert_eq!(cumulative_trapezoid(&[3.0], 1.0), vec![0.0]);
    }

    #[test]
    fn silent_message_is_the_bare_carrier() {
        let params = ModulationParams::new(100.0, 2000.0, 4).unwrap();
        let silent = SampledSignal::new(8000.0, vec![0.0; 4000]).unwrap();
        let modulated = modulate(&silent, &params).unwrap();
        assert_eq!(modulated.signal, modulated.carrier);
    }

    #[test]
    fn constant_message_shifts_the_frequency() {
        // k·m = 2π·100 rad/s moves a 2 kHz carrier to 2.1 kHz
        let params = ModulationParams::new(100.0 * 2.0 * PI * 100.0, 2000.0, 4).unwrap();
        let dc = SampledSignal::new(8000.0, vec![1.0; 8000]).unwrap();
        let modulated = modulate(&dc, &params).unwrap();
        let peak = dominant_frequency(&modulated.signal).unwrap();
        assert!((peak - 2100.0).abs() < 1.0, "dominant at {peak}");
    }

    #[test]
    fn envelope_stays_unit() {
        let params = ModulationParams::new(100.0, 30_000.0, 4).unwrap();
        let message = generate_tone(440.0, 8000.0, 0.25, 1.0).unwrap();
        let modulated = modulate(&message, &params).unwrap();
        assert!(modulated.signal.peak() <= 1.0);
    }

    #[test]
    fn discriminator_recovers_the_tone() {
        // about 80 Hz peak deviation around a 2 kHz carrier
        let params = ModulationParams::new(50_000.0, 2000.0, 4).unwrap();
        let message = generate_tone(100.0, 8000.0, 1.0, 1.0).unwrap();
        let modulated = modulate(&message, &params).unwrap();
        let recovered =
            demodulate(&modulated.signal, 2000.0, params.index(), &DemodFilter::default())
                .unwrap();

        assert_eq!(recovered.len(), modulated.signal.len());
        assert_eq!(recovered.samples()[0], 0.0);
        let settled = SampledSignal::new(8000.0, recovered.samples()[800..].to_vec()).unwrap();
        let peak = dominant_frequency(&settled).unwrap();
        assert!((peak - 100.0).abs() < 1.0, "dominant at {peak}");
        assert!((settled.peak() - 1.0).abs() < 0.05, "peak {}", settled.peak());
    }

    #[test]
    fn zero_index_cannot_be_discriminated() {
        let signal = SampledSignal::new(8000.0, vec![1.0; 64]).unwrap();
        assert!(matches!(
            demodulate(&signal, 2000.0, 0.0, &DemodFilter::default()),
            Err(DspError::InvalidParameter { .. })
        ));
    }
}
