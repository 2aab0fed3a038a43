use super::{AmVariant, DemodFilter, Modulated, ModulationParams, carrier_and_message, mix};
use crate::error::{DspError, DspResult};
use crate::filter::design;
use crate::signal::{SampledSignal, generate_carrier};

/// Coherent detection doubles the filtered product back to `1 + k·m`.
const DETECTION_GAIN: f64 = 2.0;

/// Amplitude-modulates `message` onto a cosine carrier.
///
/// With `k = percentage / 100`, the full variant produces `(1 + k·m)·c` and
/// the suppressed-carrier variant `k·m·c`.
pub fn modulate(
    message: &SampledSignal,
    params: &ModulationParams,
    variant: AmVariant,
) -> DspResult<Modulated> {
    let (carrier, upsampled) = carrier_and_message(message, params)?;
    let k = params.index();

    let envelope: Vec<f64> = upsampled
        .samples()
        .iter()
        .map(|m| match variant {
            AmVariant::Full => 1.0 + k * m,
            AmVariant::SuppressedCarrier => k * m,
        })
        .collect();
    let envelope = SampledSignal::new(carrier.rate(), envelope)?;
    let signal = SampledSignal::new(carrier.rate(), mix(&envelope, &carrier)?)?;

    tracing::debug!(
        ?variant,
        index = k,
        peak = signal.peak(),
        "amplitude modulation complete"
    );
    Ok(Modulated {
        signal,
        carrier,
        message: upsampled,
    })
}

/// Coherent AM detector. Mixes with a local carrier in phase with the
/// transmitter, low-passes at half the carrier frequency and doubles the
/// result.
///
/// For the full variant the output is about `1 + k·m`; for suppressed
/// carrier it is about `k·m`. The filter starts from rest, so the first
/// few milliseconds carry its transient.
pub fn demodulate(
    modulated: &SampledSignal,
    carrier_frequency: f64,
    filter: &DemodFilter,
) -> DspResult<SampledSignal> {
    let carrier = generate_carrier(&modulated.time_grid(), carrier_frequency)?;
    let product = SampledSignal::new(modulated.rate(), mix(modulated, &carrier)?)?;

    let coefficients = design(&filter.spec(carrier_frequency)?, modulated.rate())?;
    let filtered = coefficients.apply(&product)?;

    let detected = filtered
        .into_samples()
        .into_iter()
        .map(|s| s * DETECTION_GAIN)
        .collect();
    SampledSignal::new(modulated.rate(), detected)
}

/// Maps a detector output back to the message.
///
/// For the full variant the carrier level is taken as the mean of the
/// detected envelope, so a waveform that was rescaled on its way to disk
/// (for instance peak-normalized into a WAV) still recovers `m`. Suppressed
/// carrier output is divided by the index only.
pub fn recover_message(
    detected: &SampledSignal,
    index: f64,
    variant: AmVariant,
) -> DspResult<SampledSignal> {
    if index == 0.0 || !index.is_finite() {
        return Err(DspError::invalid_param(
            "percentage",
            format!("cannot recover a message modulated with index {index}"),
        ));
    }
    let (offset, scale) = match variant {
        AmVariant::Full => {
            let level = detected.mean();
            if level.abs() < f64::EPSILON {
                return Err(DspError::invalid_param(
                    "signal",
                    "detected envelope has no carrier component",
                ));
            }
            (level, index * level)
        }
        AmVariant::SuppressedCarrier => (0.0, index),
    };
    let samples = detected
        .samples()
        .iter()
        .map(|d| (d - offset) / scale)
        .collect();
    SampledSignal::new(detected.rate(), samples)
}
