//! Digital IIR design through the bilinear transform.
//!
//! Every family starts from a normalized analog low-pass prototype in
//! zero/pole/gain form, is moved to the requested band in the analog
//! domain, mapped to the z-plane and finally expanded into `b`/`a`
//! polynomials. Cutoffs arrive normalized to Nyquist, so the design runs
//! at a nominal sample rate of 2.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::{Band, FilterCoefficients, FilterFamily, FilterSpec};
use crate::error::{DspError, DspResult};

/// Nominal sample rate the design works at; Nyquist is 1.
const DESIGN_RATE: f64 = 2.0;

/// Bessel roots come from an iterative solver that loses accuracy as the
/// polynomial coefficients explode.
pub const MAX_BESSEL_ORDER: usize = 16;

const ROOT_ITERATIONS: usize = 500;
const ROOT_TOLERANCE: f64 = 1e-13;

/// Analog or digital filter in zero/pole/gain form.
#[derive(Clone, Debug)]
struct Zpk {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
}

impl Zpk {
    fn relative_degree(&self) -> usize {
        self.poles.len() - self.zeros.len()
    }
}

/// Designs `spec` for signals sampled at `sample_rate` Hz.
pub fn design(spec: &FilterSpec, sample_rate: f64) -> DspResult<FilterCoefficients> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(DspError::invalid_param(
            "sample_rate",
            format!("must be positive, got {sample_rate}"),
        ));
    }
    let normalized = spec.normalized_cutoffs(sample_rate)?;

    let prototype = match spec.family {
        FilterFamily::Butterworth => butterworth_prototype(spec.order),
        FilterFamily::Chebyshev => chebyshev1_prototype(spec.order, spec.ripple),
        FilterFamily::Bessel => bessel_prototype(spec.order)?,
    };

    let warped: Vec<f64> = normalized
        .iter()
        .map(|w| 2.0 * DESIGN_RATE * (PI * w / DESIGN_RATE).tan())
        .collect();

    let analog = match spec.band {
        Band::LowPass { .. } => lowpass_to_lowpass(prototype, warped[0]),
        Band::HighPass { .. } => lowpass_to_highpass(prototype, warped[0]),
        Band::BandPass { .. } => {
            let center = (warped[0] * warped[1]).sqrt();
            let bandwidth = warped[1] - warped[0];
            lowpass_to_bandpass(prototype, center, bandwidth)
        }
    };

    let digital = bilinear(analog, DESIGN_RATE);
    to_transfer_function(&digital)
}

/// Poles evenly spaced on the left half of the unit circle.
fn butterworth_prototype(order: usize) -> Zpk {
    let n = order as f64;
    let poles = (0..order)
        .map(|k| {
            let m = -(n - 1.0) + 2.0 * k as f64;
            -Complex64::from_polar(1.0, PI * m / (2.0 * n))
        })
        .collect();
    Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    }
}

/// Chebyshev type I prototype with `ripple_db` of passband ripple.
fn chebyshev1_prototype(order: usize, ripple_db: f64) -> Zpk {
    let n = order as f64;
    let epsilon = (10f64.powf(0.1 * ripple_db) - 1.0).sqrt();
    let mu = (1.0 / epsilon).asinh() / n;

    let poles: Vec<Complex64> = (0..order)
        .map(|k| {
            let m = -(n - 1.0) + 2.0 * k as f64;
            let theta = PI * m / (2.0 * n);
            -Complex64::new(mu, theta).sinh()
        })
        .collect();

    let mut gain = poles
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, p| acc * -*p)
        .re;
    if order % 2 == 0 {
        gain /= (1.0 + epsilon * epsilon).sqrt();
    }
    Zpk {
        zeros: Vec::new(),
        poles,
        gain,
    }
}

/// Bessel prototype normalized so its phase response matches a
/// Butterworth of the same order at high frequency.
///
/// Poles are the roots of the reverse Bessel polynomial
/// `θ_n(s) = Σ a_k s^k`, `a_k = (2n-k)! / (2^(n-k) k! (n-k)!)`, rescaled by
/// `a_0^(-1/n)`. The rescaling is folded into the polynomial before root
/// finding so the solver works on roots of unit-order magnitude.
fn bessel_prototype(order: usize) -> DspResult<Zpk> {
    if order > MAX_BESSEL_ORDER {
        return Err(DspError::invalid_param(
            "order",
            format!("bessel designs support orders up to {MAX_BESSEL_ORDER}, got {order}"),
        ));
    }

    // ascending coefficients a_0..a_n, a_n = 1
    let mut coefficients = vec![0.0; order + 1];
    coefficients[order] = 1.0;
    for k in (0..order).rev() {
        let (n, kf) = (order as f64, k as f64);
        coefficients[k] = coefficients[k + 1] * (2.0 * n - kf) * (kf + 1.0) / (2.0 * (n - kf));
    }

    let a0 = coefficients[0];
    let scale = a0.powf(1.0 / order as f64);
    // p(u) = θ_n(scale·u) / a0 is monic with unit constant term
    let scaled: Vec<f64> = coefficients
        .iter()
        .enumerate()
        .map(|(k, c)| c * scale.powi(k as i32) / a0)
        .collect();

    let poles = polynomial_roots(&scaled)?;
    Ok(Zpk {
        zeros: Vec::new(),
        poles,
        gain: 1.0,
    })
}

/// Roots of the monic polynomial with ascending `coefficients` using the
/// Durand-Kerner iteration.
fn polynomial_roots(coefficients: &[f64]) -> DspResult<Vec<Complex64>> {
    let degree = coefficients.len() - 1;
    let evaluate = |z: Complex64| {
        coefficients
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * z + c)
    };

    let seed = Complex64::new(0.4, 0.9);
    let mut roots: Vec<Complex64> = (0..degree).map(|i| seed.powu(i as u32)).collect();

    for _ in 0..ROOT_ITERATIONS {
        let mut largest_step: f64 = 0.0;
        for i in 0..degree {
            let denominator = (0..degree)
                .filter(|&j| j != i)
                .fold(Complex64::new(1.0, 0.0), |acc, j| acc * (roots[i] - roots[j]));
            let step = evaluate(roots[i]) / denominator;
            roots[i] -= step;
            largest_step = largest_step.max(step.norm());
        }
        if largest_step < ROOT_TOLERANCE {
            return Ok(roots);
        }
    }

    if roots.iter().all(|r| r.is_finite() && evaluate(*r).norm() < 1e-8) {
        Ok(roots)
    } else {
        Err(DspError::invalid_param(
            "order",
            format!("bessel prototype of order {degree} did not converge"),
        ))
    }
}

fn lowpass_to_lowpass(prototype: Zpk, cutoff: f64) -> Zpk {
    let degree = prototype.relative_degree();
    Zpk {
        zeros: prototype.zeros.iter().map(|z| *z * cutoff).collect(),
        poles: prototype.poles.iter().map(|p| *p * cutoff).collect(),
        gain: prototype.gain * cutoff.powi(degree as i32),
    }
}

fn lowpass_to_highpass(prototype: Zpk, cutoff: f64) -> Zpk {
    let degree = prototype.relative_degree();
    let product = |roots: &[Complex64]| {
        roots
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, r| acc * -*r)
    };
    let gain = prototype.gain * (product(&prototype.zeros) / product(&prototype.poles)).re;

    let mut zeros: Vec<Complex64> = prototype
        .zeros
        .iter()
        .map(|z| Complex64::new(cutoff, 0.0) / *z)
        .collect();
    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));
    let poles = prototype
        .poles
        .iter()
        .map(|p| Complex64::new(cutoff, 0.0) / *p)
        .collect();

    Zpk { zeros, poles, gain }
}

fn lowpass_to_bandpass(prototype: Zpk, center: f64, bandwidth: f64) -> Zpk {
    let degree = prototype.relative_degree();
    let split = |roots: &[Complex64]| {
        let scaled: Vec<Complex64> = roots.iter().map(|r| *r * (bandwidth / 2.0)).collect();
        let offset = |r: &Complex64| (*r * *r - center * center).sqrt();
        let mut out: Vec<Complex64> = scaled.iter().map(|r| *r + offset(r)).collect();
        out.extend(scaled.iter().map(|r| *r - offset(r)));
        out
    };

    let mut zeros = split(&prototype.zeros);
    zeros.extend(std::iter::repeat_n(Complex64::new(0.0, 0.0), degree));
    let poles = split(&prototype.poles);

    Zpk {
        zeros,
        poles,
        gain: prototype.gain * bandwidth.powi(degree as i32),
    }
}

/// Maps an analog zpk to the z-plane, `s = 2·fs·(z - 1) / (z + 1)`.
fn bilinear(analog: Zpk, sample_rate: f64) -> Zpk {
    let degree = analog.relative_degree();
    let fs2 = Complex64::new(2.0 * sample_rate, 0.0);

    let map = |r: &Complex64| (fs2 + *r) / (fs2 - *r);
    let mut zeros: Vec<Complex64> = analog.zeros.iter().map(map).collect();
    zeros.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), degree));
    let poles = analog.poles.iter().map(map).collect();

    let distance = |roots: &[Complex64]| {
        roots
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, r| acc * (fs2 - *r))
    };
    let gain = analog.gain * (distance(&analog.zeros) / distance(&analog.poles)).re;

    Zpk { zeros, poles, gain }
}

/// Expands roots into polynomial coefficients, highest power first.
fn poly(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coefficients = vec![Complex64::new(1.0, 0.0)];
    for root in roots {
        let mut next = coefficients.clone();
        next.push(Complex64::new(0.0, 0.0));
        for (i, c) in coefficients.iter().enumerate() {
            next[i + 1] -= *root * *c;
        }
        coefficients = next;
    }
    coefficients
}

fn to_transfer_function(digital: &Zpk) -> DspResult<FilterCoefficients> {
    let b = poly(&digital.zeros)
        .into_iter()
        .map(|c| c.re * digital.gain)
        .collect();
    let a = poly(&digital.poles).into_iter().map(|c| c.re).collect();
    FilterCoefficients::new(b, a)
}
