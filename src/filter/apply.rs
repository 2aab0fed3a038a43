use super::FilterCoefficients;
use crate::error::{DspError, DspResult};

/// Runs the IIR difference equation
/// `a[0]·y[n] = Σ b[k]·x[n-k] - Σ_{k≥1} a[k]·y[n-k]` over `input`.
///
/// Transposed direct form II with zero initial state. The output has the
/// same length as the input.
pub fn lfilter(coefficients: &FilterCoefficients, input: &[f64]) -> DspResult<Vec<f64>> {
    let a0 = match coefficients.a.first() {
        Some(&a0) if a0 != 0.0 => a0,
        _ => {
            return Err(DspError::invalid_param(
                "a",
                "leading denominator coefficient must be non-zero",
            ));
        }
    };
    if coefficients.b.is_empty() {
        return Err(DspError::invalid_param("b", "numerator is empty"));
    }

    let taps = coefficients.b.len().max(coefficients.a.len());
    let mut b = vec![0.0; taps];
    let mut a = vec![0.0; taps];
    for (dst, src) in b.iter_mut().zip(&coefficients.b) {
        *dst = src / a0;
    }
    for (dst, src) in a.iter_mut().zip(&coefficients.a) {
        *dst = src / a0;
    }

    let mut state = vec![0.0; taps - 1];
    let output = input
        .iter()
        .map(|&x| {
            let y = b[0] * x + state.first().copied().unwrap_or(0.0);
            for k in 1..taps {
                let carried = if k < taps - 1 { state[k] } else { 0.0 };
                state[k - 1] = b[k] * x - a[k] * y + carried;
            }
            y
        })
        .collect();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_input_stays_zero() {
        let coefficients =
            FilterCoefficients::new(vec![0.2, 0.4, 0.2], vec![1.0, -0.9, 0.5]).unwrap();
        let out = lfilter(&coefficients, &[0.0; 64]).unwrap();
        assert!(out.iter().all(|&y| y == 0.0));
    }

    #[test]
    fn impulse_response_of_one_pole_section() {
        // y[n] = x[n] + 0.5 y[n-1]
        let coefficients = FilterCoefficients::new(vec![1.0], vec![1.0, -0.5]).unwrap();
        let mut impulse = vec![0.0; 5];
        impulse[0] = 1.0;
        let out = lfilter(&coefficients, &impulse).unwrap();
        assert_eq!(out, vec![1.0, 0.5, 0.25, 0.125, 0.0625]);
    }

    #[test]
    fn fir_filter_is_a_convolution() {
        let coefficients = FilterCoefficients::new(vec![1.0, 2.0, 3.0], vec![1.0]).unwrap();
        let out = lfilter(&coefficients, &[1.0, 0.0, 0.0, 1.0]).unwrap();
        assert_eq!(out, vec![1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn denominator_is_normalized() {
        let scaled = FilterCoefficients::new(vec![2.0], vec![2.0, -1.0]).unwrap();
        let unit = FilterCoefficients::new(vec![1.0], vec![1.0, -0.5]).unwrap();
        let input = [1.0, -1.0, 0.5, 3.0];
        assert_eq!(
            lfilter(&scaled, &input).unwrap(),
            lfilter(&unit, &input).unwrap()
        );
    }

    #[test]
    fn gain_only_filter() {
        let coefficients = FilterCoefficients::new(vec![3.0], vec![1.0]).unwrap();
        assert_eq!(lfilter(&coefficients, &[1.0, -2.0]).unwrap(), vec![3.0, -6.0]);
    }

    #[test]
    fn rejects_zero_leading_denominator() {
        let coefficients = FilterCoefficients {
            b: vec![1.0],
            a: vec![0.0, 1.0],
        };
        assert!(lfilter(&coefficients, &[1.0]).is_err());
    }
}
