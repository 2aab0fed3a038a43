use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DspResult;
use crate::signal::SampledSignal;
use crate::spectrum::dominant_frequency;

/// Headline numbers of a signal, as printed by `analyze_signal` and stored
/// in pipeline reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub sample_rate: f64,
    pub samples: usize,
    pub duration: f64,
    pub peak: f64,
    pub mean: f64,
    pub rms: f64,
    pub dominant_frequency: Option<f64>,
}

impl SignalSummary {
    pub fn of(signal: &SampledSignal) -> Self {
        let rms = (signal.samples().iter().map(|s| s * s).sum::<f64>() / signal.len() as f64).sqrt();
        Self {
            sample_rate: signal.rate(),
            samples: signal.len(),
            duration: signal.duration(),
            peak: signal.peak(),
            mean: signal.mean(),
            rms,
            dominant_frequency: dominant_frequency(signal),
        }
    }
}

/// Pretty-prints `value` as JSON into `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> DspResult<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_square_wave() {
        let signal = SampledSignal::new(4.0, vec![1.0, -1.0, 1.0, -1.0]).unwrap();
        let summary = SignalSummary::of(&signal);
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.duration, 1.0);
        assert_eq!(summary.peak, 1.0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.rms, 1.0);
        // N = 4 leaves only bin 1 between DC and Nyquist
        assert_eq!(summary.dominant_frequency, Some(1.0));
    }
}
