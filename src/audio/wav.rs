use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DspError, DspResult};
use crate::signal::SampledSignal;

const WAV_EXTENSION: &str = "wav";

fn wav_error(path: &Path, err: hound::Error) -> DspError {
    match err {
        hound::Error::IoError(io) => DspError::Io(io),
        other => DspError::UnsupportedFormat {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

/// Reads a WAV file into a mono signal.
///
/// Integer PCM is scaled by `2^(bits-1)` into `[-1, 1)`, float PCM is kept
/// as stored. Multi-channel frames are averaged down to one channel.
pub fn load(path: impl AsRef<Path>) -> DspResult<SampledSignal> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DspError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let reader = hound::WavReader::open(path).map_err(|err| DspError::UnsupportedFormat {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let spec = reader.spec();

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|sample| sample.map(f64::from))
            .collect::<Result<_, _>>()
            .map_err(|err| wav_error(path, err))?,
        hound::SampleFormat::Int => {
            let amplitude = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|value| f64::from(value) / amplitude))
                .collect::<Result<_, _>>()
                .map_err(|err| wav_error(path, err))?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<f64> = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f64>() / channels as f64)
            .collect()
    };
    if samples.is_empty() {
        return Err(DspError::UnsupportedFormat {
            path: path.to_path_buf(),
            message: "file holds no audio frames".to_string(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels,
        bits = spec.bits_per_sample,
        frames = samples.len(),
        "loaded wav"
    );
    SampledSignal::new(f64::from(spec.sample_rate), samples)
}

/// Writes `signal` as mono 16-bit PCM and returns the path actually used.
///
/// `.wav` is appended when the path has no such extension and the parent
/// directory is created. A signal whose peak exceeds 1 is scaled down to
/// peak 1; anything left outside `[-1, 1]` is clipped.
pub fn save(path: impl AsRef<Path>, signal: &SampledSignal) -> DspResult<PathBuf> {
    let path = with_wav_extension(path.as_ref());
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let rate = signal.rate().round();
    if rate < 1.0 || rate > f64::from(u32::MAX) {
        return Err(DspError::invalid_param(
            "sample_rate",
            format!("{} Hz cannot be stored in a WAV header", signal.rate()),
        ));
    }
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate as u32,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let peak = signal.peak();
    let gain = if peak > 1.0 { 1.0 / peak } else { 1.0 };
    if gain < 1.0 {
        tracing::debug!(peak, path = %path.display(), "normalizing before write");
    }

    let mut writer = hound::WavWriter::create(&path, spec).map_err(|err| wav_error(&path, err))?;
    let amplitude = f64::from(i16::MAX);
    for &sample in signal.samples() {
        let scaled = (sample * gain).clamp(-1.0, 1.0) * amplitude;
        writer
            .write_sample(scaled.round() as i16)
            .map_err(|err| wav_error(&path, err))?;
    }
    writer.finalize().map_err(|err| wav_error(&path, err))?;

    tracing::info!(path = %path.display(), sample_rate = spec.sample_rate, samples = signal.len(), "wrote wav");
    Ok(path)
}

fn with_wav_extension(path: &Path) -> PathBuf {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WAV_EXTENSION));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(WAV_EXTENSION);
        PathBuf::from(name)
    }
}
