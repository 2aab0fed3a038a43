//! End-to-end lab run: a WAV file goes through a modulator and back out of
//! the matching demodulator, and both waveforms land on disk next to a JSON
//! report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::audio;
use crate::config::Configuration;
use crate::error::DspResult;
use crate::modulation::{self, ModulationKind};
use crate::signal::resample;
use crate::utils::dump::{SignalSummary, write_json};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Load,
    Modulate,
    Demodulate,
    Resample,
    Save,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Load,
        Stage::Modulate,
        Stage::Demodulate,
        Stage::Resample,
        Stage::Save,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Load => "loading audio",
            Stage::Modulate => "modulating",
            Stage::Demodulate => "demodulating",
            Stage::Resample => "resampling to audio rate",
            Stage::Save => "writing results",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineReport {
    pub modulation: ModulationKind,
    pub percentage: f64,
    pub carrier_frequency: f64,
    /// Sample rate of the carrier grid.
    pub grid_rate: f64,
    pub input: PathBuf,
    pub modulated_path: PathBuf,
    pub recovered_path: PathBuf,
    pub report_path: PathBuf,
    pub message: SignalSummary,
    pub modulated: SignalSummary,
    pub recovered: SignalSummary,
}

/// Runs the whole chain once with `config`.
pub fn run(config: &Configuration, input: impl AsRef<Path>) -> DspResult<PipelineReport> {
    run_with_progress(config, input, |_| {})
}

/// Same as [`run`], calling `on_stage` as each stage starts.
pub fn run_with_progress(
    config: &Configuration,
    input: impl AsRef<Path>,
    mut on_stage: impl FnMut(Stage),
) -> DspResult<PipelineReport> {
    let input = input.as_ref();
    let params = config.params()?;

    on_stage(Stage::Load);
    let message = audio::load(input)?;
    if message.rate() / 2.0 > params.carrier_frequency / 2.0 {
        tracing::warn!(
            audio_nyquist = message.rate() / 2.0,
            cutoff = params.carrier_frequency / 2.0,
            "message content above half the carrier frequency will not survive demodulation"
        );
    }

    on_stage(Stage::Modulate);
    let modulated = modulation::modulate(&message, config)?;

    on_stage(Stage::Demodulate);
    let on_grid = modulation::demodulate(&modulated.signal, config)?;

    on_stage(Stage::Resample);
    let recovered = resample(&on_grid, &message.time_grid())?;

    on_stage(Stage::Save);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "signal".to_string());
    let tag = config.modulation.to_string().to_lowercase();
    let dir = &config.output_dir;
    let modulated_path = audio::save(dir.join(format!("{stem}_{tag}_modulated")), &modulated.signal)?;
    let recovered_path = audio::save(dir.join(format!("{stem}_{tag}_recovered")), &recovered)?;

    let report = PipelineReport {
        modulation: config.modulation,
        percentage: params.percentage,
        carrier_frequency: params.carrier_frequency,
        grid_rate: modulated.grid().rate,
        input: input.to_path_buf(),
        modulated_path,
        recovered_path,
        report_path: dir.join(format!("{stem}_{tag}_report.json")),
        message: SignalSummary::of(&message),
        modulated: SignalSummary::of(&modulated.signal),
        recovered: SignalSummary::of(&recovered),
    };
    write_json(&report.report_path, &report)?;

    tracing::info!(
        kind = %config.modulation,
        message_hz = ?report.message.dominant_frequency,
        recovered_hz = ?report.recovered.dominant_frequency,
        report = %report.report_path.display(),
        "pipeline finished"
    );
    Ok(report)
}
