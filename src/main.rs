use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use modlab_rs::audio;
use modlab_rs::config::Configuration;
use modlab_rs::filter::{
    Band, BandType, FilterFamily, FilterSpec, design, filter_signal, frequency_response,
};
use modlab_rs::modulation::{self, AmVariant, ModulationKind};
use modlab_rs::pipeline::{self, Stage};
use modlab_rs::signal::{TimeGrid, resample};
use modlab_rs::spectrum::{Scaling, Spectrogram, spectrogram};
use modlab_rs::ui::print_banner;
use modlab_rs::ui::progress::{ProgressManager, templates};
use modlab_rs::utils::consts::{
    DEFAULT_CHEBYSHEV_RIPPLE_DB, DEFAULT_FILTER_ORDER, DEFAULT_SEGMENT_LEN, RESPONSE_POINTS,
};
use modlab_rs::utils::dump::{SignalSummary, write_json};
use modlab_rs::utils::logging::init_logging;

#[derive(Parser)]
#[command(author, version, about = "AM/FM modulation lab for WAV audio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct ModulationArgs {
    /// JSON configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// am | fm
    #[arg(short, long)]
    kind: Option<ModulationKind>,
    #[arg(short, long)]
    percentage: Option<f64>,
    /// Carrier frequency in Hz
    #[arg(long)]
    carrier: Option<f64>,
    #[arg(long)]
    oversampling: Option<usize>,
    /// AM only: drop the carrier term (DSB-SC)
    #[arg(long, default_value_t = false)]
    suppressed_carrier: bool,
}

impl ModulationArgs {
    fn resolve(&self) -> anyhow::Result<Configuration> {
        let mut config = match &self.config {
            Some(path) => Configuration::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Configuration::default(),
        };
        if let Some(kind) = self.kind {
            config.modulation = kind;
        }
        if let Some(percentage) = self.percentage {
            config.percentage = percentage;
        }
        if let Some(carrier) = self.carrier {
            config.carrier_frequency = carrier;
        }
        if let Some(oversampling) = self.oversampling {
            config.oversampling = oversampling;
        }
        if self.suppressed_carrier {
            config.am_variant = AmVariant::SuppressedCarrier;
        }
        config.params()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Modulate a WAV message onto the carrier grid
    Modulate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        opts: ModulationArgs,
    },
    /// Demodulate a WAV sampled on the carrier grid
    Demodulate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Sample rate of the recovered audio in Hz
        #[arg(short, long)]
        rate: f64,
        #[command(flatten)]
        opts: ModulationArgs,
    },
    /// Design an IIR filter and run it over a WAV file
    Filter {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, default_value = "butterworth")]
        family: FilterFamily,
        /// low | high | band
        #[arg(short, long, default_value = "low")]
        band: BandType,
        /// Cutoff in Hz; band-pass takes two
        #[arg(long, required = true, num_args = 1..=2)]
        cutoff: Vec<f64>,
        #[arg(long, default_value_t = DEFAULT_FILTER_ORDER)]
        order: usize,
        /// Chebyshev passband ripple in dB
        #[arg(long, default_value_t = DEFAULT_CHEBYSHEV_RIPPLE_DB)]
        ripple: f64,
        /// Also write the magnitude response as JSON
        #[arg(long)]
        response: Option<PathBuf>,
    },
    /// Print signal statistics and optionally dump a spectrogram
    Spectrum {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, default_value_t = DEFAULT_SEGMENT_LEN)]
        segment: usize,
        #[arg(long, default_value_t = false)]
        density: bool,
    },
    /// Modulate, demodulate and report in one go
    Run {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        #[command(flatten)]
        opts: ModulationArgs,
    },
}

#[derive(Serialize)]
struct SpectrumDump {
    summary: SignalSummary,
    spectrogram: Spectrogram,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Modulate {
            input,
            output,
            opts,
        } => {
            let config = opts.resolve()?;
            print_banner(&config);
            let message = audio::load(&input)?;
            let modulated = modulation::modulate(&message, &config)?;
            let path = audio::save(&output, &modulated.signal)?;
            println!("{}", path.display());
        }
        Commands::Demodulate {
            input,
            output,
            rate,
            opts,
        } => {
            let config = opts.resolve()?;
            print_banner(&config);
            let modulated = audio::load(&input)?;
            if (modulated.rate() - config.grid_rate()).abs() > 0.5 {
                tracing::warn!(
                    file_rate = modulated.rate(),
                    grid_rate = config.grid_rate(),
                    "input rate differs from the configured carrier grid"
                );
            }
            let on_grid = modulation::demodulate(&modulated, &config)?;
            let grid = TimeGrid::covering(on_grid.duration(), rate)?;
            let recovered = resample(&on_grid, &grid)?;
            let path = audio::save(&output, &recovered)?;
            println!("{}", path.display());
        }
        Commands::Filter {
            input,
            output,
            family,
            band,
            cutoff,
            order,
            ripple,
            response,
        } => {
            let spec = FilterSpec::new(family, Band::from_cutoffs(band, &cutoff)?, order, ripple)?;
            let signal = audio::load(&input)?;
            if let Some(response_path) = response {
                let coefficients = design(&spec, signal.rate())?;
                let response = frequency_response(&coefficients, signal.rate(), RESPONSE_POINTS)?;
                write_json(&response_path, &response)?;
            }
            let filtered = filter_signal(&signal, &spec)?;
            let path = audio::save(&output, &filtered)?;
            println!("{}", path.display());
        }
        Commands::Spectrum {
            input,
            output,
            segment,
            density,
        } => {
            let signal = audio::load(&input)?;
            let summary = SignalSummary::of(&signal);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(path) = output {
                let scaling = if density {
                    Scaling::Density
                } else {
                    Scaling::Spectrum
                };
                let spectrogram = spectrogram(&signal, segment, scaling)?;
                write_json(&path, &SpectrumDump { summary, spectrogram })?;
            }
        }
        Commands::Run {
            input,
            output_dir,
            opts,
        } => {
            let mut config = opts.resolve()?;
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            print_banner(&config);

            let progress = ProgressManager::new();
            progress
                .create_bar("run", Stage::ALL.len() as u64, templates::PIPELINE, "")
                .map_err(anyhow::Error::msg)?;
            let report = pipeline::run_with_progress(&config, &input, |stage| {
                let _ = progress.enter_stage("run", stage);
            });
            let report = match report {
                Ok(report) => {
                    let _ = progress.inc("run", 1);
                    let _ = progress.finish("run", "done");
                    report
                }
                Err(err) => {
                    progress.clear_all();
                    bail!("pipeline failed on {}: {err}", input.display());
                }
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
