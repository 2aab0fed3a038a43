use std::path::PathBuf;

use clap::Parser;
use modlab_rs::audio;
use modlab_rs::spectrum::Spectrum;
use modlab_rs::utils::dump::SignalSummary;
use modlab_rs::utils::logging::init_logging;

/// Prints basic statistics and the strongest spectral lines of a WAV file.
#[derive(Parser)]
struct Cli {
    input: PathBuf,
    /// Number of spectral peaks to list
    #[arg(short, long, default_value_t = 5)]
    peaks: usize,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let signal = audio::load(&cli.input)?;
    let summary = SignalSummary::of(&signal);
    println!("File: {}", cli.input.display());
    println!("Sample rate: {:.1} Hz", summary.sample_rate);
    println!("Samples: {} ({:.3} s)", summary.samples, summary.duration);
    println!(
        "Peak: {:.4}, mean: {:.4}, rms: {:.4}",
        summary.peak, summary.mean, summary.rms
    );
    match summary.dominant_frequency {
        Some(freq) => println!("Dominant frequency: {:.2} Hz", freq),
        None => println!("Dominant frequency: n/a"),
    }

    let magnitudes = Spectrum::of(&signal).positive();
    let mut bins: Vec<usize> = (1..magnitudes.magnitudes.len()).collect();
    bins.sort_by(|&a, &b| magnitudes.magnitudes[b].total_cmp(&magnitudes.magnitudes[a]));
    println!("\nStrongest bins:");
    for &bin in bins.iter().take(cli.peaks) {
        println!(
            "  {:>10.2} Hz  |X| = {:.3}",
            magnitudes.frequencies[bin], magnitudes.magnitudes[bin]
        );
    }
    Ok(())
}
