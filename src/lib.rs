//! AM/FM modulation lab: carrier generation, resampling, coherent
//! demodulation, IIR filter design and spectral diagnostics over WAV audio.

pub mod audio;
pub mod config;
pub mod error;
pub mod filter;
pub mod modulation;
pub mod pipeline;
pub mod signal;
pub mod spectrum;
pub mod ui;
pub mod utils;

pub use config::Configuration;
pub use error::{DspError, DspResult};
pub use signal::{SampledSignal, TimeGrid};
