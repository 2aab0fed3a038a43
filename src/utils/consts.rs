/// Log level used when `RUST_LOG` is unset
pub const LOG_LEVEL: &str = "info";

/// Carrier-grid samples per carrier period
pub const DEFAULT_OVERSAMPLING: usize = 4;

/// Order of filters built from the command line
pub const DEFAULT_FILTER_ORDER: usize = 3;

/// Order of the low-pass behind the coherent demodulators
pub const DEMOD_FILTER_ORDER: usize = 5;

/// Chebyshev passband ripple (dB)
pub const DEFAULT_CHEBYSHEV_RIPPLE_DB: f64 = 1.0;

/// Spectrogram segment length (samples)
pub const DEFAULT_SEGMENT_LEN: usize = 1024;

/// Points sampled when reporting a filter's frequency response
pub const RESPONSE_POINTS: usize = 8000;

pub const DEFAULT_OUTPUT_DIR: &str = "output";

// ============================================================================
// Lab presets
// ============================================================================

/// Carrier used by both lab runs (Hz)
pub const LAB_CARRIER_FREQUENCY: f64 = 30_000.0;

pub const LAB_AM_PERCENTAGE: f64 = 15.0;

pub const LAB_FM_PERCENTAGE: f64 = 100.0;
