use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DspError, DspResult};
use crate::modulation::{AmVariant, DemodFilter, ModulationKind, ModulationParams};
use crate::utils::consts::{
    DEFAULT_OUTPUT_DIR, DEFAULT_OVERSAMPLING, LAB_AM_PERCENTAGE, LAB_CARRIER_FREQUENCY,
    LAB_FM_PERCENTAGE,
};

/// Everything a modulate/demodulate run needs. Missing JSON keys fall back
/// to the AM lab preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub modulation: ModulationKind,
    pub am_variant: AmVariant,
    pub percentage: f64,            // modulation percentage, index = percentage / 100
    pub carrier_frequency: f64,     // [Hz]
    pub oversampling: usize,        // carrier-grid samples per carrier period
    pub demod_filter: DemodFilter,
    pub output_dir: PathBuf,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::am_lab()
    }
}

impl Configuration {
    pub fn new(modulation: ModulationKind, percentage: f64, carrier_frequency: f64) -> Self {
        Self {
            modulation,
            am_variant: AmVariant::Full,
            percentage,
            carrier_frequency,
            oversampling: DEFAULT_OVERSAMPLING,
            demod_filter: DemodFilter::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Full-carrier AM, 15 % on a 30 kHz carrier.
    pub fn am_lab() -> Self {
        Self::new(ModulationKind::Am, LAB_AM_PERCENTAGE, LAB_CARRIER_FREQUENCY)
    }

    /// FM, 100 % on a 30 kHz carrier.
    pub fn fm_lab() -> Self {
        Self::new(ModulationKind::Fm, LAB_FM_PERCENTAGE, LAB_CARRIER_FREQUENCY)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> DspResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DspError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.params()?;
        config.demod_filter.spec(config.carrier_frequency)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Validated modulation parameters.
    pub fn params(&self) -> DspResult<ModulationParams> {
        ModulationParams::new(self.percentage, self.carrier_frequency, self.oversampling)
    }

    pub fn grid_rate(&self) -> f64 {
        self.oversampling as f64 * self.carrier_frequency
    }
}
