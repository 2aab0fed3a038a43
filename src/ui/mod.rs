pub mod progress;

use crate::config::Configuration;

pub fn print_banner(config: &Configuration) {
    eprintln!(
        "modlab: {} {:.0}% on {:.1} kHz carrier (grid {:.1} kHz)",
        config.modulation,
        config.percentage,
        config.carrier_frequency / 1e3,
        config.grid_rate() / 1e3
    );
}
