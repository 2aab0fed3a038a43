use modlab_rs::config::Configuration;
use modlab_rs::modulation::{self, AmVariant, ModulationKind};
use modlab_rs::signal::{SampledSignal, generate_tone, resample};
use modlab_rs::spectrum::dominant_frequency;
use rand::Rng;

fn lab_config(kind: ModulationKind, percentage: f64) -> Configuration {
    let mut config = Configuration::new(kind, percentage, 2000.0);
    config.oversampling = 8;
    config
}

fn settled(signal: &SampledSignal, skip: usize) -> SampledSignal {
    SampledSignal::new(signal.rate(), signal.samples()[skip..].to_vec()).unwrap()
}

#[test]
fn am_round_trip_recovers_message_frequency() {
    let message = generate_tone(100.0, 8000.0, 1.0, 0.8).unwrap();
    let config = lab_config(ModulationKind::Am, 50.0);

    let modulated = modulation::modulate(&message, &config).unwrap();
    assert_eq!(modulated.grid().rate, 16_000.0);
    assert_eq!(modulated.signal.len(), 16_000);

    let on_grid = modulation::demodulate(&modulated.signal, &config).unwrap();
    let recovered = resample(&on_grid, &message.time_grid()).unwrap();
    assert_eq!(recovered.len(), message.len());

    let tail = settled(&recovered, 800);
    let peak = dominant_frequency(&tail).unwrap();
    assert!((peak - 100.0).abs() < 1.0, "dominant at {peak}");
    assert!((tail.peak() - 0.8).abs() < 0.05, "peak {}", tail.peak());
}

#[test]
fn suppressed_carrier_round_trip() {
    let message = generate_tone(250.0, 8000.0, 0.5, 1.0).unwrap();
    let mut config = lab_config(ModulationKind::Am, 80.0);
    config.am_variant = AmVariant::SuppressedCarrier;

    let modulated = modulation::modulate(&message, &config).unwrap();
    assert!(modulated.signal.peak() <= 0.8 + 1e-12);

    let on_grid = modulation::demodulate(&modulated.signal, &config).unwrap();
    let peak = dominant_frequency(&settled(&on_grid, 1600)).unwrap();
    assert!((peak - 250.0).abs() < 2.0, "dominant at {peak}");
}

#[test]
fn am_survives_additive_noise() {
    let message = generate_tone(100.0, 8000.0, 1.0, 1.0).unwrap();
    let config = lab_config(ModulationKind::Am, 50.0);
    let modulated = modulation::modulate(&message, &config).unwrap();

    let mut rng = rand::rng();
    let noisy: Vec<f64> = modulated
        .signal
        .samples()
        .iter()
        .map(|s| s + rng.random_range(-0.05..0.05))
        .collect();
    let noisy = SampledSignal::new(modulated.signal.rate(), noisy).unwrap();

    let on_grid = modulation::demodulate(&noisy, &config).unwrap();
    let peak = dominant_frequency(&settled(&on_grid, 1600)).unwrap();
    assert!((peak - 100.0).abs() < 1.0, "dominant at {peak}");
}

#[test]
fn fm_round_trip_recovers_message_frequency() {
    let message = generate_tone(150.0, 8000.0, 1.0, 1.0).unwrap();
    // k = 500 rad/s, about 80 Hz peak deviation
    let config = lab_config(ModulationKind::Fm, 50_000.0);

    let modulated = modulation::modulate(&message, &config).unwrap();
    assert!(modulated.signal.peak() <= 1.0);

    let on_grid = modulation::demodulate(&modulated.signal, &config).unwrap();
    let recovered = resample(&on_grid, &message.time_grid()).unwrap();
    let tail = settled(&recovered, 800);
    let peak = dominant_frequency(&tail).unwrap();
    assert!((peak - 150.0).abs() < 1.0, "dominant at {peak}");
    assert!((tail.peak() - 1.0).abs() < 0.05, "peak {}", tail.peak());
}

#[test]
fn lab_presets_modulate_onto_a_120_khz_grid() {
    let message = generate_tone(440.0, 8000.0, 0.05, 0.5).unwrap();
    for config in [Configuration::am_lab(), Configuration::fm_lab()] {
        let modulated = modulation::modulate(&message, &config).unwrap();
        assert_eq!(modulated.grid().rate, 120_000.0);
        assert_eq!(modulated.signal.len(), 6000);
        assert_eq!(modulated.carrier.len(), 6000);
    }
}
