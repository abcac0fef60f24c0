mod common;

use std::f32::consts::PI;

use common::{gen_sine, max_abs_diff, run_engine};
use proptest::prelude::*;
use rustfft::num_complex::Complex;
use specmorph::morph::wrap_phase;
use specmorph::{EngineConfig, MagnitudeStrategy, MorphSettings, PhaseStrategy, SpectralMorpher};

fn in_phase_range(p: f32) -> bool {
    (-PI..=PI).contains(&p)
}

proptest! {
    #[test]
    fn prop_wrap_phase_stays_in_range(x in -100.0f32..100.0) {
        let w = wrap_phase(x);
        prop_assert!(in_phase_range(w), "wrap({}) = {}", x, w);
        // Same angle.
        prop_assert!((w.sin() - x.sin()).abs() < 1e-3);
        prop_assert!((w.cos() - x.cos()).abs() < 1e-3);
    }

    #[test]
    fn prop_phase_strategies_stay_in_range(
        m in 0.0f32..=1.0,
        strategy in 0i64..6,
        ref main in proptest::collection::vec(-PI..=PI, 1..64),
        ref aux_seed in proptest::collection::vec(-PI..=PI, 64),
    ) {
        let strategy = PhaseStrategy::from_index(strategy);
        let aux = &aux_seed[..main.len()];
        let mut out = vec![0.0f32; main.len()];
        strategy.apply(m, main, aux, &mut out);
        for (i, &p) in out.iter().enumerate() {
            prop_assert!(in_phase_range(p), "{} bin {}: {}", strategy, i, p);
        }
    }

    #[test]
    fn prop_magnitude_strategies_are_non_negative(
        m in 0.0f32..=1.0,
        strategy in 0i64..6,
        ref main in proptest::collection::vec(0.0f32..50.0, 1..64),
        ref aux_seed in proptest::collection::vec(0.0f32..50.0, 64),
    ) {
        let strategy = MagnitudeStrategy::from_index(strategy);
        let aux = &aux_seed[..main.len()];
        let mut out = vec![0.0f32; main.len()];
        strategy.apply(m, main, aux, &mut out);
        for (i, &v) in out.iter().enumerate() {
            prop_assert!(v.is_finite() && v >= 0.0, "{} bin {}: {}", strategy, i, v);
        }
    }

    #[test]
    fn prop_morphed_spectrum_is_well_formed(
        m in 0.0f32..=1.0,
        mag in 0i64..6,
        phase in 0i64..6,
        invert in any::<bool>(),
        ref parts in proptest::collection::vec((-10.0f32..10.0, -10.0f32..10.0), 34),
    ) {
        let (main_parts, aux_parts) = parts.split_at(17);
        let main: Vec<Complex<f32>> = main_parts.iter().map(|&(re, im)| Complex::new(re, im)).collect();
        let aux: Vec<Complex<f32>> = aux_parts.iter().map(|&(re, im)| Complex::new(re, im)).collect();
        let settings = MorphSettings::default()
            .with_morph_factor(m)
            .with_magnitude(MagnitudeStrategy::from_index(mag))
            .with_phase(PhaseStrategy::from_index(phase))
            .with_invert_phase(invert);

        let mut morpher = SpectralMorpher::new(17);
        let mut out = vec![Complex::new(0.0f32, 0.0); 17];
        morpher.morph(&main, &aux, &settings, &mut out);

        for (i, c) in out.iter().enumerate() {
            prop_assert!(c.re.is_finite() && c.im.is_finite(), "bin {}: {}", i, c);
        }
        for &v in morpher.last_magnitudes() {
            prop_assert!(v >= 0.0);
        }
        for &p in morpher.last_phases() {
            prop_assert!(in_phase_range(p));
        }
    }
}

#[test]
fn zero_morph_factor_selects_aux() {
    let n = 512;
    let main = gen_sine(440.0, 44100, 4096, |_| 0.7);
    let aux = gen_sine(1250.0, 44100, 4096, |_| 0.5);
    let config = EngineConfig::default().with_frame_size(n);

    for phase in [PhaseStrategy::Add, PhaseStrategy::SmoothStep] {
        let settings = MorphSettings::default()
            .with_morph_factor(0.0)
            .with_magnitude(MagnitudeStrategy::Add)
            .with_phase(phase);
        let out = run_engine(config, &main, &aux, &settings);
        let diff = max_abs_diff(&out[n..], &aux[..aux.len() - n]);
        assert!(diff < 1e-4, "{}: m = 0 deviates from aux by {}", phase, diff);
    }
}

#[test]
fn out_of_range_indices_fall_back_to_passthrough() {
    for index in [-1i64, 6, 42, i64::MIN, i64::MAX] {
        assert_eq!(MagnitudeStrategy::from_index(index), MagnitudeStrategy::AllPass);
        assert_eq!(PhaseStrategy::from_index(index), PhaseStrategy::PreserveMainIn);
    }

    let main = gen_sine(330.0, 44100, 3000, |_| 0.8);
    let aux = gen_sine(90.0, 44100, 3000, |_| 0.8);
    let config = EngineConfig::default().with_frame_size(256);
    let settings = MorphSettings::default()
        .with_magnitude(MagnitudeStrategy::from_index(99))
        .with_phase(PhaseStrategy::from_index(-7));
    let out = run_engine(config, &main, &aux, &settings);
    let diff = max_abs_diff(&out[256..], &main[..main.len() - 256]);
    assert!(diff < 1e-4, "fallback strategies altered main by {}", diff);
}

#[test]
fn in_range_indices_follow_table_order() {
    for (i, &m) in MagnitudeStrategy::ALL.iter().enumerate() {
        assert_eq!(MagnitudeStrategy::from_index(i as i64), m);
    }
    for (i, &p) in PhaseStrategy::ALL.iter().enumerate() {
        assert_eq!(PhaseStrategy::from_index(i as i64), p);
    }
}

#[test]
fn every_strategy_pair_produces_finite_output() {
    let main = gen_sine(440.0, 44100, 2048, |_| 1.0);
    let aux: Vec<f32> = vec![0.0; 2048];
    let config = EngineConfig::default().with_frame_size(256);
    for mag in MagnitudeStrategy::ALL {
        for phase in PhaseStrategy::ALL {
            for m in [0.0, 0.5, 1.0] {
                let settings = MorphSettings::default()
                    .with_magnitude(mag)
                    .with_phase(phase)
                    .with_morph_factor(m)
                    .with_invert_phase(true);
                let out = run_engine(config, &main, &aux, &settings);
                assert!(
                    out.iter().all(|x| x.is_finite()),
                    "{}/{} at m={} produced non-finite output against silent aux",
                    mag,
                    phase,
                    m
                );
            }
        }
    }
}
