mod common;

use common::{gen_impulse, gen_sine, run_engine};
use specmorph::{
    EngineConfig, MagnitudeStrategy, MorphError, MorphSettings, PhaseStrategy, WindowType,
};

#[test]
fn first_hop_of_output_is_silent_for_every_strategy() {
    let config = EngineConfig::default().with_frame_size(256);
    let hop = config.hop_size();
    let main = gen_sine(440.0, 44100, 600, |_| 0.9);
    let aux = gen_sine(1300.0, 44100, 600, |_| 0.7);

    for mag in MagnitudeStrategy::ALL {
        for phase in PhaseStrategy::ALL {
            let settings = MorphSettings::default()
                .with_magnitude(mag)
                .with_phase(phase)
                .with_morph_factor(0.4);
            let out = run_engine(config, &main, &aux, &settings);
            assert!(
                out[..hop].iter().all(|&x| x == 0.0),
                "{}/{} produced output before the first frame completed",
                mag,
                phase
            );
        }
    }
}

#[test]
fn passthrough_first_frame_is_silent() {
    let config = EngineConfig::default().with_frame_size(256);
    let main = gen_sine(440.0, 44100, 600, |_| 0.9);
    let aux = gen_sine(1300.0, 44100, 600, |_| 0.7);
    for settings in [
        MorphSettings::passthrough(),
        MorphSettings::default().with_bypass(true),
    ] {
        let out = run_engine(config, &main, &aux, &settings);
        let peak = out[..256].iter().fold(0.0f32, |m, x| m.max(x.abs()));
        assert!(peak < 1e-5, "{:?}: peak {} before latency elapsed", settings, peak);
    }
}

#[test]
fn impulse_reappears_after_exactly_one_frame() {
    let n = 1024;
    let input = gen_impulse(0, 4 * n, 1.0);
    let out = run_engine(
        EngineConfig::default(),
        &input,
        &[],
        &MorphSettings::passthrough(),
    );

    assert!(
        (out[n] - 1.0).abs() < 1e-3,
        "expected unit impulse at {}, got {}",
        n,
        out[n]
    );
    for (t, &x) in out.iter().enumerate() {
        if t != n {
            assert!(x.abs() < 1e-3, "unexpected energy {} at t={}", x, t);
        }
    }
}

#[test]
fn bypass_impulse_is_exact_delay() {
    let n = 1024;
    let input = gen_impulse(100, 3 * n, 1.0);
    let out = run_engine(
        EngineConfig::default(),
        &input,
        &[],
        &MorphSettings::default().with_bypass(true),
    );
    assert!((out[n + 100] - 1.0).abs() < 1e-5, "got {}", out[n + 100]);
    let stray: f32 = out
        .iter()
        .enumerate()
        .filter(|&(t, _)| t != n + 100)
        .map(|(_, x)| x.abs())
        .fold(0.0, f32::max);
    assert!(stray < 1e-5, "stray energy {}", stray);
}

#[test]
fn output_is_causal() {
    // Two inputs that agree up to sample `split`. Outputs must agree up to
    // and including `split`, since output[t] only sees inputs before t.
    let config = EngineConfig::default().with_frame_size(128);
    let settings = MorphSettings::default()
        .with_magnitude(MagnitudeStrategy::Multiply)
        .with_phase(PhaseStrategy::SmoothStep)
        .with_morph_factor(0.3);

    let len = 1500;
    let split = 700;
    let main_a = gen_sine(523.0, 44100, len, |_| 0.5);
    let aux = gen_sine(97.0, 44100, len, |_| 0.8);
    let mut main_b = main_a.clone();
    for x in main_b[split..].iter_mut() {
        *x = -*x * 3.0 + 0.25;
    }

    let out_a = run_engine(config, &main_a, &aux, &settings);
    let out_b = run_engine(config, &main_b, &aux, &settings);

    for t in 0..=split {
        assert_eq!(out_a[t], out_b[t], "outputs diverged at t={} (split {})", t, split);
    }
    assert!(
        out_a[split + 1..]
            .iter()
            .zip(out_b[split + 1..].iter())
            .any(|(a, b)| a != b),
        "changed input never reached the output"
    );
}

#[test]
fn latency_matches_frame_size_for_all_configs() {
    let configs = [
        (16usize, 4usize, WindowType::Hann),
        (64, 8, WindowType::Hann),
        (256, 4, WindowType::Hann),
        (1024, 8, WindowType::BlackmanHarris),
        (2048, 16, WindowType::BlackmanHarris),
        (16, 8, WindowType::BlackmanHarris),
    ];
    for (n, k, window) in configs {
        let config = EngineConfig::default()
            .with_frame_size(n)
            .with_overlap_factor(k)
            .with_window_type(window);
        let processor = specmorph::MorphProcessor::new(config).unwrap();
        assert_eq!(processor.latency_samples(), n, "{:?} n={} k={}", window, n, k);
        assert_eq!(processor.frame_size(), n);
        assert_eq!(processor.hop_size(), n / k);
        assert_eq!(processor.config(), &config);
    }
}

#[test]
fn uneven_overlap_is_rejected_at_construction() {
    for (n, k, window) in [
        (16usize, 1usize, WindowType::Hann),
        (64, 2, WindowType::Hann),
        (256, 4, WindowType::BlackmanHarris),
    ] {
        let config = EngineConfig::default()
            .with_frame_size(n)
            .with_overlap_factor(k)
            .with_window_type(window);
        assert_eq!(
            specmorph::MorphProcessor::new(config).err(),
            Some(MorphError::UnevenOverlap { window, overlap: k }),
            "{:?} n={} k={}",
            window,
            n,
            k
        );
    }
}
