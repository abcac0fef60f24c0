#![allow(dead_code)]

use std::f32::consts::PI;

use specmorph::{EngineConfig, MorphProcessor, MorphSettings};

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

pub fn gen_impulse(at: usize, n: usize, amp: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; n];
    if at < n {
        out[at] = amp;
    }
    out
}

pub fn rms(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = signal.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq / signal.len() as f64).sqrt()
}

pub fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// Runs a fresh engine sample by sample over `main`/`aux` with fixed settings.
pub fn run_engine(
    config: EngineConfig,
    main: &[f32],
    aux: &[f32],
    settings: &MorphSettings,
) -> Vec<f32> {
    let mut processor = MorphProcessor::new(config).expect("valid engine config");
    main.iter()
        .enumerate()
        .map(|(i, &m)| {
            let a = aux.get(i).copied().unwrap_or(0.0);
            processor.process_sample(m, a, settings)
        })
        .collect()
}
