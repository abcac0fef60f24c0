//! Window functions for STFT analysis and resynthesis.
//!
//! Provides Hann, Blackman-Harris, and Kaiser-Bessel windows, in symmetric
//! and periodic form, plus the overlap-add gain correction derived from a
//! window table and hop size.
//!
//! # Window correction
//!
//! Each output sample is the sum of `K = frame_size / hop` overlapping frames,
//! each windowed twice (analysis and resynthesis). The overlap gain at sample
//! `n` is therefore `Σ_k w[n + k·hop]²`. For a periodic Hann window
//!
//! ```text
//! w²(θ) = 3/8 − ½·cos θ + ⅛·cos 2θ
//! ```
//!
//! and summing over `K ≥ 3` equally spaced shifts cancels both cosine terms,
//! leaving a constant gain of `3K/8`. At 75% overlap (`K = 4`) the gain is
//! `1.5` and the correction is `2/3`. Other windows are not exactly constant
//! under overlap, so the correction uses the mean gain over one hop.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Blackman-Harris window coefficients (4-term).
const BH_A0: f64 = 0.35875;
const BH_A1: f64 = 0.48829;
const BH_A2: f64 = 0.14128;
const BH_A3: f64 = 0.01168;

/// Floor for the overlap gain so a degenerate window never divides by zero.
const OVERLAP_GAIN_FLOOR: f32 = 1e-6;

/// Window function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowType {
    #[default]
    Hann,
    BlackmanHarris,
    Kaiser(u32), // beta parameter scaled by 100 (e.g., 800 = 8.0)
}

impl std::str::FromStr for WindowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hann" => Ok(WindowType::Hann),
            "blackman-harris" | "blackmanharris" | "bh" => Ok(WindowType::BlackmanHarris),
            "kaiser" => Ok(WindowType::Kaiser(800)),
            other => Err(format!(
                "unknown window '{}': expected hann, blackman-harris or kaiser",
                other
            )),
        }
    }
}

/// Generates a symmetric window of the specified type and size.
pub fn generate_window(window_type: WindowType, size: usize) -> Vec<f32> {
    match window_type {
        WindowType::Hann => hann_window(size),
        WindowType::BlackmanHarris => blackman_harris_window(size),
        WindowType::Kaiser(beta_100) => kaiser_window(size, beta_100 as f64 / 100.0),
    }
}

/// Generates a periodic window for overlap-add processing.
///
/// The window is computed symmetrically over `size + 1` points and the last
/// point is dropped. A symmetric window of length `size` repeats its end
/// sample and breaks constant overlap-add.
pub fn generate_periodic_window(window_type: WindowType, size: usize) -> Vec<f32> {
    if size == 0 {
        return vec![];
    }
    let mut window = generate_window(window_type, size + 1);
    window.truncate(size);
    window
}

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1), or `None`
/// to indicate the caller should compute the full window.
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f32>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

/// Generates a Hann window.
#[inline]
fn hann_window(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / (n - 1.0);
            (0.5 * (1.0 - x.cos())) as f32
        })
        .collect()
}

/// Generates a Blackman-Harris window.
#[inline]
fn blackman_harris_window(size: usize) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = i as f64 / (n - 1.0);
            let w = BH_A0 - BH_A1 * (2.0 * PI * x).cos() + BH_A2 * (4.0 * PI * x).cos()
                - BH_A3 * (6.0 * PI * x).cos();
            w as f32
        })
        .collect()
}

/// Generates a Kaiser window using the zeroth-order modified Bessel function.
#[inline]
fn kaiser_window(size: usize, beta: f64) -> Vec<f32> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let n = size as f64;
    let denom = bessel_i0(beta);
    (0..size)
        .map(|i| {
            let x = 2.0 * i as f64 / (n - 1.0) - 1.0;
            let arg = beta * (1.0 - x * x).max(0.0).sqrt();
            (bessel_i0(arg) / denom) as f32
        })
        .collect()
}

/// Maximum number of series terms for Bessel I0 convergence.
const BESSEL_MAX_TERMS: usize = 30;
/// Relative convergence threshold for Bessel I0 series.
const BESSEL_CONVERGENCE: f64 = 1e-15;

/// Zeroth-order modified Bessel function of the first kind.
#[inline]
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let x_half = x / 2.0;
    for k in 1..BESSEL_MAX_TERMS {
        term *= (x_half / k as f64) * (x_half / k as f64);
        sum += term;
        if term < BESSEL_CONVERGENCE * sum {
            break;
        }
    }
    sum
}

/// Applies a window function to a slice in-place.
#[inline]
pub fn apply_window(data: &mut [f32], window: &[f32]) {
    for (sample, &w) in data.iter_mut().zip(window.iter()) {
        *sample *= w;
    }
}

/// Per-offset sums of `w[n + k·hop]²` for every `n` in `[0, hop)`.
fn offset_sums(window: &[f32], hop: usize) -> impl Iterator<Item = f64> + '_ {
    (0..hop).map(move |n| {
        window[n..]
            .iter()
            .step_by(hop)
            .map(|&w| f64::from(w) * f64::from(w))
            .sum::<f64>()
    })
}

/// Mean squared-window overlap gain over one hop.
///
/// For each offset `n` in `[0, hop)` this sums `w[n + k·hop]²` over every
/// frame that overlaps it, then averages the sums. Windows that satisfy
/// constant overlap-add for squared gain return the same value at every `n`.
pub fn overlap_gain(window: &[f32], hop: usize) -> f32 {
    if window.is_empty() || hop == 0 {
        return 0.0;
    }
    let hop = hop.min(window.len());
    let total: f64 = offset_sums(window, hop).sum();
    (total / hop as f64) as f32
}

/// Relative ripple of the squared-window overlap sum.
///
/// Returns `(max - min) / mean` of the per-offset sums used by
/// [`overlap_gain`]. Zero means the double-windowed overlap-add is flat, so a
/// single correction scalar restores unity gain at every sample. Returns
/// infinity when the gain is too small to measure.
pub fn overlap_ripple(window: &[f32], hop: usize) -> f32 {
    if window.is_empty() || hop == 0 {
        return f32::INFINITY;
    }
    let hop = hop.min(window.len());
    let (mut lo, mut hi, mut total) = (f64::MAX, f64::MIN, 0.0f64);
    for sum in offset_sums(window, hop) {
        lo = lo.min(sum);
        hi = hi.max(sum);
        total += sum;
    }
    let mean = total / hop as f64;
    if mean < f64::from(OVERLAP_GAIN_FLOOR) {
        return f32::INFINITY;
    }
    ((hi - lo) / mean) as f32
}

/// Scalar that restores unity gain after double windowing and overlap-add.
///
/// Equal to `1 / overlap_gain(window, hop)`; `2/3` for periodic Hann at
/// 75% overlap.
pub fn window_correction(window: &[f32], hop: usize) -> f32 {
    1.0 / overlap_gain(window, hop).max(OVERLAP_GAIN_FLOOR)
}
