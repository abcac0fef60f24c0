//! Forward/inverse real-signal FFT over fixed-size frames.
//!
//! Spectra are stored as `frame_size / 2 + 1` complex bins. The packed
//! `[re, im, re, im, ...]` layout of length `2 · frame_size` used by hosts
//! and spectrum displays is only produced by [`write_interleaved`] and read
//! by [`read_interleaved`].

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::core::types::Sample;

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Number of non-redundant bins for a real frame of `frame_size` samples.
#[inline]
pub const fn num_bins(frame_size: usize) -> usize {
    frame_size / 2 + 1
}

/// Planned forward/inverse FFT pair with preallocated work buffers.
///
/// Neither direction allocates or keeps state between calls. The pair is
/// unnormalized: `inverse(forward(x)) == frame_size · x`, so callers fold
/// [`SpectralTransform::inverse_scale`] into their output gain.
pub struct SpectralTransform {
    frame_size: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Full-length complex work buffer.
    buffer: Vec<Complex<f32>>,
    /// Scratch shared by both plans.
    scratch: Vec<Complex<f32>>,
}

impl SpectralTransform {
    /// Plans both directions for `frame_size`-sample frames.
    pub fn new(frame_size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(frame_size);
        let inverse = planner.plan_fft_inverse(frame_size);
        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());

        Self {
            frame_size,
            forward,
            inverse,
            buffer: vec![COMPLEX_ZERO; frame_size],
            scratch: vec![COMPLEX_ZERO; scratch_len],
        }
    }

    /// Returns the frame size.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Returns the number of bins per spectrum.
    #[inline]
    pub fn num_bins(&self) -> usize {
        num_bins(self.frame_size)
    }

    /// Gain that turns the unnormalized inverse into an exact inverse.
    #[inline]
    pub fn inverse_scale(&self) -> f32 {
        1.0 / self.frame_size as f32
    }

    /// Transforms `frame` into its first `num_bins` spectrum bins.
    ///
    /// `frame` must hold `frame_size` samples and `spectrum` at least
    /// `num_bins` bins.
    pub fn forward(&mut self, frame: &[Sample], spectrum: &mut [Complex<f32>]) {
        for (slot, &sample) in self.buffer.iter_mut().zip(frame.iter()) {
            *slot = Complex::new(sample, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        let bins = self.num_bins();
        spectrum[..bins].copy_from_slice(&self.buffer[..bins]);
    }

    /// Transforms `num_bins` spectrum bins back into `frame_size` real samples.
    ///
    /// Negative frequencies are rebuilt as conjugates of the positive ones;
    /// the imaginary parts of DC and Nyquist do not contribute. Output is
    /// scaled by `frame_size` (see [`SpectralTransform::inverse_scale`]).
    pub fn inverse(&mut self, spectrum: &[Complex<f32>], frame: &mut [Sample]) {
        let bins = self.num_bins();
        self.buffer[..bins].copy_from_slice(&spectrum[..bins]);
        for bin in 1..bins - 1 {
            self.buffer[self.frame_size - bin] = spectrum[bin].conj();
        }

        self.inverse
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (out, c) in frame.iter_mut().zip(self.buffer.iter()) {
            *out = c.re;
        }
    }
}

/// Packs bins into `[re0, im0, re1, im1, ...]`.
///
/// Floats in `out` beyond `2 · spectrum.len()` are zeroed.
pub fn write_interleaved(spectrum: &[Complex<f32>], out: &mut [f32]) {
    let used = (2 * spectrum.len()).min(out.len());
    for (pair, c) in out[..used].chunks_exact_mut(2).zip(spectrum.iter()) {
        pair[0] = c.re;
        pair[1] = c.im;
    }
    out[used..].iter_mut().for_each(|x| *x = 0.0);
}

/// Unpacks `[re0, im0, re1, im1, ...]` into `spectrum.len()` bins.
///
/// Only the first `2 · spectrum.len()` floats of `packed` are read.
pub fn read_interleaved(packed: &[f32], spectrum: &mut [Complex<f32>]) {
    for (c, pair) in spectrum.iter_mut().zip(packed.chunks_exact(2)) {
        *c = Complex::new(pair[0], pair[1]);
    }
}
