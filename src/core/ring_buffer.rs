//! Fixed-capacity circular FIFOs for the STFT engine.

use crate::core::types::{Channel, Sample, CHANNEL_COUNT};

/// Circular input rings (one per channel) and the output accumulation ring.
///
/// All rings have capacity `N` (the frame size) and share a single write
/// position. Each tick writes the new input samples at the position, reads
/// the output ring at the same position, and zeroes that output slot so the
/// next overlapping frames accumulate into a clean cell. A sample written to
/// the output ring at position `p` is therefore read exactly `N` ticks after
/// the input sample that was written at `p`.
///
/// The buffer never allocates after construction.
#[derive(Debug, Clone)]
pub struct StftFifo {
    inputs: [Vec<Sample>; CHANNEL_COUNT],
    output: Vec<Sample>,
    pos: usize,
    hop_counter: usize,
    hop_size: usize,
}

impl StftFifo {
    /// Creates zeroed rings of `frame_size` samples that signal a frame
    /// every `hop_size` pushes.
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self {
            inputs: [vec![0.0; frame_size], vec![0.0; frame_size]],
            output: vec![0.0; frame_size],
            pos: 0,
            hop_counter: 0,
            hop_size: hop_size.max(1),
        }
    }

    /// Ring capacity (the frame size).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.output.len()
    }

    /// Current shared read/write position, always `< capacity`.
    ///
    /// Between ticks this is the slot of the oldest buffered input sample.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Samples pushed since the last frame was signalled.
    #[inline]
    pub fn hop_counter(&self) -> usize {
        self.hop_counter
    }

    /// Pushes one sample per channel and pops one output sample.
    #[inline]
    pub fn push(&mut self, main: Sample, aux: Sample) -> Sample {
        self.inputs[Channel::Main.index()][self.pos] = main;
        self.inputs[Channel::Aux.index()][self.pos] = aux;

        let out = self.output[self.pos];
        self.output[self.pos] = 0.0;

        self.pos += 1;
        if self.pos == self.capacity() {
            self.pos = 0;
        }
        self.hop_counter += 1;
        out
    }

    /// Returns true (once) when a full hop has been pushed, resetting the
    /// hop counter.
    #[inline]
    pub fn take_frame_due(&mut self) -> bool {
        if self.hop_counter >= self.hop_size {
            self.hop_counter = 0;
            true
        } else {
            false
        }
    }

    /// Copies the last `capacity` samples of `channel` into `frame`, oldest
    /// first: `[pos, N)` followed by `[0, pos)`.
    pub fn copy_frame(&self, channel: Channel, frame: &mut [Sample]) {
        let ring = &self.inputs[channel.index()];
        let tail = ring.len() - self.pos;
        frame[..tail].copy_from_slice(&ring[self.pos..]);
        frame[tail..ring.len()].copy_from_slice(&ring[..self.pos]);
    }

    /// Adds a chronologically ordered frame into the output ring, using the
    /// same unwrapping as [`StftFifo::copy_frame`].
    pub fn overlap_add(&mut self, frame: &[Sample]) {
        let n = self.output.len();
        let tail = n - self.pos;
        for (out, &s) in self.output[self.pos..].iter_mut().zip(&frame[..tail]) {
            *out += s;
        }
        for (out, &s) in self.output[..self.pos].iter_mut().zip(&frame[tail..n]) {
            *out += s;
        }
    }

    /// Zeroes all rings and counters.
    pub fn reset(&mut self) {
        for ring in self.inputs.iter_mut() {
            ring.iter_mut().for_each(|x| *x = 0.0);
        }
        self.output.iter_mut().for_each(|x| *x = 0.0);
        self.pos = 0;
        self.hop_counter = 0;
    }
}
