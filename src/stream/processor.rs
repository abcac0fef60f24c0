use rustfft::num_complex::Complex;

use crate::core::fft::{write_interleaved, SpectralTransform, COMPLEX_ZERO};
use crate::core::ring_buffer::StftFifo;
use crate::core::types::{Channel, EngineConfig, Sample, CHANNEL_COUNT};
use crate::core::window::{apply_window, generate_periodic_window, window_correction};
use crate::error::MorphError;
use crate::morph::engine::SpectralMorpher;
use crate::morph::params::MorphSettings;

/// Sample rate assumed until [`MorphProcessor::prepare`] is called.
const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Sample-by-sample STFT morphing engine for one output channel.
///
/// Main and aux samples are pushed one at a time. Every `hop_size` samples
/// the last `frame_size` samples of both inputs are windowed, transformed,
/// morphed, transformed back, windowed again, scaled by the window
/// correction and overlap-added into the output ring. Output is delayed by
/// exactly `frame_size` samples.
///
/// All buffers, window tables and FFT plans are created in
/// [`MorphProcessor::new`]; processing never allocates, locks or fails.
/// Stereo callers run one processor per channel.
pub struct MorphProcessor {
    config: EngineConfig,
    fifo: StftFifo,
    window: Vec<f32>,
    /// Gain restoring unity after double windowing and overlap-add.
    window_correction: f32,
    transform: SpectralTransform,
    morpher: SpectralMorpher,
    /// Windowed time-domain frames, one per input channel.
    frames: [Vec<Sample>; CHANNEL_COUNT],
    /// Forward spectra, one per input channel.
    spectra: [Vec<Complex<f32>>; CHANNEL_COUNT],
    /// Result of the most recent morph.
    morphed: Vec<Complex<f32>>,
    sample_rate: u32,
    max_block_size: usize,
}

impl MorphProcessor {
    /// Creates a processor, allocating everything the real-time path needs.
    ///
    /// # Errors
    /// Returns the validation error of `config`.
    pub fn new(config: EngineConfig) -> Result<Self, MorphError> {
        config.validate()?;

        let frame_size = config.frame_size;
        let hop_size = config.hop_size();
        let num_bins = config.num_bins();
        let window = generate_periodic_window(config.window_type, frame_size);
        let correction = window_correction(&window, hop_size);

        log::debug!(
            "morph processor: frame_size={} hop={} window={:?} correction={:.6}",
            frame_size,
            hop_size,
            config.window_type,
            correction
        );

        Ok(Self {
            config,
            fifo: StftFifo::new(frame_size, hop_size),
            window,
            window_correction: correction,
            transform: SpectralTransform::new(frame_size),
            morpher: SpectralMorpher::new(num_bins),
            frames: [vec![0.0; frame_size], vec![0.0; frame_size]],
            spectra: [vec![COMPLEX_ZERO; num_bins], vec![COMPLEX_ZERO; num_bins]],
            morphed: vec![COMPLEX_ZERO; num_bins],
            sample_rate: DEFAULT_SAMPLE_RATE,
            max_block_size: 0,
        })
    }

    /// Records the host's sample rate and block size, then resets.
    ///
    /// Both values are informational: frame and hop size stay fixed.
    pub fn prepare(&mut self, sample_rate: u32, max_block_size: usize) {
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        log::debug!(
            "morph processor prepared: {} Hz, max block {} samples, latency {} samples",
            sample_rate,
            max_block_size,
            self.latency_samples()
        );
        self.reset();
    }

    /// Clears all rings, counters and spectra.
    ///
    /// Call before first use and on any discontinuity such as transport
    /// stop/start.
    pub fn reset(&mut self) {
        self.fifo.reset();
        for frame in self.frames.iter_mut() {
            frame.iter_mut().for_each(|x| *x = 0.0);
        }
        for spectrum in self.spectra.iter_mut() {
            spectrum.iter_mut().for_each(|c| *c = COMPLEX_ZERO);
        }
        self.morphed.iter_mut().for_each(|c| *c = COMPLEX_ZERO);
    }

    /// Processes one main/aux sample pair and returns one output sample.
    ///
    /// The returned sample was synthesized from input `frame_size` samples
    /// ago.
    #[inline]
    pub fn process_sample(&mut self, main: Sample, aux: Sample, settings: &MorphSettings) -> Sample {
        let out = self.fifo.push(main, aux);
        if self.fifo.take_frame_due() {
            self.process_frame(settings);
        }
        out
    }

    /// Processes `main` in place with uniform settings.
    ///
    /// Aux samples missing past the end of `aux` are treated as silence.
    pub fn process_block(&mut self, main: &mut [Sample], aux: &[Sample], settings: &MorphSettings) {
        for (i, sample) in main.iter_mut().enumerate() {
            let aux_sample = aux.get(i).copied().unwrap_or(0.0);
            *sample = self.process_sample(*sample, aux_sample, settings);
        }
    }

    /// Processes `min(main.len(), out.len())` samples into `out`.
    ///
    /// Aux samples missing past the end of `aux` are treated as silence.
    pub fn process_block_into(
        &mut self,
        main: &[Sample],
        aux: &[Sample],
        out: &mut [Sample],
        settings: &MorphSettings,
    ) {
        for (i, (o, &m)) in out.iter_mut().zip(main.iter()).enumerate() {
            let aux_sample = aux.get(i).copied().unwrap_or(0.0);
            *o = self.process_sample(m, aux_sample, settings);
        }
    }

    /// Runs one analysis/morph/resynthesis pass over the buffered frame.
    fn process_frame(&mut self, settings: &MorphSettings) {
        for channel in Channel::ALL {
            let frame = &mut self.frames[channel.index()];
            self.fifo.copy_frame(channel, frame);
            apply_window(frame, &self.window);
        }

        let mut gain = self.window_correction;
        if !settings.bypass {
            let [main_frame, aux_frame] = &mut self.frames;
            let [main_spectrum, aux_spectrum] = &mut self.spectra;

            self.transform.forward(main_frame, main_spectrum);
            self.transform.forward(aux_frame, aux_spectrum);
            self.morpher
                .morph(main_spectrum, aux_spectrum, settings, &mut self.morphed);
            self.transform.inverse(&self.morphed, main_frame);

            gain *= self.transform.inverse_scale();
        }

        let output = &mut self.frames[Channel::Main.index()];
        apply_window(output, &self.window);
        for sample in output.iter_mut() {
            *sample *= gain;
        }
        self.fifo.overlap_add(output);
    }

    /// Returns the output delay in samples. Always equal to the frame size.
    #[inline]
    pub fn latency_samples(&self) -> usize {
        self.config.frame_size
    }

    /// Returns the output delay in seconds at the prepared sample rate.
    pub fn latency_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.latency_samples() as f64 / self.sample_rate as f64
    }

    /// Returns the engine configuration.
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the frame size.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.config.frame_size
    }

    /// Returns the hop size.
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.config.hop_size()
    }

    /// Returns the overlap-add correction gain.
    #[inline]
    pub fn window_correction(&self) -> f32 {
        self.window_correction
    }

    /// Returns the sample rate given to [`MorphProcessor::prepare`].
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Returns the block size given to [`MorphProcessor::prepare`].
    #[inline]
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Samples pushed since the last frame was processed.
    #[inline]
    pub fn hop_counter(&self) -> usize {
        self.fifo.hop_counter()
    }

    /// Current ring position.
    #[inline]
    pub fn position(&self) -> usize {
        self.fifo.position()
    }

    /// Morphed spectrum of the most recent non-bypassed frame.
    pub fn last_spectrum(&self) -> &[Complex<f32>] {
        &self.morphed
    }

    /// Copies the most recent morphed spectrum into the packed
    /// `[re, im, ...]` layout. `out` is normally `2 · frame_size` long.
    pub fn last_spectrum_interleaved(&self, out: &mut [f32]) {
        write_interleaved(&self.morphed, out);
    }
}
