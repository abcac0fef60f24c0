#![forbid(unsafe_code)]
//! Real-time STFT spectral morphing between a main and an auxiliary stream.
//!
//! `specmorph` analyzes both inputs with overlapping periodic windows,
//! combines their spectra bin by bin using independent magnitude and phase
//! strategies, and resynthesizes the result by overlap-add. Output is
//! delayed by exactly one frame.
//!
//! # Quick Start
//!
//! ```
//! use specmorph::{AudioBuffer, EngineConfig, MorphSettings};
//!
//! // 1 second of 440 Hz and 660 Hz sines at 44.1 kHz
//! let tone = |f: f32| -> Vec<f32> {
//!     (0..44100)
//!         .map(|i| (2.0 * std::f32::consts::PI * f * i as f32 / 44100.0).sin())
//!         .collect()
//! };
//! let main = AudioBuffer::new(tone(440.0), 1, 44100).unwrap();
//! let aux = AudioBuffer::new(tone(660.0), 1, 44100).unwrap();
//!
//! let settings = MorphSettings::default().with_morph_factor(0.3);
//! let output = specmorph::morph_buffers(&main, &aux, &EngineConfig::default(), &settings).unwrap();
//! assert_eq!(output.num_frames(), main.num_frames());
//! ```
//!
//! # Streaming
//!
//! For real-time use, feed sample pairs or blocks to a [`MorphProcessor`]:
//!
//! ```
//! use specmorph::{EngineConfig, MagnitudeStrategy, MorphProcessor, MorphSettings, PhaseStrategy};
//!
//! let mut processor = MorphProcessor::new(EngineConfig::default()).unwrap();
//! processor.prepare(48000, 256);
//!
//! let settings = MorphSettings::default()
//!     .with_magnitude(MagnitudeStrategy::LinearBlend)
//!     .with_phase(PhaseStrategy::SmoothStep);
//!
//! let mut main = vec![0.0f32; 256];
//! let aux = vec![0.0f32; 256];
//! processor.process_block(&mut main, &aux, &settings);
//! assert_eq!(processor.latency_samples(), 1024);
//! ```

pub mod core;
pub mod error;
pub mod io;
pub mod morph;
pub mod stream;

pub use crate::core::types::{AudioBuffer, Channel, EngineConfig, Sample};
pub use crate::core::window::WindowType;
pub use error::MorphError;
pub use morph::{MagnitudeStrategy, MorphSettings, PhaseStrategy, SpectralMorpher};
pub use stream::MorphProcessor;

/// Deinterleaves multi-channel audio into separate per-channel vectors.
#[inline]
fn deinterleave(input: &[f32], num_channels: usize) -> Vec<Vec<f32>> {
    (0..num_channels)
        .map(|ch| {
            input
                .iter()
                .skip(ch)
                .step_by(num_channels)
                .copied()
                .collect()
        })
        .collect()
}

/// Rejects input containing NaN or infinite samples.
#[inline]
fn validate_input(input: &[f32]) -> Result<(), MorphError> {
    if input.iter().any(|s| !s.is_finite()) {
        return Err(MorphError::NonFiniteInput);
    }
    Ok(())
}

/// Renders a whole main buffer morphed against an aux buffer.
///
/// Each main channel runs through its own [`MorphProcessor`]. Main channel
/// `c` is paired with aux channel `min(c, aux.channels - 1)`, so a mono aux
/// feeds every main channel. Aux shorter than main is padded with silence
/// and extra aux is ignored.
///
/// The engine latency is compensated: the first `frame_size` outputs are
/// dropped and `frame_size` silent samples are flushed through, so the
/// output has exactly as many frames as `main` and lines up with it.
///
/// # Errors
///
/// Returns [`MorphError::SampleRateMismatch`] if the buffers disagree on
/// sample rate, [`MorphError::NonFiniteInput`] for NaN/Inf samples, and the
/// validation errors of `config` and `settings`.
///
/// # Example
///
/// ```
/// use specmorph::{AudioBuffer, EngineConfig, MorphSettings};
///
/// let main = AudioBuffer::new(vec![0.25; 4096], 1, 48000).unwrap();
/// let aux = AudioBuffer::new(vec![0.0; 4096], 1, 48000).unwrap();
///
/// // Passthrough reproduces the main input.
/// let out = specmorph::morph_buffers(
///     &main,
///     &aux,
///     &EngineConfig::default(),
///     &MorphSettings::passthrough(),
/// )
/// .unwrap();
/// assert!((out.data[2048] - 0.25).abs() < 1e-4);
/// ```
pub fn morph_buffers(
    main: &AudioBuffer,
    aux: &AudioBuffer,
    config: &EngineConfig,
    settings: &MorphSettings,
) -> Result<AudioBuffer, MorphError> {
    config.validate()?;
    settings.validate()?;
    if main.channels == 0 {
        return Err(MorphError::InvalidChannels(main.channels));
    }
    if aux.channels == 0 {
        return Err(MorphError::InvalidChannels(aux.channels));
    }
    if main.sample_rate != aux.sample_rate {
        return Err(MorphError::SampleRateMismatch {
            main: main.sample_rate,
            aux: aux.sample_rate,
        });
    }
    validate_input(&main.data)?;
    validate_input(&aux.data)?;

    let num_frames = main.num_frames();
    let latency = config.frame_size;
    let main_channels = deinterleave(&main.data, main.channels as usize);
    let aux_channels = deinterleave(&aux.data, aux.channels as usize);

    log::debug!(
        "morph_buffers: {} frames, main {} ch, aux {} ch, {} Hz, frame_size={} overlap={}, {:?}",
        num_frames,
        main.channels,
        aux.channels,
        main.sample_rate,
        config.frame_size,
        config.overlap_factor,
        settings
    );

    let mut outputs = Vec::with_capacity(main_channels.len());
    for (c, main_ch) in main_channels.iter().enumerate() {
        let aux_ch = &aux_channels[c.min(aux_channels.len() - 1)];

        let mut processor = MorphProcessor::new(*config)?;
        processor.prepare(main.sample_rate, num_frames);

        let mut rendered = Vec::with_capacity(num_frames + latency);
        for t in 0..num_frames + latency {
            let m = if t < num_frames { main_ch[t] } else { 0.0 };
            let a = aux_ch.get(t).copied().unwrap_or(0.0);
            rendered.push(processor.process_sample(m, a, settings));
        }
        outputs.push(rendered.split_off(latency));
    }

    AudioBuffer::from_channels(&outputs, main.sample_rate)
}
