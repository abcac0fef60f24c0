use serde::{Deserialize, Serialize};

use crate::core::window::{generate_periodic_window, overlap_ripple, WindowType};
use crate::error::MorphError;

/// A single audio sample (32-bit float, nominal range -1.0 to 1.0).
pub type Sample = f32;

/// Smallest supported frame size.
pub const MIN_FRAME_SIZE: usize = 16;
/// Largest supported frame size.
pub const MAX_FRAME_SIZE: usize = 65536;

/// Largest relative ripple of the squared-window overlap sum that
/// [`EngineConfig::validate`] accepts.
pub const MAX_OVERLAP_RIPPLE: f32 = 1e-4;

/// Number of input streams the engine consumes.
pub const CHANNEL_COUNT: usize = 2;

/// One of the two synchronized input streams.
///
/// Per-stream state is stored in `[T; CHANNEL_COUNT]` arrays and indexed
/// with [`Channel::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The primary signal. Its phase and magnitude are the pass-through defaults.
    Main,
    /// The auxiliary (sidechain) signal morphed into the main one.
    Aux,
}

impl Channel {
    /// Both channels in storage order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Main, Channel::Aux];

    /// Storage index of this channel.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Main => 0,
            Channel::Aux => 1,
        }
    }
}

/// Buffer holding audio samples in interleaved format.
///
/// For mono audio, samples are stored sequentially: `[s0, s1, s2, ...]`
/// For stereo audio, samples are interleaved: `[L0, R0, L1, R1, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Raw interleaved sample data.
    pub data: Vec<Sample>,
    /// Number of channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer.
    ///
    /// # Errors
    /// Returns `MorphError::InvalidChannels` if channels is 0.
    /// Returns `MorphError::InvalidSampleRate` if sample_rate is 0.
    pub fn new(data: Vec<Sample>, channels: u16, sample_rate: u32) -> Result<Self, MorphError> {
        if channels == 0 {
            return Err(MorphError::InvalidChannels(channels));
        }
        if sample_rate == 0 {
            return Err(MorphError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            data,
            channels,
            sample_rate,
        })
    }

    /// Number of frames in the buffer (total samples / channels).
    pub fn num_frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.data.len() / self.channels as usize
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a single channel's data as a new vector.
    pub fn channel_data(&self, channel: u16) -> Vec<Sample> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.data
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Create an `AudioBuffer` from separate channel vectors.
    ///
    /// # Errors
    /// Returns error if channels have different lengths or invalid parameters.
    pub fn from_channels(
        channels_data: &[Vec<Sample>],
        sample_rate: u32,
    ) -> Result<Self, MorphError> {
        if channels_data.is_empty() || channels_data.len() > u16::MAX as usize {
            return Err(MorphError::InvalidChannels(
                u16::try_from(channels_data.len()).unwrap_or(u16::MAX),
            ));
        }
        let num_frames = channels_data[0].len();
        if channels_data.iter().any(|ch| ch.len() != num_frames) {
            return Err(MorphError::InvalidInput(
                "All channels must have the same number of samples".to_string(),
            ));
        }
        let num_channels = channels_data.len() as u16;
        let mut data = Vec::with_capacity(num_frames * channels_data.len());
        for i in 0..num_frames {
            for ch in channels_data {
                data.push(ch[i]);
            }
        }
        AudioBuffer::new(data, num_channels, sample_rate)
    }
}

/// Construction-time engine configuration.
///
/// Frame size, overlap and window are fixed for the life of an engine; the
/// window correction and latency are derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// STFT frame size `N` in samples (default: 1024). Also the latency.
    pub frame_size: usize,
    /// Frames overlapping each output sample (default: 4, i.e. 75% overlap).
    pub overlap_factor: usize,
    /// Analysis/resynthesis window (default: Hann).
    pub window_type: WindowType,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_size: 1024,
            overlap_factor: 4,
            window_type: WindowType::Hann,
        }
    }
}

impl EngineConfig {
    /// Set the frame size.
    pub fn with_frame_size(mut self, frame_size: usize) -> Self {
        self.frame_size = frame_size;
        self
    }

    /// Set the overlap factor.
    pub fn with_overlap_factor(mut self, overlap_factor: usize) -> Self {
        self.overlap_factor = overlap_factor;
        self
    }

    /// Set the window type.
    pub fn with_window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    /// Samples between successive frames: `frame_size / overlap_factor`.
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.frame_size / self.overlap_factor.max(1)
    }

    /// Complex bins per frame: `frame_size / 2 + 1`.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Raise the overlap factor to the smallest power of two, no lower than
    /// the current one, that validates with this window.
    ///
    /// Returns the config unchanged if no such factor exists.
    pub fn with_balanced_overlap(self) -> Self {
        let limit = self.frame_size.min(MAX_FRAME_SIZE);
        let mut k = self.overlap_factor.max(1).next_power_of_two();
        while k <= limit {
            let candidate = self.with_overlap_factor(k);
            if candidate.validate().is_ok() {
                return candidate;
            }
            k *= 2;
        }
        self
    }

    /// Validate all parameters.
    ///
    /// Besides the size checks, the squared window must overlap-add to a
    /// constant within [`MAX_OVERLAP_RIPPLE`], otherwise no single correction
    /// scalar gives unity gain. Periodic Hann needs an overlap of at least 3,
    /// Blackman-Harris at least 7.
    pub fn validate(&self) -> Result<(), MorphError> {
        if !self.frame_size.is_power_of_two()
            || !(MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&self.frame_size)
        {
            return Err(MorphError::InvalidFrameSize(self.frame_size));
        }
        if self.overlap_factor == 0
            || self.overlap_factor > self.frame_size
            || self.frame_size % self.overlap_factor != 0
        {
            return Err(MorphError::InvalidOverlap {
                overlap: self.overlap_factor,
                frame_size: self.frame_size,
            });
        }
        let window = generate_periodic_window(self.window_type, self.frame_size);
        if overlap_ripple(&window, self.hop_size()) > MAX_OVERLAP_RIPPLE {
            return Err(MorphError::UnevenOverlap {
                window: self.window_type,
                overlap: self.overlap_factor,
            });
        }
        Ok(())
    }
}
