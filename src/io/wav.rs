//! WAV file reading and writing for the offline path.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

use crate::core::types::{AudioBuffer, Sample};
use crate::error::MorphError;

/// Sample encoding used when writing WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavEncoding {
    /// 16-bit signed integer PCM.
    #[default]
    Pcm16,
    /// 24-bit signed integer PCM.
    Pcm24,
    /// 32-bit IEEE float.
    Float32,
}

impl WavEncoding {
    fn spec(self, channels: u16, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            WavEncoding::Pcm16 => (16, SampleFormat::Int),
            WavEncoding::Pcm24 => (24, SampleFormat::Int),
            WavEncoding::Float32 => (32, SampleFormat::Float),
        };
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Reads a WAV file into an interleaved [`AudioBuffer`].
///
/// Integer PCM of 8 to 32 bits and 32-bit float are supported; integer
/// samples are scaled to `[-1.0, 1.0)`.
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<AudioBuffer, MorphError> {
    let path = path.as_ref();
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    let data: Vec<Sample> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        (SampleFormat::Int, bits @ 8..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
        (format, bits) => {
            return Err(MorphError::InvalidFormat(format!(
                "unsupported WAV encoding: {:?} with {} bits per sample",
                format, bits
            )))
        }
    };

    log::info!(
        "read {}: {} channels, {} Hz, {} bits, {} samples",
        path.display(),
        spec.channels,
        spec.sample_rate,
        spec.bits_per_sample,
        data.len()
    );

    AudioBuffer::new(data, spec.channels, spec.sample_rate)
}

/// Writes an [`AudioBuffer`] to a WAV file.
///
/// Integer encodings clamp samples to `[-1.0, 1.0]` before quantizing.
pub fn write_wav_file(
    path: impl AsRef<Path>,
    buffer: &AudioBuffer,
    encoding: WavEncoding,
) -> Result<(), MorphError> {
    let path = path.as_ref();
    let spec = encoding.spec(buffer.channels, buffer.sample_rate);
    let mut writer = WavWriter::create(path, spec)?;

    match encoding {
        WavEncoding::Float32 => {
            for &s in &buffer.data {
                writer.write_sample(s)?;
            }
        }
        WavEncoding::Pcm16 => {
            for &s in &buffer.data {
                writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)?;
            }
        }
        WavEncoding::Pcm24 => {
            const MAX_24: f32 = 8_388_607.0;
            for &s in &buffer.data {
                writer.write_sample((s.clamp(-1.0, 1.0) * MAX_24).round() as i32)?;
            }
        }
    }
    writer.finalize()?;

    log::debug!(
        "wrote {}: {} frames as {:?}",
        path.display(),
        buffer.num_frames(),
        encoding
    );
    Ok(())
}
