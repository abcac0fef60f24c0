//! File I/O for the offline path.

pub mod wav;

pub use wav::{read_wav_file, write_wav_file, WavEncoding};
