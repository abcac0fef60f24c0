//! Core types, window functions, FFT wrapper, and the circular FIFOs.

pub mod fft;
pub mod ring_buffer;
pub mod types;
pub mod window;

pub use fft::SpectralTransform;
pub use ring_buffer::StftFifo;
pub use types::*;
pub use window::{apply_window, generate_periodic_window, generate_window, WindowType};
