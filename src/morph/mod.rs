//! Spectral morph engine: magnitude and phase strategies and their dispatch.

pub mod engine;
pub mod magnitude;
pub mod params;
pub mod phase;

pub use engine::SpectralMorpher;
pub use params::{MagnitudeStrategy, MorphSettings, PhaseStrategy};
pub use phase::wrap_phase;
