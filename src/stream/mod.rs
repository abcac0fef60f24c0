//! Real-time per-sample processing.

pub mod processor;

pub use processor::MorphProcessor;
