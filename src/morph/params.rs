//! Per-call morph settings and the two strategy selectors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::MorphError;

/// How the magnitudes of the two spectra are combined.
///
/// Variants are listed in host choice-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MagnitudeStrategy {
    /// `m·main + (1−m)·aux`.
    #[default]
    Add,
    /// `|m·main − (1−m)·aux|`.
    Subtract,
    /// `|(m·main)·((1−m)·aux)| / max(main·aux, 1)`.
    Multiply,
    /// `min(m·main / max((1−m)·aux, 1e-6), 1)`.
    Divide,
    /// Per-bin crossfade from main (lowest bin) to aux (highest bin).
    LinearBlend,
    /// Main magnitude, unmodified.
    AllPass,
}

impl MagnitudeStrategy {
    /// All strategies in choice-index order.
    pub const ALL: [MagnitudeStrategy; 6] = [
        MagnitudeStrategy::Add,
        MagnitudeStrategy::Subtract,
        MagnitudeStrategy::Multiply,
        MagnitudeStrategy::Divide,
        MagnitudeStrategy::LinearBlend,
        MagnitudeStrategy::AllPass,
    ];

    /// Maps a host choice index; anything out of range passes main through.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(MagnitudeStrategy::AllPass)
    }

    /// Kebab-case name used by the CLI and settings files.
    pub fn name(self) -> &'static str {
        match self {
            MagnitudeStrategy::Add => "add",
            MagnitudeStrategy::Subtract => "subtract",
            MagnitudeStrategy::Multiply => "multiply",
            MagnitudeStrategy::Divide => "divide",
            MagnitudeStrategy::LinearBlend => "linear-blend",
            MagnitudeStrategy::AllPass => "all-pass",
        }
    }
}

impl fmt::Display for MagnitudeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MagnitudeStrategy {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == key)
            .ok_or_else(|| {
                MorphError::InvalidInput(format!(
                    "unknown magnitude strategy '{}': expected one of {}",
                    s,
                    Self::ALL.map(|m| m.name()).join(", ")
                ))
            })
    }
}

/// How the phases of the two spectra are combined.
///
/// Variants are listed in host choice-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStrategy {
    /// `m·main + (1−m)·aux`.
    #[default]
    Add,
    /// Ramp from −π to π across the bins, ignoring both inputs.
    Linear,
    /// Blend of the averaged input phase with the linear ramp, weighted by `m`.
    LinearNatural,
    /// Blend weighted by the smoothstep curve `3m² − 2m³`.
    SmoothStep,
    /// Main phase, unmodified.
    PreserveMainIn,
    /// Aux phase, unmodified.
    PreserveAuxIn,
}

impl PhaseStrategy {
    /// All strategies in choice-index order.
    pub const ALL: [PhaseStrategy; 6] = [
        PhaseStrategy::Add,
        PhaseStrategy::Linear,
        PhaseStrategy::LinearNatural,
        PhaseStrategy::SmoothStep,
        PhaseStrategy::PreserveMainIn,
        PhaseStrategy::PreserveAuxIn,
    ];

    /// Maps a host choice index; anything out of range keeps the main phase.
    pub fn from_index(index: i64) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(PhaseStrategy::PreserveMainIn)
    }

    /// Kebab-case name used by the CLI and settings files.
    pub fn name(self) -> &'static str {
        match self {
            PhaseStrategy::Add => "add",
            PhaseStrategy::Linear => "linear",
            PhaseStrategy::LinearNatural => "linear-natural",
            PhaseStrategy::SmoothStep => "smooth-step",
            PhaseStrategy::PreserveMainIn => "preserve-main-in",
            PhaseStrategy::PreserveAuxIn => "preserve-aux-in",
        }
    }
}

impl fmt::Display for PhaseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PhaseStrategy {
    type Err = MorphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == key)
            .ok_or_else(|| {
                MorphError::InvalidInput(format!(
                    "unknown phase strategy '{}': expected one of {}",
                    s,
                    Self::ALL.map(|p| p.name()).join(", ")
                ))
            })
    }
}

/// Settings supplied with every processed sample.
///
/// Owned by the caller; the engine reads them for the frame in progress and
/// keeps nothing between calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphSettings {
    /// Skip the transform and morph, overlap-adding the windowed input.
    pub bypass: bool,
    /// Weight of main versus aux, in `[0, 1]` (1.0 = main only).
    pub morph_factor: f32,
    /// Reserved for spectral-envelope shifting; currently has no effect.
    pub formant_shift: f32,
    /// Magnitude combination.
    pub magnitude: MagnitudeStrategy,
    /// Phase combination.
    pub phase: PhaseStrategy,
    /// Negate every output phase after the phase strategy.
    pub invert_phase: bool,
}

impl Default for MorphSettings {
    fn default() -> Self {
        Self {
            bypass: false,
            morph_factor: 0.5,
            formant_shift: 0.0,
            magnitude: MagnitudeStrategy::Add,
            phase: PhaseStrategy::Add,
            invert_phase: false,
        }
    }
}

impl MorphSettings {
    /// Settings that resynthesize the main input unchanged.
    pub fn passthrough() -> Self {
        Self {
            magnitude: MagnitudeStrategy::AllPass,
            phase: PhaseStrategy::PreserveMainIn,
            ..Self::default()
        }
    }

    /// Set bypass.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass = bypass;
        self
    }

    /// Set the morph factor, clamped to `[0, 1]`.
    pub fn with_morph_factor(mut self, morph_factor: f32) -> Self {
        self.morph_factor = morph_factor.clamp(0.0, 1.0);
        self
    }

    /// Set the reserved formant-shift factor.
    pub fn with_formant_shift(mut self, formant_shift: f32) -> Self {
        self.formant_shift = formant_shift;
        self
    }

    /// Set the magnitude strategy.
    pub fn with_magnitude(mut self, magnitude: MagnitudeStrategy) -> Self {
        self.magnitude = magnitude;
        self
    }

    /// Set the phase strategy.
    pub fn with_phase(mut self, phase: PhaseStrategy) -> Self {
        self.phase = phase;
        self
    }

    /// Set phase inversion.
    pub fn with_invert_phase(mut self, invert_phase: bool) -> Self {
        self.invert_phase = invert_phase;
        self
    }

    /// Morph factor as used by the engine: clamped to `[0, 1]`, non-finite
    /// values select main only.
    #[inline]
    pub fn effective_morph_factor(&self) -> f32 {
        if self.morph_factor.is_finite() {
            self.morph_factor.clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Validate values read from outside the process (files, CLI).
    pub fn validate(&self) -> Result<(), MorphError> {
        if !self.morph_factor.is_finite() || !(0.0..=1.0).contains(&self.morph_factor) {
            return Err(MorphError::InvalidInput(format!(
                "morph factor must be within [0, 1], got {}",
                self.morph_factor
            )));
        }
        if !self.formant_shift.is_finite() {
            return Err(MorphError::InvalidInput(format!(
                "formant shift must be finite, got {}",
                self.formant_shift
            )));
        }
        Ok(())
    }
}

/// Writes morph settings as JSON.
pub fn write_settings_json(path: &Path, settings: &MorphSettings) -> Result<(), MorphError> {
    let json = serde_json::to_string_pretty(settings).map_err(|e| {
        MorphError::InvalidFormat(format!("failed to serialize morph settings: {}", e))
    })?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reads and validates morph settings from JSON. Missing fields take their
/// defaults.
pub fn read_settings_json(path: &Path) -> Result<MorphSettings, MorphError> {
    let data = std::fs::read_to_string(path)?;
    let settings: MorphSettings = serde_json::from_str(&data).map_err(|e| {
        MorphError::InvalidFormat(format!(
            "failed to parse morph settings from {}: {}",
            path.display(),
            e
        ))
    })?;
    settings.validate()?;
    Ok(settings)
}
