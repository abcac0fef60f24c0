//! Per-bin spectral morphing of the main and aux spectra.

use rustfft::num_complex::Complex;

use crate::core::types::{Channel, CHANNEL_COUNT};
use crate::morph::params::MorphSettings;
use crate::morph::phase::invert_phases;

/// Polar decomposition of one spectrum.
#[derive(Debug, Clone)]
struct PolarSpectrum {
    magnitudes: Vec<f32>,
    phases: Vec<f32>,
}

impl PolarSpectrum {
    fn with_bins(num_bins: usize) -> Self {
        Self {
            magnitudes: vec![0.0; num_bins],
            phases: vec![0.0; num_bins],
        }
    }

    fn decompose(&mut self, spectrum: &[Complex<f32>]) {
        for ((mag, phase), c) in self
            .magnitudes
            .iter_mut()
            .zip(self.phases.iter_mut())
            .zip(spectrum.iter())
        {
            let (r, theta) = c.to_polar();
            *mag = r;
            *phase = theta;
        }
    }
}

/// Combines two spectra bin by bin according to [`MorphSettings`].
///
/// Holds preallocated polar buffers for both inputs and the result, so
/// [`SpectralMorpher::morph`] never allocates.
#[derive(Debug, Clone)]
pub struct SpectralMorpher {
    num_bins: usize,
    inputs: [PolarSpectrum; CHANNEL_COUNT],
    output: PolarSpectrum,
}

impl SpectralMorpher {
    /// Creates a morpher for spectra of `num_bins` bins.
    pub fn new(num_bins: usize) -> Self {
        Self {
            num_bins,
            inputs: [
                PolarSpectrum::with_bins(num_bins),
                PolarSpectrum::with_bins(num_bins),
            ],
            output: PolarSpectrum::with_bins(num_bins),
        }
    }

    /// Returns the number of bins processed per call.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    /// Morphs `main` and `aux` into `out`.
    ///
    /// The magnitude and phase strategies are applied independently, then
    /// phase inversion if requested, then each bin is rebuilt as
    /// `magnitude · (cos φ, sin φ)`. The formant-shift setting is reserved
    /// and not applied. Only the first `num_bins` bins of each slice are
    /// touched.
    pub fn morph(
        &mut self,
        main: &[Complex<f32>],
        aux: &[Complex<f32>],
        settings: &MorphSettings,
        out: &mut [Complex<f32>],
    ) {
        let n = self.num_bins;
        let m = settings.effective_morph_factor();

        self.inputs[Channel::Main.index()].decompose(&main[..n]);
        self.inputs[Channel::Aux.index()].decompose(&aux[..n]);

        let [main_polar, aux_polar] = &self.inputs;
        settings.magnitude.apply(
            m,
            &main_polar.magnitudes,
            &aux_polar.magnitudes,
            &mut self.output.magnitudes,
        );
        settings.phase.apply(
            m,
            &main_polar.phases,
            &aux_polar.phases,
            &mut self.output.phases,
        );
        if settings.invert_phase {
            invert_phases(&mut self.output.phases);
        }

        for ((bin, &mag), &phase) in out[..n]
            .iter_mut()
            .zip(self.output.magnitudes.iter())
            .zip(self.output.phases.iter())
        {
            *bin = Complex::from_polar(mag, phase);
        }
    }

    /// Magnitudes produced by the most recent [`SpectralMorpher::morph`].
    pub fn last_magnitudes(&self) -> &[f32] {
        &self.output.magnitudes
    }

    /// Phases produced by the most recent [`SpectralMorpher::morph`].
    pub fn last_phases(&self) -> &[f32] {
        &self.output.phases
    }
}
