//! Magnitude combination strategies.

use crate::morph::params::MagnitudeStrategy;

/// Floor for denominators in the divide strategy.
pub const DIVIDE_EPSILON: f32 = 1e-6;
/// Upper bound on divide output; inputs are assumed normalized.
pub const DIVIDE_CEILING: f32 = 1.0;
/// Floor for the multiply normalization term.
const MULTIPLY_NORM_FLOOR: f32 = 1.0;

/// Position of `bin` on a 0→1 ramp across `num_bins` bins.
#[inline]
pub(crate) fn ramp_position(bin: usize, num_bins: usize) -> f32 {
    if num_bins <= 1 {
        0.0
    } else {
        bin as f32 / (num_bins - 1) as f32
    }
}

impl MagnitudeStrategy {
    /// Combines per-bin magnitudes into `out`.
    ///
    /// `m` is the morph factor in `[0, 1]`. All slices share one length.
    /// Every strategy yields non-negative output for non-negative input.
    pub fn apply(self, m: f32, main: &[f32], aux: &[f32], out: &mut [f32]) {
        let num_bins = out.len();
        let inv = 1.0 - m;
        let bins = out.iter_mut().zip(main.iter().zip(aux.iter()));

        match self {
            MagnitudeStrategy::Add => {
                for (o, (&a, &b)) in bins {
                    *o = m * a + inv * b;
                }
            }
            MagnitudeStrategy::Subtract => {
                for (o, (&a, &b)) in bins {
                    *o = (m * a - inv * b).abs();
                }
            }
            MagnitudeStrategy::Multiply => {
                for (o, (&a, &b)) in bins {
                    let product = ((m * a) * (inv * b)).abs();
                    *o = product / (a * b).max(MULTIPLY_NORM_FLOOR);
                }
            }
            MagnitudeStrategy::Divide => {
                for (o, (&a, &b)) in bins {
                    let denom = (inv * b).max(DIVIDE_EPSILON);
                    *o = (m * a / denom).min(DIVIDE_CEILING);
                }
            }
            MagnitudeStrategy::LinearBlend => {
                for (i, (o, (&a, &b))) in bins.enumerate() {
                    let blend = ramp_position(i, num_bins);
                    *o = blend * b + (1.0 - blend) * a;
                }
            }
            MagnitudeStrategy::AllPass => {
                out.copy_from_slice(&main[..num_bins]);
            }
        }
    }
}
