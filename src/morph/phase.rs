//! Phase combination strategies.

use std::f32::consts::PI;

use crate::morph::magnitude::ramp_position;
use crate::morph::params::PhaseStrategy;

const TWO_PI: f32 = 2.0 * PI;

/// Wraps a phase value into [-PI, PI].
///
/// Values already inside the range are returned unchanged.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    if (-PI..=PI).contains(&phase) {
        return phase;
    }
    let p = phase + PI;
    let wrapped = p - (p / TWO_PI).floor() * TWO_PI - PI;
    wrapped.clamp(-PI, PI)
}

/// Phase of `bin` on a −π→π ramp across `num_bins` bins.
#[inline]
fn linear_ramp(bin: usize, num_bins: usize) -> f32 {
    -PI + TWO_PI * ramp_position(bin, num_bins)
}

/// Cubic smoothstep `3m² − 2m³`.
#[inline]
pub fn smoothstep(m: f32) -> f32 {
    m * m * (3.0 - 2.0 * m)
}

impl PhaseStrategy {
    /// Combines per-bin phases into `out`.
    ///
    /// `m` is the morph factor in `[0, 1]`. All slices share one length and
    /// every output lies in [-PI, PI].
    pub fn apply(self, m: f32, main: &[f32], aux: &[f32], out: &mut [f32]) {
        let num_bins = out.len();
        let inv = 1.0 - m;
        let bins = out.iter_mut().zip(main.iter().zip(aux.iter()));

        match self {
            PhaseStrategy::Add => {
                for (o, (&a, &b)) in bins {
                    *o = wrap_phase(m * a + inv * b);
                }
            }
            PhaseStrategy::Linear => {
                for (i, o) in out.iter_mut().enumerate() {
                    *o = wrap_phase(linear_ramp(i, num_bins));
                }
            }
            PhaseStrategy::LinearNatural => {
                for (i, (o, (&a, &b))) in bins.enumerate() {
                    let averaged = m * a + inv * b;
                    *o = wrap_phase(inv * averaged + m * linear_ramp(i, num_bins));
                }
            }
            PhaseStrategy::SmoothStep => {
                let c = smoothstep(m);
                for (o, (&a, &b)) in bins {
                    *o = wrap_phase(c * a + (1.0 - c) * b);
                }
            }
            PhaseStrategy::PreserveMainIn => {
                out.copy_from_slice(&main[..num_bins]);
            }
            PhaseStrategy::PreserveAuxIn => {
                out.copy_from_slice(&aux[..num_bins]);
            }
        }
    }
}

/// Negates every phase in place.
#[inline]
pub fn invert_phases(phases: &mut [f32]) {
    for p in phases.iter_mut() {
        *p = -*p;
    }
}
