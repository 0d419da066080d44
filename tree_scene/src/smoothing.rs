//! Frame-rate independent exponential smoothing.
//!
//! `damp` moves a value toward its target by `1 − e^(−rate·dt)` of the
//! remaining gap.  The fraction is always in [0, 1), so the value never
//! overshoots and, for `rate·dt > 0`, strictly closes the gap each step.
//! After `k` steps the gap is `e^(−rate·dt·k)` of the original, so reaching
//! 1 % takes `ln(100) / (rate·dt)` steps.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use num_traits::Float;

/// Fraction of the remaining gap covered in one step.
pub fn damp_factor<T: Float>(rate: T, dt: T) -> T {
    let x = rate * dt;
    if !(x > T::zero()) {
        return T::zero();
    }
    T::one() - (-x).exp()
}

pub fn damp<T: Float>(current: T, target: T, rate: T, dt: T) -> T {
    current + (target - current) * damp_factor(rate, dt)
}

pub fn damp_vec3(current: Vec3, target: Vec3, rate: f32, dt: f32) -> Vec3 {
    current.lerp(target, damp_factor(rate, dt))
}

/// Wrap an angle into (−π, π].
pub fn wrap_angle(a: f32) -> f32 {
    let w = (a + PI).rem_euclid(TAU) - PI;
    if w <= -PI { w + TAU } else { w }
}

/// Damp an angle along the shorter arc; the result stays continuous with
/// `current` (no wrapping of the returned value).
pub fn damp_angle(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let gap = wrap_angle(target - current);
    current + gap * damp_factor(rate, dt)
}
