//! Scalar and vector helpers shared by the wind and aerodynamics crates.

use glam::DVec3;

pub fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b` as a fraction. Unclamped; returns
/// 0 when `a == b`.
pub fn inverse_lerp(a: f64, b: f64, value: f64) -> f64 {
    if a == b {
        0.0
    } else {
        (value - a) / (b - a)
    }
}

/// Signed angle in degrees from `reference` to `direction`, measured in the
/// plane perpendicular to `axis` (right-hand rule about `axis`).
///
/// Both vectors are implicitly projected onto that plane, so this is the
/// difference of their planar `atan2` angles wrapped into `[-180, 180]`.
/// Zero-length inputs give 0. NaN inputs give NaN.
pub fn signed_angle_deg(reference: DVec3, direction: DVec3, axis: DVec3) -> f64 {
    let sin = axis.dot(reference.cross(direction));
    let cos = reference.dot(direction) - axis.dot(reference) * axis.dot(direction);
    sin.atan2(cos).to_degrees()
}

/// Unsigned angle in degrees between two vectors, 0 for degenerate input.
pub fn angle_between_deg(a: DVec3, b: DVec3) -> f64 {
    let denom = a.length() * b.length();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}
