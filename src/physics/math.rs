//! Scalar and 2D linear algebra helpers
//!
//! Vectors and matrices are `glam` types; this module pins the scalar type
//! and adds the few operations whose edge-case behavior the engine relies on.

pub use glam::{Mat2, Vec2};

/// Scalar type used by the whole physics core
pub type Real = f32;

/// Smallest `x` such that `1.0 + x != 1.0`
pub const EPSILON: Real = Real::EPSILON;

pub const TAU: Real = std::f32::consts::TAU;
pub const PI: Real = std::f32::consts::PI;
pub const DEG2RAD: Real = PI / 180.0;
pub const RAD2DEG: Real = 180.0 / PI;

/// -1, 0 or 1 depending on the sign of `value` (0 for NaN)
#[inline]
pub fn sign(value: Real) -> Real {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Unit vector in the direction of `vec`.
///
/// Unlike `Vec2::normalize_or_zero`, a zero vector yields non-finite
/// components; callers that can hit that case must check first.
#[inline]
pub fn normalize(vec: Vec2) -> Vec2 {
    vec / vec.length()
}

/// Counter-clockwise rotation by `radians`
#[inline]
pub fn rotation(radians: Real) -> Mat2 {
    Mat2::from_angle(radians)
}

/// Inverse of `matrix`; non-finite when the matrix is singular
#[inline]
pub fn inverse(matrix: Mat2) -> Mat2 {
    let inv = 1.0 / matrix.determinant();
    Mat2::from_cols(
        Vec2::new(matrix.y_axis.y, -matrix.x_axis.y),
        Vec2::new(-matrix.y_axis.x, matrix.x_axis.x),
    ) * inv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.5), 1.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(Real::NAN), 0.0);
    }

    #[test]
    fn test_normalize() {
        let n = normalize(Vec2::new(3.0, 4.0));
        assert!(approx(n, Vec2::new(0.6, 0.8)));

        // Zero vector is the caller's problem
        let z = normalize(Vec2::ZERO);
        assert!(!z.is_finite());
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let r = rotation(PI / 2.0);
        assert!(approx(r * Vec2::X, Vec2::Y));
        assert!(approx(r * Vec2::Y, -Vec2::X));
        // Rotations are orthonormal
        assert!((r.determinant() - 1.0).abs() < 1e-5);
        let back = r.transpose() * r;
        assert!(approx(back * Vec2::new(2.0, -7.0), Vec2::new(2.0, -7.0)));
    }

    #[test]
    fn test_inverse() {
        let m = Mat2::from_cols(Vec2::new(2.0, 1.0), Vec2::new(-1.0, 3.0));
        let id = inverse(m) * m;
        assert!(approx(id * Vec2::new(5.0, -2.0), Vec2::new(5.0, -2.0)));

        let singular = Mat2::from_cols(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert!(!inverse(singular).is_finite());
    }

    #[test]
    fn test_angle_conversions() {
        assert!((180.0 * DEG2RAD - PI).abs() < 1e-6);
        assert!((PI * RAD2DEG - 180.0).abs() < 1e-4);
        assert!((TAU - 2.0 * PI).abs() < 1e-6);
    }
}
