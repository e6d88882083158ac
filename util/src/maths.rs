//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Linearly interpolate between two values.
///
/// The interpolant `t` is clamped into `[0, 1]`, so the result never leaves
/// the range spanned by `start` and `end`.
pub fn interpolate<T>(start: T, end: T, t: T) -> T
where
    T: Float,
{
    let t = clamp(t, T::from(0).unwrap(), T::from(1).unwrap());
    start + (end - start) * t
}

/// Return the interpolant which would produce `query` when interpolating
/// between `start` and `end`.
///
/// Returns zero when `start` and `end` coincide, so that a degenerate range
/// never produces a division by zero.
pub fn inverse_interpolate<T>(start: T, end: T, query: T) -> T
where
    T: Float,
{
    let range = end - start;
    if range <= T::from(0).unwrap() {
        return T::from(0).unwrap();
    }

    (query - start) / range
}

/// Wrap `value` into the range `[min, max)`.
///
/// The range is treated as periodic, so for instance wrapping an angle into
/// `[-pi, pi)` maps `3*pi/2` onto `-pi/2`.
pub fn input_modulus<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let modulus = max - min;

    // Shift into [0, modulus), then back up by min
    let wrapped = rem_euclid(value - min, modulus);
    wrapped + min
}

/// Wrap an angle in radians into the range `[-pi, pi)`.
pub fn wrap_angle<T>(angle_rad: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap();
    input_modulus(angle_rad, -pi_t, pi_t)
}

/// Clamp a value into the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// True if `a` and `b` are within `epsilon` of each other.
pub fn epsilon_eq<T>(a: T, b: T, epsilon: T) -> bool
where
    T: Float,
{
    (a - b).abs() <= epsilon
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_interpolate() {
        assert_eq!(interpolate(0f64, 10f64, 0.5), 5f64);
        assert_eq!(interpolate(0f64, 10f64, -1.0), 0f64);
        assert_eq!(interpolate(0f64, 10f64, 2.0), 10f64);
        assert_eq!(interpolate(-4f64, 4f64, 0.75), 2f64);
    }

    #[test]
    fn test_inverse_interpolate() {
        assert_eq!(inverse_interpolate(0f64, 10f64, 5f64), 0.5);
        assert_eq!(inverse_interpolate(2f64, 2f64, 7f64), 0f64);
    }

    #[test]
    fn test_input_modulus() {
        assert_eq!(input_modulus(170f64 + 360f64, -180f64, 180f64), 170f64);
        assert_eq!(input_modulus(-170f64 - 360f64, -180f64, 180f64), -170f64);
        assert_eq!(input_modulus(190f64, -180f64, 180f64), -170f64);
        assert_eq!(input_modulus(0.5f64, 0f64, 1f64), 0.5f64);
    }

    #[test]
    fn test_wrap_angle() {
        assert!(epsilon_eq(wrap_angle(3f64 * PI / 2f64), -PI / 2f64, 1e-12));
        assert!(epsilon_eq(wrap_angle(-3f64 * PI / 2f64), PI / 2f64, 1e-12));
        assert_eq!(wrap_angle(0f64), 0f64);
    }

    #[test]
    fn test_epsilon_eq() {
        assert!(epsilon_eq(1.0f64, 1.0 + 1e-10, 1e-9));
        assert!(!epsilon_eq(1.0f64, 1.1, 1e-9));
    }
}
