//! Scalar utilities for the detection code path.
//!
//! Floating-point equality anywhere in detection goes through the
//! `almost_*` family below; raw `==` on doubles is reserved for exact
//! sentinel checks. The ULP bounds follow the IEEE-754 lexicographic
//! ordering trick, so two doubles within `PRECISION_DEFAULT` ulps agree
//! to roughly 13 decimal digits.

use std::f64::consts::PI;

pub const TWO_PI: f64 = 2.0 * PI;

/// Default ULP tolerance, ~1e-13 relative agreement.
pub const PRECISION_DEFAULT: u64 = PRECISION13;
pub const PRECISION5: u64 = 1 << 40;
pub const PRECISION7: u64 = 1 << 34;
pub const PRECISION9: u64 = 1 << 27;
pub const PRECISION13: u64 = 16348;

/// Square of a value.
#[inline]
pub fn sq(x: f64) -> f64 {
    x * x
}

/// Square root that never returns NaN for slightly negative arguments.
#[inline]
pub fn sqrt_safe(x: f64) -> f64 {
    x.max(0.0).sqrt()
}

/// Arc-tangent that maps the (0,0) corner case to 0 instead of leaving
/// it platform-defined.
#[inline]
pub fn atan2_safe(y: f64, x: f64) -> f64 {
    if y == 0.0 && x == 0.0 {
        return 0.0;
    }
    y.atan2(x)
}

/// Arc-sine with the argument clamped into [-1,1].
#[inline]
pub fn asin_safe(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

/// Arc-cosine with the argument clamped into [-1,1].
#[inline]
pub fn acos_safe(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}

/// Discriminant of the quadratic `ax^2 + bx + c`.
#[inline]
pub fn discr(a: f64, b: f64, c: f64) -> f64 {
    sq(b) - 4.0 * a * c
}

/// The root of `ax^2 + bx + c` selected by `eps` (-1 or +1).
/// Returns NaN when the discriminant is negative.
pub fn root(a: f64, b: f64, c: f64, eps: i32) -> f64 {
    if a == 0.0 && b == 0.0 {
        f64::NAN
    } else if a == 0.0 {
        -c / b
    } else {
        let sqb = sq(b);
        let ac = 4.0 * a * c;
        if almost_equals(sqb, ac) || sqb > ac {
            (-b + eps as f64 * sqrt_safe(sqb - ac)) / (2.0 * a)
        } else {
            f64::NAN
        }
    }
}

/// `root2b(a,b,c,eps) == root(a,2*b,c,eps)`, with one fewer rounding.
pub fn root2b(a: f64, b: f64, c: f64, eps: i32) -> f64 {
    if a == 0.0 && b == 0.0 {
        f64::NAN
    } else if a == 0.0 {
        -c / (2.0 * b)
    } else {
        let sqb = sq(b);
        let ac = a * c;
        if almost_equals(sqb, ac) || sqb > ac {
            (-b + eps as f64 * sqrt_safe(sqb - ac)) / a
        } else {
            f64::NAN
        }
    }
}

/// +1 for `x >= 0`, -1 otherwise. Not the mathematical signum: zero maps
/// to +1, which the detection formulas rely on.
#[inline]
pub fn sign(x: f64) -> i32 {
    if x >= 0.0 {
        1
    } else {
        -1
    }
}

/// ULP-based equality at the default tolerance.
pub fn almost_equals(a: f64, b: f64) -> bool {
    almost_equals_ulps(a, b, PRECISION_DEFAULT)
}

/// ULP-based equality with an explicit tolerance.
///
/// Two numbers within `max_ulps` units of least precision are treated as
/// equal. NaN compares unequal to everything, infinities only to
/// themselves (caught by the exact check). Comparisons against zero fall
/// back to an absolute bound matched to the tolerance tier.
pub fn almost_equals_ulps(a: f64, b: f64, max_ulps: u64) -> bool {
    if a == b {
        return true;
    }
    if a == 0.0 || b == 0.0 {
        let comp = match max_ulps {
            PRECISION5 => 1.0e-5,
            PRECISION7 => 1.0e-7,
            PRECISION9 => 1.0e-9,
            _ => 1.0e-13,
        };
        if a.abs() < comp && b.abs() < comp {
            return true;
        }
    }
    if !(a < b || b < a) {
        // NaN on either side
        return false;
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    let diff = lex_order(a).wrapping_sub(lex_order(b)).unsigned_abs();
    diff <= max_ulps
}

// Reinterpret the bit pattern so that consecutive doubles are
// consecutive integers, negatives included.
#[inline]
fn lex_order(x: f64) -> i64 {
    let bits = x.to_bits() as i64;
    if bits < 0 {
        i64::MIN.wrapping_sub(bits)
    } else {
        bits
    }
}

/// True iff `a < b` and they are not almost equal.
pub fn almost_less(a: f64, b: f64) -> bool {
    !almost_equals(a, b) && a < b
}

/// True iff `a > b` and they are not almost equal.
pub fn almost_greater(a: f64, b: f64) -> bool {
    !almost_equals(a, b) && a > b
}

pub fn almost_geq(a: f64, b: f64) -> bool {
    a >= b || almost_equals(a, b)
}

pub fn almost_leq(a: f64, b: f64) -> bool {
    a <= b || almost_equals(a, b)
}

/// Absolute-difference comparison. `epsilon` must be positive.
pub fn within_epsilon(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Modulo into `[0,mod)`. `mod` is required to be non-zero.
pub fn modulo(val: f64, modulus: f64) -> f64 {
    let n = (val / modulus).floor();
    let r = val - n * modulus;
    if almost_equals(r, modulus) {
        0.0
    } else {
        r
    }
}

/// Reduce an angle to `[0, 2pi)`.
pub fn to_2pi(rad: f64) -> f64 {
    modulo(rad, TWO_PI)
}

/// Reduce an angle to `(-pi, pi]`.
pub fn to_pi(rad: f64) -> f64 {
    let r = to_2pi(rad);
    if r > PI {
        r - TWO_PI
    } else {
        r
    }
}

/// Reduce an angle to `[-pi/2, pi/2)`, continuously.
pub fn to_pi2_cont(rad: f64) -> f64 {
    let r = to_pi(rad);
    if r < -PI / 2.0 {
        -PI - r
    } else if r < PI / 2.0 {
        r
    } else {
        PI - r
    }
}

/// True if the shortest turn from track `alpha` to track `beta` is
/// clockwise. Equal angles count as clockwise.
pub fn clockwise(alpha: f64, beta: f64) -> bool {
    let a = to_2pi(alpha);
    let b = to_2pi(beta);
    if (a - b).abs() <= PI {
        b >= a
    } else {
        a > b
    }
}

/// +1 if the minimal turn from `init_track` to `goal_track` is to the
/// right, -1 otherwise.
pub fn turn_dir(init_track: f64, goal_track: f64) -> i32 {
    if clockwise(init_track, goal_track) {
        1
    } else {
        -1
    }
}

/// Smallest angle between two tracks, in `[0, pi]`.
pub fn turn_delta(alpha: f64, beta: f64) -> f64 {
    let a = to_2pi(alpha);
    let b = to_2pi(beta);
    let delta = (a - b).abs();
    if delta <= PI {
        delta
    } else {
        TWO_PI - delta
    }
}

/// Angle between two tracks when forced to turn in direction `dir`
/// (+1 right, -1 left), in `[0, 2pi)`. Can exceed pi.
pub fn turn_delta_dir(alpha: f64, beta: f64, dir: i32) -> f64 {
    if almost_equals_ulps(to_2pi(alpha), to_2pi(beta), PRECISION7) {
        return 0.0;
    }
    let clk = clockwise(alpha, beta);
    let delta = turn_delta(alpha, beta);
    if (dir > 0) != clk {
        TWO_PI - delta
    } else {
        delta
    }
}

/// Smallest angle between two tracks in `[-pi, pi]`, positive clockwise.
pub fn signed_turn_delta(alpha: f64, beta: f64) -> f64 {
    turn_dir(alpha, beta) as f64 * turn_delta(alpha, beta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_almost_equals_near_one() {
        assert!(almost_equals(1.0, 1.0 + 1e-15));
        assert!(!almost_equals(1.0, 1.0 + 1e-10));
        assert!(almost_equals(0.0, 1e-14));
        assert!(!almost_equals(f64::NAN, f64::NAN));
        assert!(!almost_equals(f64::INFINITY, f64::MAX));
    }

    #[test]
    fn test_almost_equals_zero_special_case() {
        assert!(almost_equals(0.0, -1e-14));
        assert!(almost_equals(-1e-14, 0.0));
        assert!(!almost_equals(0.0, 1e-3));
        // tiny numbers of opposite sign are far apart in ulps
        assert!(!almost_equals(-1e-14, 1e-14));
    }

    #[test]
    fn test_root_selects_branch() {
        // x^2 - 3x + 2 = 0 -> roots 1 and 2
        assert_eq!(root(1.0, -3.0, 2.0, -1), 1.0);
        assert_eq!(root(1.0, -3.0, 2.0, 1), 2.0);
        assert!(root(1.0, 0.0, 1.0, 1).is_nan());
        // degenerate linear case
        assert_eq!(root(0.0, 2.0, -4.0, 1), 2.0);
    }

    #[test]
    fn test_root2b_matches_root() {
        let (a, b, c) = (2.0, -1.5, -3.0);
        for eps in [-1, 1] {
            let r1 = root(a, 2.0 * b, c, eps);
            let r2 = root2b(a, b, c, eps);
            assert!((r1 - r2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_angle_reduction() {
        assert!((to_2pi(-0.5) - (TWO_PI - 0.5)).abs() < 1e-12);
        assert!((to_pi(3.5 * PI) - (-0.5 * PI)).abs() < 1e-12);
        assert_eq!(to_2pi(TWO_PI), 0.0);
    }

    #[test]
    fn test_turn_delta_and_direction() {
        assert!((turn_delta(0.1, TWO_PI - 0.1) - 0.2).abs() < 1e-12);
        assert!(clockwise(0.0, 0.5));
        assert!(!clockwise(0.5, 0.0));
        assert_eq!(turn_dir(0.0, PI + 0.1), -1);
        // forced long way around
        assert!((turn_delta_dir(0.0, 0.5, -1) - (TWO_PI - 0.5)).abs() < 1e-12);
        assert!((signed_turn_delta(0.5, 0.0) + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_sign_of_zero() {
        assert_eq!(sign(0.0), 1);
        assert_eq!(sign(-0.0), 1);
        assert_eq!(sign(-1e-300), -1);
    }
}
