//! Horizontal encounter geometry on relative state.
//!
//! `s` is the relative horizontal position (ownship minus intruder) and
//! `v` the relative horizontal velocity.

use daa_kinematics::util;
use daa_kinematics::Vect2;

/// Time of horizontal closest point of approach; NaN for a zero
/// relative velocity.
pub fn tcpa(s: Vect2, v: Vect2) -> f64 {
    if !v.is_zero() {
        -s.dot(v) / v.sqv()
    } else {
        f64::NAN
    }
}

/// Distance at horizontal closest point of approach.
pub fn dcpa(s: Vect2, v: Vect2) -> f64 {
    v.scal_add(tcpa(s, v), s).norm()
}

/// Horizontal miss distance within lookahead time `t`.
pub fn hmd(s: Vect2, v: Vect2, t: f64) -> f64 {
    let tau = if s.dot(v) < 0.0 {
        // horizontally converging
        f64::min(tcpa(s, v), t)
    } else {
        0.0
    };
    v.scal_add(tau, s).norm()
}

/// Discriminant-like quantity for the circle crossing: non-negative iff
/// the relative track crosses (or touches) the circle of radius `d`.
pub fn delta(s: Vect2, v: Vect2, d: f64) -> f64 {
    util::sq(d) * v.sqv() - util::sq(s.det(v))
}

/// Time at which `|s + v t| = d`; `eps = -1` selects the entry side and
/// `eps = 1` the exit side. NaN when the track never meets the circle.
pub fn theta_d(s: Vect2, v: Vect2, eps: i32, d: f64) -> f64 {
    let a = v.sqv();
    let b = s.dot(v);
    let c = s.sqv() - util::sq(d);
    util::root2b(a, b, c, eps)
}

/// Strictly inside the circle of radius `d`, with the boundary itself
/// excluded up to ULP tolerance.
pub fn almost_horizontal_los(s: Vect2, d: f64) -> bool {
    let sqs = s.sqv();
    let sqd = util::sq(d);
    !util::almost_equals(sqs, sqd) && sqs < sqd
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tcpa_head_on() {
        let s = Vect2::new(-1000.0, 0.0);
        let v = Vect2::new(100.0, 0.0);
        assert_relative_eq!(tcpa(s, v), 10.0, epsilon = 1e-12);
        assert_relative_eq!(dcpa(s, v), 0.0, epsilon = 1e-9);
        assert!(tcpa(s, Vect2::ZERO).is_nan());
    }

    #[test]
    fn test_theta_d_symmetric_crossing() {
        // crossing a 500 m circle dead center at 100 m/s
        let s = Vect2::new(-1000.0, 0.0);
        let v = Vect2::new(100.0, 0.0);
        let entry = theta_d(s, v, -1, 500.0);
        let exit = theta_d(s, v, 1, 500.0);
        assert_relative_eq!(entry, 5.0, epsilon = 1e-9);
        assert_relative_eq!(exit, 15.0, epsilon = 1e-9);
        assert!(delta(s, v, 500.0) > 0.0);
    }

    #[test]
    fn test_delta_sign_tracks_miss_distance() {
        let v = Vect2::new(100.0, 0.0);
        // passes 400 m abeam of a 500 m circle: crossing
        assert!(delta(Vect2::new(-1000.0, 400.0), v, 500.0) > 0.0);
        // passes 600 m abeam: miss
        assert!(delta(Vect2::new(-1000.0, 600.0), v, 500.0) < 0.0);
        assert!(theta_d(Vect2::new(-1000.0, 600.0), v, -1, 500.0).is_nan());
    }

    #[test]
    fn test_hmd_converging_vs_diverging() {
        let v = Vect2::new(100.0, 0.0);
        let s = Vect2::new(-1000.0, 300.0);
        assert_relative_eq!(hmd(s, v, 20.0), 300.0, epsilon = 1e-9);
        // diverging: miss distance is the current separation
        let s_div = Vect2::new(1000.0, 300.0);
        assert_relative_eq!(hmd(s_div, v, 20.0), s_div.norm(), epsilon = 1e-9);
    }

    #[test]
    fn test_almost_horizontal_los_boundary() {
        assert!(almost_horizontal_los(Vect2::new(400.0, 0.0), 500.0));
        assert!(!almost_horizontal_los(Vect2::new(500.0, 0.0), 500.0));
        assert!(!almost_horizontal_los(Vect2::new(600.0, 0.0), 500.0));
    }
}
