//! Vertical encounter geometry on relative altitude and vertical rate.

use daa_kinematics::util;

/// Time at which the relative altitude crosses the slab of half-height
/// `h`; `eps = -1` entry, `eps = 1` exit. NaN when `vz == 0`.
pub fn theta_h(sz: f64, vz: f64, eps: i32, h: f64) -> f64 {
    if vz == 0.0 {
        return f64::NAN;
    }
    (eps as f64 * util::sign(vz) as f64 * h - sz) / vz
}

/// Time to co-altitude. Zero when already co-altitude, NaN when there
/// is no vertical closure.
pub fn time_coalt(sz: f64, vz: f64) -> f64 {
    if sz == 0.0 {
        return 0.0;
    }
    if vz == 0.0 {
        return f64::NAN;
    }
    -sz / vz
}

/// Vertical miss distance within lookahead time `t`.
pub fn vmd(sz: f64, vz: f64, t: f64) -> f64 {
    if sz * vz < 0.0 {
        // vertically converging
        if time_coalt(sz, vz) <= t {
            return 0.0;
        }
        return (sz + t * vz).abs();
    }
    sz.abs()
}

/// Strictly inside the slab of half-height `h`, boundary excluded up to
/// ULP tolerance.
pub fn almost_vertical_los(sz: f64, h: f64) -> bool {
    let absz = sz.abs();
    !util::almost_equals(absz, h) && absz < h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_theta_h() {
        // 300 m above, descending at 10 m/s, slab of 100 m
        assert_relative_eq!(theta_h(300.0, -10.0, -1, 100.0), 20.0, epsilon = 1e-12);
        assert_relative_eq!(theta_h(300.0, -10.0, 1, 100.0), 40.0, epsilon = 1e-12);
        assert!(theta_h(300.0, 0.0, -1, 100.0).is_nan());
    }

    #[test]
    fn test_time_coalt() {
        assert_relative_eq!(time_coalt(-300.0, 10.0), 30.0, epsilon = 1e-12);
        assert_eq!(time_coalt(0.0, 5.0), 0.0);
        assert!(time_coalt(100.0, 0.0).is_nan());
        // diverging gives a negative time
        assert!(time_coalt(100.0, 10.0) < 0.0);
    }

    #[test]
    fn test_vmd() {
        // converging and reaching co-altitude inside the window
        assert_eq!(vmd(-300.0, 10.0, 60.0), 0.0);
        // converging but not reaching it
        assert_relative_eq!(vmd(-300.0, 10.0, 20.0), 100.0, epsilon = 1e-12);
        // diverging
        assert_relative_eq!(vmd(300.0, 10.0, 20.0), 300.0, epsilon = 1e-12);
    }
}
