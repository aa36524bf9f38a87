//! Immutable 2-D, 3-D and 4-D Euclidean vectors.
//!
//! The x axis points east, y north, z up; compass tracks are measured
//! clockwise from north. Out-of-domain results are the all-NaN
//! `INVALID` sentinels, never panics.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vect2 {
    pub x: f64,
    pub y: f64,
}

impl Vect2 {
    pub const ZERO: Vect2 = Vect2 { x: 0.0, y: 0.0 };
    pub const INVALID: Vect2 = Vect2 {
        x: f64::NAN,
        y: f64::NAN,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Vect2 { x, y }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    pub fn is_invalid(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    pub fn dot(&self, v: Vect2) -> f64 {
        self.x * v.x + self.y * v.y
    }

    /// 2-D cross product (determinant).
    pub fn det(&self, v: Vect2) -> f64 {
        self.x * v.y - self.y * v.x
    }

    pub fn sqv(&self) -> f64 {
        self.dot(*self)
    }

    pub fn norm(&self) -> f64 {
        util::sqrt_safe(self.sqv())
    }

    /// Unit vector; zero vector for zero input.
    pub fn hat(&self) -> Vect2 {
        let n = self.norm();
        if n == 0.0 {
            Vect2::ZERO
        } else {
            Vect2::new(self.x / n, self.y / n)
        }
    }

    /// Left perpendicular `(-y, x)`.
    pub fn perp_l(&self) -> Vect2 {
        Vect2::new(-self.y, self.x)
    }

    /// Right perpendicular `(y, -x)`.
    pub fn perp_r(&self) -> Vect2 {
        Vect2::new(self.y, -self.x)
    }

    pub fn scal(&self, k: f64) -> Vect2 {
        Vect2::new(k * self.x, k * self.y)
    }

    /// `k * self + v`.
    pub fn scal_add(&self, k: f64, v: Vect2) -> Vect2 {
        Vect2::new(k * self.x + v.x, k * self.y + v.y)
    }

    /// `self + k * v`.
    pub fn add_scal(&self, k: f64, v: Vect2) -> Vect2 {
        Vect2::new(self.x + k * v.x, self.y + k * v.y)
    }

    /// Compass track angle of this vector.
    pub fn trk(&self) -> f64 {
        util::atan2_safe(self.x, self.y)
    }

    pub fn almost_equals(&self, v: Vect2) -> bool {
        util::almost_equals(self.x, v.x) && util::almost_equals(self.y, v.y)
    }
}

impl Add for Vect2 {
    type Output = Vect2;
    fn add(self, v: Vect2) -> Vect2 {
        Vect2::new(self.x + v.x, self.y + v.y)
    }
}

impl Sub for Vect2 {
    type Output = Vect2;
    fn sub(self, v: Vect2) -> Vect2 {
        Vect2::new(self.x - v.x, self.y - v.y)
    }
}

impl Neg for Vect2 {
    type Output = Vect2;
    fn neg(self) -> Vect2 {
        Vect2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vect2 {
    type Output = Vect2;
    fn mul(self, k: f64) -> Vect2 {
        self.scal(k)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vect3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vect3 {
    pub const ZERO: Vect3 = Vect3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const INVALID: Vect3 = Vect3 {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vect3 { x, y, z }
    }

    pub fn from_vect2(v: Vect2, z: f64) -> Self {
        Vect3::new(v.x, v.y, z)
    }

    pub fn vect2(&self) -> Vect2 {
        Vect2::new(self.x, self.y)
    }

    pub fn mk_x(&self, nx: f64) -> Vect3 {
        Vect3::new(nx, self.y, self.z)
    }

    pub fn mk_y(&self, ny: f64) -> Vect3 {
        Vect3::new(self.x, ny, self.z)
    }

    pub fn mk_z(&self, nz: f64) -> Vect3 {
        Vect3::new(self.x, self.y, nz)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn is_invalid(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    pub fn dot(&self, v: Vect3) -> f64 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn sqv(&self) -> f64 {
        self.dot(*self)
    }

    pub fn norm(&self) -> f64 {
        util::sqrt_safe(self.sqv())
    }

    pub fn sqv2d(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn norm2d(&self) -> f64 {
        util::sqrt_safe(self.sqv2d())
    }

    pub fn dot2d(&self, v: Vect3) -> f64 {
        self.x * v.x + self.y * v.y
    }

    pub fn det2d(&self, v: Vect3) -> f64 {
        self.x * v.y - self.y * v.x
    }

    pub fn cross(&self, v: Vect3) -> Vect3 {
        Vect3::new(
            self.y * v.z - self.z * v.y,
            self.z * v.x - self.x * v.z,
            self.x * v.y - self.y * v.x,
        )
    }

    /// Unit vector; zero vector for zero input.
    pub fn hat(&self) -> Vect3 {
        let n = self.norm();
        if n == 0.0 {
            Vect3::ZERO
        } else {
            Vect3::new(self.x / n, self.y / n, self.z / n)
        }
    }

    pub fn scal(&self, k: f64) -> Vect3 {
        Vect3::new(k * self.x, k * self.y, k * self.z)
    }

    /// `k * self + v`.
    pub fn scal_add(&self, k: f64, v: Vect3) -> Vect3 {
        Vect3::new(k * self.x + v.x, k * self.y + v.y, k * self.z + v.z)
    }

    /// `self + k * v`.
    pub fn add_scal(&self, k: f64, v: Vect3) -> Vect3 {
        Vect3::new(self.x + k * v.x, self.y + k * v.y, self.z + k * v.z)
    }

    /// Linear extrapolation `self + v*t`.
    pub fn linear(&self, v: Vect3, t: f64) -> Vect3 {
        self.add_scal(t, v)
    }

    /// Advance distance `d` along compass track `track`, altitude kept.
    pub fn linear_by_dist_2d(&self, track: f64, d: f64) -> Vect3 {
        Vect3::new(self.x + d * track.sin(), self.y + d * track.cos(), self.z)
    }

    /// Horizontal distance to `w`.
    pub fn distance_h(&self, w: Vect3) -> f64 {
        (*self - w).norm2d()
    }

    /// Vertical distance to `w`.
    pub fn distance_v(&self, w: Vect3) -> f64 {
        (self.z - w.z).abs()
    }

    /// Cylindrical norm against a cylinder of radius `d` and half-height
    /// `h`: < 1 inside, 1 on the boundary, > 1 outside.
    pub fn cyl_norm(&self, d: f64, h: f64) -> f64 {
        f64::max(self.sqv2d() / util::sq(d), util::sq(self.z / h))
    }

    pub fn almost_equals(&self, v: Vect3) -> bool {
        util::almost_equals(self.x, v.x)
            && util::almost_equals(self.y, v.y)
            && util::almost_equals(self.z, v.z)
    }

    /// 3-D time of closest point of approach; 0 when the velocities are
    /// parallel or the approach lies in the past.
    pub fn tcpa(so: Vect3, vo: Vect3, si: Vect3, vi: Vect3) -> f64 {
        let s = so - si;
        let v = vo - vi;
        let nv = v.sqv();
        if nv > 0.0 {
            f64::max(0.0, -s.dot(v) / nv)
        } else {
            0.0
        }
    }

    /// 3-D distance at closest point of approach.
    pub fn dcpa(so: Vect3, vo: Vect3, si: Vect3, vi: Vect3) -> f64 {
        let t = Vect3::tcpa(so, vo, si, vi);
        let s = so - si;
        let v = vo - vi;
        s.add_scal(t, v).norm()
    }
}

impl Add for Vect3 {
    type Output = Vect3;
    fn add(self, v: Vect3) -> Vect3 {
        Vect3::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Vect3 {
    type Output = Vect3;
    fn sub(self, v: Vect3) -> Vect3 {
        Vect3::new(self.x - v.x, self.y - v.y, self.z - v.z)
    }
}

impl Neg for Vect3 {
    type Output = Vect3;
    fn neg(self) -> Vect3 {
        Vect3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Vect3 {
    type Output = Vect3;
    fn mul(self, k: f64) -> Vect3 {
        self.scal(k)
    }
}

/// A 3-D point paired with a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vect4 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub t: f64,
}

impl Vect4 {
    pub const ZERO: Vect4 = Vect4 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        t: 0.0,
    };
    pub const INVALID: Vect4 = Vect4 {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
        t: f64::NAN,
    };

    pub fn new(x: f64, y: f64, z: f64, t: f64) -> Self {
        Vect4 { x, y, z, t }
    }

    pub fn from_vect3(v: Vect3, t: f64) -> Self {
        Vect4::new(v.x, v.y, v.z, t)
    }

    pub fn vect3(&self) -> Vect3 {
        Vect3::new(self.x, self.y, self.z)
    }

    pub fn vect2(&self) -> Vect2 {
        Vect2::new(self.x, self.y)
    }

    pub fn is_invalid(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan() || self.t.is_nan()
    }

    pub fn norm3d(&self) -> f64 {
        self.vect3().norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hat_of_zero_is_zero() {
        assert_eq!(Vect2::ZERO.hat(), Vect2::ZERO);
        assert_eq!(Vect3::ZERO.hat(), Vect3::ZERO);
        assert_relative_eq!(Vect3::new(3.0, 4.0, 0.0).hat().norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_perp() {
        let v = Vect2::new(1.0, 2.0);
        assert_eq!(v.perp_l(), Vect2::new(-2.0, 1.0));
        assert_eq!(v.perp_r(), Vect2::new(2.0, -1.0));
        assert_eq!(v.dot(v.perp_l()), 0.0);
    }

    #[test]
    fn test_linear_by_dist_2d() {
        // due east by 100 m
        let p = Vect3::ZERO.linear_by_dist_2d(std::f64::consts::FRAC_PI_2, 100.0);
        assert_relative_eq!(p.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cyl_norm_boundary() {
        let inside = Vect3::new(100.0, 0.0, 10.0);
        assert!(inside.cyl_norm(200.0, 50.0) < 1.0);
        let outside = Vect3::new(300.0, 0.0, 10.0);
        assert!(outside.cyl_norm(200.0, 50.0) > 1.0);
    }

    #[test]
    fn test_tcpa_non_negative_and_zero_for_parallel() {
        let so = Vect3::ZERO;
        let si = Vect3::new(1000.0, 0.0, 0.0);
        let v = Vect3::new(50.0, 0.0, 0.0);
        assert_eq!(Vect3::tcpa(so, v, si, v), 0.0);
        // receding traffic clamps to zero
        assert_eq!(Vect3::tcpa(so, -v, si, v), 0.0);
        // head-on closes at t = 10
        let t = Vect3::tcpa(so, v, si, -v);
        assert_relative_eq!(t, 10.0, epsilon = 1e-12);
        assert_relative_eq!(Vect3::dcpa(so, v, si, -v), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_propagates() {
        assert!(Vect3::INVALID.is_invalid());
        assert!((Vect3::INVALID + Vect3::ZERO).is_invalid());
        assert!(Vect4::INVALID.is_invalid());
    }
}
