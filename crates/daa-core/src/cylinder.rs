//! Cylindrical conflict detection.
//!
//! The classic protected zone: loss of separation iff the horizontal
//! distance is below `D` and the vertical distance below `H`. Conflict
//! detection solves the circle and slab crossings in closed form; the
//! critical time is the minimum of the cylindrical norm over the
//! window.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use daa_kinematics::units;
use daa_kinematics::util;
use daa_kinematics::{LossData, Vect3, Velocity};

use crate::detector::ConflictData;
use crate::horizontal;
use crate::vertical;

/// Cylinder of radius `d` and half-height `h`, in internal units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CdCylinder {
    d: f64,
    h: f64,
    units: BTreeMap<String, String>,
    id: String,
}

impl Default for CdCylinder {
    /// CD3D thresholds, D=5nmi and H=1000ft.
    fn default() -> Self {
        CdCylinder::make(5.0, "nmi", 1000.0, "ft")
    }
}

impl CdCylinder {
    /// Cylinder from internal (SI) values.
    pub fn new(d: f64, h: f64) -> Self {
        CdCylinder::make(d, "m", h, "m")
    }

    /// Cylinder from values in explicit units.
    pub fn make(d: f64, dunit: &str, h: f64, hunit: &str) -> Self {
        let mut units = BTreeMap::new();
        units.insert("D".to_string(), dunit.to_string());
        units.insert("H".to_string(), hunit.to_string());
        CdCylinder {
            d: units::from(dunit, d.abs()),
            h: units::from(hunit, h.abs()),
            units,
            id: String::new(),
        }
    }

    pub fn horizontal_separation(&self) -> f64 {
        self.d
    }

    pub fn vertical_separation(&self) -> f64 {
        self.h
    }

    pub fn unit(&self, key: &str) -> &str {
        self.units.get(key).map(String::as_str).unwrap_or("unspecified")
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn set_identifier(&mut self, id: &str) {
        self.id = id.to_string();
    }

    /// Instantaneous loss of separation on the relative state.
    pub fn los(s: Vect3, d: f64, h: f64) -> bool {
        s.vect2().sqv() < util::sq(d) && s.z.abs() < h
    }

    /// Conflict time interval in `[b, t]` on the relative state, with
    /// closed-form circle and slab crossings.
    pub fn detection(s: Vect3, vo: Vect3, vi: Vect3, d: f64, h: f64, b: f64, t: f64) -> LossData {
        let mut t_in = t + 1.0;
        let mut t_out = b;
        if b >= 0.0 && b < t {
            let s2 = s.vect2();
            let vo2 = vo.vect2();
            let vi2 = vi.vect2();
            let vz = vo.z - vi.z;
            if vo2.almost_equals(vi2) && horizontal::almost_horizontal_los(s2, d) {
                if !util::almost_equals(vo.z, vi.z) {
                    t_in = f64::min(f64::max(vertical::theta_h(s.z, vz, -1, h), b), t);
                    t_out = f64::max(f64::min(vertical::theta_h(s.z, vz, 1, h), t), b);
                } else if vertical::almost_vertical_los(s.z, h) {
                    t_in = b;
                    t_out = t;
                }
            } else {
                let v2 = vo2 - vi2;
                if horizontal::delta(s2, v2, d) > 0.0 {
                    let td1 = horizontal::theta_d(s2, v2, -1, d);
                    let td2 = horizontal::theta_d(s2, v2, 1, d);
                    if !util::almost_equals(vo.z, vi.z) {
                        let tin = f64::max(td1, vertical::theta_h(s.z, vz, -1, h));
                        let tout = f64::min(td2, vertical::theta_h(s.z, vz, 1, h));
                        t_in = f64::min(f64::max(tin, b), t);
                        t_out = f64::max(f64::min(tout, t), b);
                    } else if vertical::almost_vertical_los(s.z, h) {
                        t_in = f64::min(f64::max(td1, b), t);
                        t_out = f64::max(f64::min(td2, t), b);
                    }
                }
            }
        }
        LossData::new(t_in, t_out)
    }

    /// Time of cylindrical closest approach on `[0, inf)`: the minimum
    /// of the cylindrical norm over the candidate critical points.
    pub fn tccpa(s: Vect3, vo: Vect3, vi: Vect3, d: f64, h: f64) -> f64 {
        let v = vo - vi;
        let s2 = s.vect2();
        let vo2 = vo.vect2();
        let vi2 = vi.vect2();
        let v2 = v.vect2();
        let mut mint = 0.0;
        let mut mind = s.cyl_norm(d, h);
        if !vo2.almost_equals(vi2) {
            let t = -s2.dot(v2) / v2.sqv();
            if t > 0.0 {
                let dist = v.scal_add(t, s).cyl_norm(d, h);
                if dist < mind {
                    mint = t;
                    mind = dist;
                }
            }
        }
        if !util::almost_equals(vo.z, vi.z) {
            let t = -s.z / v.z;
            if t > 0.0 {
                let dist = v.scal_add(t, s).cyl_norm(d, h);
                if dist < mind {
                    mint = t;
                    mind = dist;
                }
            }
        }
        // stationary points of the cylindrical norm itself
        let a = v2.sqv() / util::sq(d) - util::sq(v.z / h);
        let b = s2.dot(v2) / util::sq(d) - (s.z * v.z) / util::sq(h);
        let c = s2.sqv() / util::sq(d) - util::sq(s.z / h);
        for eps in [-1, 1] {
            let t = util::root2b(a, b, c, eps);
            if !t.is_nan() && t > 0.0 {
                let dist = v.scal_add(t, s).cyl_norm(d, h);
                if dist < mind {
                    mint = t;
                    mind = dist;
                }
            }
        }
        mint
    }

    /// Time of cylindrical closest approach clamped to `[b, t]`.
    pub fn tccpa_in(s: Vect3, vo: Vect3, vi: Vect3, d: f64, h: f64, b: f64, t: f64) -> f64 {
        f64::min(f64::max(b, CdCylinder::tccpa(s, vo, vi, d, h)), t)
    }

    /// Conflict data on `[b, t]`.
    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let s = so - si;
        let v = vo.sub(vi.vect3());
        let t_tca = CdCylinder::tccpa_in(s, vo.vect3(), vi.vect3(), self.d, self.h, b, t);
        let dist_tca = s.linear(v.vect3(), t_tca).cyl_norm(self.d, self.h);
        let ld = CdCylinder::detection(s, vo.vect3(), vi.vect3(), self.d, self.h, b, t);
        ConflictData::from_loss(ld, t_tca, dist_tca, s, v)
    }

    /// Instantaneous violation.
    pub fn violation(&self, so: Vect3, si: Vect3) -> bool {
        CdCylinder::los(so - si, self.d, self.h)
    }

    /// Containment over cylinder dimensions.
    pub fn contains(&self, other: &CdCylinder) -> bool {
        self.d >= other.d && self.h >= other.h
    }

    pub fn update_parameter_data(&self, p: &mut crate::parameters::ParameterData) {
        p.set_internal("D", self.d, self.unit("D"));
        p.set_internal("H", self.h, self.unit("H"));
    }

    pub fn set_parameters(&mut self, p: &crate::parameters::ParameterData) {
        if p.contains("D") {
            self.d = p.get_value("D").abs();
            self.units.insert("D".into(), p.unit("D").into());
        }
        if p.contains("H") {
            self.h = p.get_value("H").abs();
            self.units.insert("H".into(), p.unit("H").into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_head_on_co_altitude() {
        // S1: 5 nmi apart, 200 m/s closure, already co-altitude
        let cyl = CdCylinder::new(1852.0 * 5.0, 305.0);
        let so = Vect3::ZERO;
        let vo = Velocity::mk_vxyz(100.0, 0.0, 0.0);
        let si = Vect3::new(1852.0 * 5.0, 0.0, 0.0);
        let vi = Velocity::mk_vxyz(-100.0, 0.0, 0.0);
        let cd = cyl.conflict_detection(so, vo, si, vi, 0.0, 120.0);
        assert!(cd.conflict());
        assert_relative_eq!(cd.time_in, 0.0, epsilon = 1e-9);
        assert!(cd.time_out > 0.0);
        assert_relative_eq!(cd.time_out, 92.6, epsilon = 1e-6);
    }

    #[test]
    fn test_parallel_separated_no_conflict() {
        // S2: co-speed parallel tracks 4 km apart
        let cyl = CdCylinder::new(3000.0, 305.0);
        let so = Vect3::ZERO;
        let v = Velocity::mk_vxyz(100.0, 0.0, 0.0);
        let si = Vect3::new(0.0, 4000.0, 0.0);
        let cd = cyl.conflict_detection(so, v, si, v, 0.0, 300.0);
        assert!(!cd.conflict());
        assert!(cd.time_in > cd.time_out);
    }

    #[test]
    fn test_violation_boundary_is_open() {
        let cyl = CdCylinder::new(1000.0, 100.0);
        let so = Vect3::ZERO;
        assert!(cyl.violation(so, Vect3::new(999.0, 0.0, 0.0)));
        assert!(!cyl.violation(so, Vect3::new(1000.0, 0.0, 0.0)));
        assert!(!cyl.violation(so, Vect3::new(500.0, 0.0, 100.0)));
    }

    #[test]
    fn test_vertical_gating() {
        // crosses horizontally but stays 500 m above: no conflict
        let cyl = CdCylinder::new(2000.0, 300.0);
        let so = Vect3::new(0.0, 0.0, 500.0);
        let vo = Velocity::mk_vxyz(100.0, 0.0, 0.0);
        let si = Vect3::new(10000.0, 0.0, 0.0);
        let vi = Velocity::mk_vxyz(-100.0, 0.0, 0.0);
        let cd = cyl.conflict_detection(so, vo, si, vi, 0.0, 300.0);
        assert!(!cd.conflict());
        // descending through the slab picks up the vertical gate
        let vo_desc = Velocity::mk_vxyz(100.0, 0.0, -5.0);
        let cd2 = cyl.conflict_detection(so, vo_desc, si, vi, 0.0, 300.0);
        assert!(cd2.conflict());
    }

    #[test]
    fn test_tccpa_midpoint_for_symmetric_pass() {
        let d = 1000.0;
        let h = 300.0;
        let s = Vect3::new(-5000.0, 400.0, 0.0);
        let vo = Vect3::new(100.0, 0.0, 0.0);
        let vi = Vect3::ZERO;
        let t = CdCylinder::tccpa(s, vo, vi, d, h);
        // closest horizontal approach at x = 0: t = 50
        assert_relative_eq!(t, 50.0, epsilon = 1e-6);
        let clamped = CdCylinder::tccpa_in(s, vo, vi, d, h, 0.0, 30.0);
        assert_relative_eq!(clamped, 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_containment() {
        let big = CdCylinder::new(2000.0, 400.0);
        let small = CdCylinder::new(1000.0, 300.0);
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
    }

    #[test]
    fn test_parameter_round_trip() {
        let cyl = CdCylinder::default();
        let mut p = crate::parameters::ParameterData::new();
        cyl.update_parameter_data(&mut p);
        let mut restored = CdCylinder::new(0.0, 0.0);
        restored.set_parameters(&p);
        assert_eq!(restored.horizontal_separation(), cyl.horizontal_separation());
        assert_eq!(restored.vertical_separation(), cyl.vertical_separation());
        assert_eq!(restored.unit("D"), "nmi");
    }
}
