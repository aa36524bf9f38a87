//! Time-modulated well-clear volumes.
//!
//! A well-clear volume pairs a horizontal predicate built on a
//! time-variable tau (modified tau, time to closest approach, or time
//! to entry point) with a vertical predicate (time to co-altitude or a
//! fixed modulated height band), both driven by a four-threshold table.
//! Detection returns the tight loss sub-interval inside a look-ahead
//! window `[B,T]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use daa_kinematics::units;
use daa_kinematics::util;
use daa_kinematics::{Interval, LossData, Vect2, Vect3, Velocity};

use crate::detector::ConflictData;
use crate::horizontal;
use crate::vertical;

/// The four well-clear thresholds, kept in internal (SI) units with the
/// unit tags they were supplied in. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WcvTable {
    dthr: f64,
    zthr: f64,
    tthr: f64,
    tcoa: f64,
    units: BTreeMap<String, String>,
}

impl Default for WcvTable {
    /// DWC standard thresholds in RTCA DO-365.
    fn default() -> Self {
        WcvTable::make(0.66, "nmi", 450.0, "ft", 35.0, "s", 0.0, "s")
    }
}

impl WcvTable {
    /// Table from internal (SI) values.
    pub fn new(dthr: f64, zthr: f64, tthr: f64, tcoa: f64) -> Self {
        let mut units = BTreeMap::new();
        units.insert("WCV_DTHR".to_string(), "m".to_string());
        units.insert("WCV_ZTHR".to_string(), "m".to_string());
        units.insert("WCV_TTHR".to_string(), "s".to_string());
        units.insert("WCV_TCOA".to_string(), "s".to_string());
        WcvTable {
            dthr: dthr.abs(),
            zthr: zthr.abs(),
            tthr: tthr.abs(),
            tcoa: tcoa.abs(),
            units,
        }
    }

    /// Table from values in explicit units.
    #[allow(clippy::too_many_arguments)]
    pub fn make(
        dthr: f64,
        udthr: &str,
        zthr: f64,
        uzthr: &str,
        tthr: f64,
        utthr: &str,
        tcoa: f64,
        utcoa: &str,
    ) -> Self {
        let mut units = BTreeMap::new();
        units.insert("WCV_DTHR".to_string(), udthr.to_string());
        units.insert("WCV_ZTHR".to_string(), uzthr.to_string());
        units.insert("WCV_TTHR".to_string(), utthr.to_string());
        units.insert("WCV_TCOA".to_string(), utcoa.to_string());
        WcvTable {
            dthr: units::from(udthr, dthr.abs()),
            zthr: units::from(uzthr, zthr.abs()),
            tthr: units::from(utthr, tthr.abs()),
            tcoa: units::from(utcoa, tcoa.abs()),
            units,
        }
    }

    /// DO-365 preventive thresholds Phase I: DTHR=0.66nmi, ZTHR=700ft,
    /// TTHR=35s, TCOA=0.
    pub fn do_365_phase_i_preventive() -> Self {
        WcvTable::make(0.66, "nmi", 700.0, "ft", 35.0, "s", 0.0, "s")
    }

    /// DO-365 Well-Clear thresholds Phase I: DTHR=0.66nmi, ZTHR=450ft,
    /// TTHR=35s, TCOA=0.
    pub fn do_365_dwc_phase_i() -> Self {
        WcvTable::default()
    }

    /// DO-365 Well-Clear thresholds Phase II (DTA): DTHR=1500ft,
    /// ZTHR=450ft, TTHR=0, TCOA=0.
    pub fn do_365_dwc_phase_ii() -> Self {
        WcvTable::make(1500.0, "ft", 450.0, "ft", 0.0, "s", 0.0, "s")
    }

    /// DO-365 Well-Clear thresholds Non-Cooperative: DTHR=2200ft,
    /// ZTHR=450ft, TTHR=0, TCOA=0.
    pub fn do_365_dwc_non_coop() -> Self {
        WcvTable::make(2200.0, "ft", 450.0, "ft", 0.0, "s", 0.0, "s")
    }

    /// Buffered preventive thresholds: DTHR=1nmi, ZTHR=750ft, TTHR=35s,
    /// TCOA=20s.
    pub fn buffered_phase_i_preventive() -> Self {
        WcvTable::make(1.0, "nmi", 750.0, "ft", 35.0, "s", 20.0, "s")
    }

    /// Buffered Well-Clear thresholds: DTHR=1nmi, ZTHR=450ft, TTHR=35s,
    /// TCOA=20s.
    pub fn buffered_dwc_phase_i() -> Self {
        WcvTable::make(1.0, "nmi", 450.0, "ft", 35.0, "s", 20.0, "s")
    }

    pub fn dthr(&self) -> f64 {
        self.dthr
    }

    pub fn zthr(&self) -> f64 {
        self.zthr
    }

    pub fn tthr(&self) -> f64 {
        self.tthr
    }

    pub fn tcoa(&self) -> f64 {
        self.tcoa
    }

    pub fn unit(&self, key: &str) -> &str {
        self.units.get(key).map(String::as_str).unwrap_or("unspecified")
    }

    /// Partial order on tables: `self` contains `other` iff every
    /// threshold of `self` is at least the corresponding one of `other`.
    pub fn contains(&self, other: &WcvTable) -> bool {
        self.dthr >= other.dthr
            && self.zthr >= other.zthr
            && self.tthr >= other.tthr
            && self.tcoa >= other.tcoa
    }

    pub fn update_parameter_data(&self, p: &mut crate::parameters::ParameterData) {
        p.set_internal("WCV_DTHR", self.dthr, self.unit("WCV_DTHR"));
        p.set_internal("WCV_ZTHR", self.zthr, self.unit("WCV_ZTHR"));
        p.set_internal("WCV_TTHR", self.tthr, self.unit("WCV_TTHR"));
        p.set_internal("WCV_TCOA", self.tcoa, self.unit("WCV_TCOA"));
    }

    pub fn set_parameters(&mut self, p: &crate::parameters::ParameterData) {
        if p.contains("WCV_DTHR") {
            self.dthr = p.get_value("WCV_DTHR").abs();
            self.units
                .insert("WCV_DTHR".into(), p.unit("WCV_DTHR").into());
        }
        if p.contains("WCV_ZTHR") {
            self.zthr = p.get_value("WCV_ZTHR").abs();
            self.units
                .insert("WCV_ZTHR".into(), p.unit("WCV_ZTHR").into());
        }
        if p.contains("WCV_TTHR") {
            self.tthr = p.get_value("WCV_TTHR").abs();
            self.units
                .insert("WCV_TTHR".into(), p.unit("WCV_TTHR").into());
        }
        if p.contains("WCV_TCOA") {
            self.tcoa = p.get_value("WCV_TCOA").abs();
            self.units
                .insert("WCV_TCOA".into(), p.unit("WCV_TCOA").into());
        }
    }
}

/// Vertical well-clear model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalWcv {
    /// Time-to-co-altitude: in loss when inside ZTHR or converging to
    /// co-altitude within TCOA seconds.
    Tcoa,
    /// Modulated height band: ZTHR grown by the vertical closure rate
    /// over the time threshold.
    Vmod,
}

impl VerticalWcv {
    /// Instantaneous vertical violation. `tstar` is TCOA for [`Tcoa`]
    /// and TTHR for [`Vmod`].
    pub fn violation(&self, zthr: f64, tstar: f64, sz: f64, vz: f64) -> bool {
        match self {
            VerticalWcv::Tcoa => {
                sz.abs() <= zthr
                    || (vz != 0.0 && sz * vz <= 0.0 && vertical::time_coalt(sz, vz) <= tstar)
            }
            VerticalWcv::Vmod => {
                sz.abs() <= zthr
                    || (!util::almost_equals(vz, 0.0)
                        && sz * vz <= 0.0
                        && sz.abs() <= zthr + vz.abs() * tstar)
            }
        }
    }

    /// Vertical loss interval clipped to `[b, t]`; empty encoded as
    /// `low > up`.
    pub fn interval(&self, zthr: f64, tstar: f64, b: f64, t: f64, sz: f64, vz: f64) -> Interval {
        if util::almost_equals(vz, 0.0) {
            return if sz.abs() <= zthr {
                Interval::new(b, t)
            } else {
                Interval::new(t, b)
            };
        }
        let act_h = match self {
            VerticalWcv::Tcoa => f64::max(zthr, vz.abs() * tstar),
            VerticalWcv::Vmod => f64::max(
                zthr,
                zthr - util::sign(sz * vz) as f64 * vz.abs() * tstar,
            ),
        };
        let tentry = vertical::theta_h(sz, vz, -1, act_h);
        let texit = vertical::theta_h(sz, vz, 1, zthr);
        if t < tentry || texit < b {
            return Interval::new(t, b);
        }
        Interval::new(f64::max(b, tentry), f64::min(t, texit))
    }
}

/// Horizontal well-clear time variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalWcv {
    /// Modified tau, `(DTHR^2 - |s|^2) / (s.v)` for converging geometry.
    TauMod,
    /// Time to horizontal closest point of approach.
    Tcpa,
    /// Time to entry point of the DTHR circle.
    Tep,
    /// Modified tau paired with the VMOD vertical model.
    Hz,
}

impl HorizontalWcv {
    /// The variant's time variable; negative when not converging.
    pub fn tvar(&self, table: &WcvTable, s: Vect2, v: Vect2) -> f64 {
        match self {
            HorizontalWcv::TauMod | HorizontalWcv::Hz => {
                let sdotv = s.dot(v);
                if sdotv < 0.0 {
                    (util::sq(table.dthr()) - s.sqv()) / sdotv
                } else {
                    -1.0
                }
            }
            HorizontalWcv::Tcpa => horizontal::tcpa(s, v),
            HorizontalWcv::Tep => {
                let sdotv = s.dot(v);
                if sdotv < 0.0 && horizontal::delta(s, v, table.dthr()) >= 0.0 {
                    horizontal::theta_d(s, v, -1, table.dthr())
                } else {
                    -1.0
                }
            }
        }
    }

    /// Instantaneous horizontal violation.
    pub fn violation(&self, table: &WcvTable, s: Vect2, v: Vect2) -> bool {
        if s.norm() <= table.dthr() {
            return true;
        }
        if horizontal::dcpa(s, v) <= table.dthr() {
            let tvar = self.tvar(table, s, v);
            return 0.0 <= tvar && tvar <= table.tthr();
        }
        false
    }

    /// Horizontal loss interval on the window `[0, t]`.
    pub fn interval(&self, table: &WcvTable, t: f64, s: Vect2, v: Vect2) -> LossData {
        match self {
            HorizontalWcv::TauMod | HorizontalWcv::Hz => taumod_interval(table, t, s, v),
            HorizontalWcv::Tcpa => tcpa_interval(table, t, s, v),
            HorizontalWcv::Tep => tep_interval(table, t, s, v),
        }
    }
}

fn taumod_interval(table: &WcvTable, t: f64, s: Vect2, v: Vect2) -> LossData {
    let dthr = table.dthr();
    let tthr = table.tthr();
    let sqs = s.sqv();
    let sdotv = s.dot(v);
    let sq_d = util::sq(dthr);
    let a = v.sqv();
    if util::almost_equals(a, 0.0) && sqs <= sq_d {
        return LossData::new(0.0, t);
    }
    if sqs <= sq_d {
        return LossData::new(0.0, f64::min(t, horizontal::theta_d(s, v, 1, dthr)));
    }
    let b = 2.0 * sdotv + tthr * a;
    let c = sqs + tthr * sdotv - sq_d;
    let discr = util::sq(b) - 4.0 * a * c;
    if sdotv >= 0.0 || discr < 0.0 {
        return LossData::new(t, 0.0);
    }
    let tin = (-b - discr.sqrt()) / (2.0 * a);
    if horizontal::delta(s, v, dthr) >= 0.0 && tin <= t {
        LossData::new(
            f64::max(0.0, tin),
            f64::min(t, horizontal::theta_d(s, v, 1, dthr)),
        )
    } else {
        LossData::new(t, 0.0)
    }
}

fn tcpa_interval(table: &WcvTable, t: f64, s: Vect2, v: Vect2) -> LossData {
    let dthr = table.dthr();
    let tthr = table.tthr();
    let sqs = s.sqv();
    let sqv = v.sqv();
    let sdotv = s.dot(v);
    let sq_d = util::sq(dthr);
    if util::almost_equals(sqv, 0.0) && sqs <= sq_d {
        return LossData::new(0.0, t);
    }
    if util::almost_equals(sqv, 0.0) {
        return LossData::new(t, 0.0);
    }
    if sqs <= sq_d {
        return LossData::new(0.0, f64::min(t, horizontal::theta_d(s, v, 1, dthr)));
    }
    if sdotv > 0.0 {
        return LossData::new(t, 0.0);
    }
    let tcpa = horizontal::tcpa(s, v);
    if v.scal_add(tcpa, s).norm() > dthr {
        return LossData::new(t, 0.0);
    }
    let delta = horizontal::delta(s, v, dthr);
    if delta < 0.0 && tcpa - tthr > t {
        return LossData::new(t, 0.0);
    }
    if delta < 0.0 {
        return LossData::new(f64::max(0.0, tcpa - tthr), f64::min(t, tcpa));
    }
    let tmin = f64::min(horizontal::theta_d(s, v, -1, dthr), tcpa - tthr);
    if tmin > t {
        return LossData::new(t, 0.0);
    }
    LossData::new(
        f64::max(0.0, tmin),
        f64::min(t, horizontal::theta_d(s, v, 1, dthr)),
    )
}

fn tep_interval(table: &WcvTable, t: f64, s: Vect2, v: Vect2) -> LossData {
    let dthr = table.dthr();
    let tthr = table.tthr();
    let sqs = s.sqv();
    let sqv = v.sqv();
    let sdotv = s.dot(v);
    let sq_d = util::sq(dthr);
    if util::almost_equals(sqv, 0.0) && sqs <= sq_d {
        return LossData::new(0.0, t);
    }
    if util::almost_equals(sqv, 0.0) {
        return LossData::new(t, 0.0);
    }
    if sqs <= sq_d {
        return LossData::new(0.0, f64::min(t, horizontal::theta_d(s, v, 1, dthr)));
    }
    if sdotv > 0.0 || horizontal::delta(s, v, dthr) < 0.0 {
        return LossData::new(t, 0.0);
    }
    let tep = horizontal::theta_d(s, v, -1, dthr);
    if tep - tthr > t {
        return LossData::new(t, 0.0);
    }
    LossData::new(
        f64::max(0.0, tep - tthr),
        f64::min(t, horizontal::theta_d(s, v, 1, dthr)),
    )
}

/// A complete time-variable well-clear detector: a horizontal variant,
/// a vertical variant, and a threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WcvTvar {
    id: String,
    pub horiz: HorizontalWcv,
    pub vert: VerticalWcv,
    table: WcvTable,
}

impl WcvTvar {
    pub fn new(horiz: HorizontalWcv, vert: VerticalWcv, table: WcvTable) -> Self {
        WcvTvar {
            id: String::new(),
            horiz,
            vert,
            table,
        }
    }

    /// Modified-tau volume with the TCOA vertical model (WCV_TAUMOD).
    pub fn taumod(table: WcvTable) -> Self {
        WcvTvar::new(HorizontalWcv::TauMod, VerticalWcv::Tcoa, table)
    }

    /// Closest-approach volume with the TCOA vertical model (WCV_TCPA).
    pub fn tcpa(table: WcvTable) -> Self {
        WcvTvar::new(HorizontalWcv::Tcpa, VerticalWcv::Tcoa, table)
    }

    /// Entry-point volume with the TCOA vertical model (WCV_TEP).
    pub fn tep(table: WcvTable) -> Self {
        WcvTvar::new(HorizontalWcv::Tep, VerticalWcv::Tcoa, table)
    }

    /// Modified-tau volume with the VMOD vertical model (WCV_HZ).
    pub fn hz(table: WcvTable) -> Self {
        WcvTvar::new(HorizontalWcv::Hz, VerticalWcv::Vmod, table)
    }

    pub fn table(&self) -> &WcvTable {
        &self.table
    }

    pub fn set_table(&mut self, table: WcvTable) {
        self.table = table;
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn set_identifier(&mut self, id: &str) {
        self.id = id.to_string();
    }

    /// The `tstar` threshold fed to the vertical model: TCOA for the
    /// co-altitude model, TTHR for the modulated band.
    fn vertical_tstar(&self) -> f64 {
        match self.vert {
            VerticalWcv::Tcoa => self.table.tcoa(),
            VerticalWcv::Vmod => self.table.tthr(),
        }
    }

    /// Instantaneous horizontal violation against this table.
    pub fn horizontal_violation(&self, s: Vect2, v: Vect2) -> bool {
        self.horiz.violation(&self.table, s, v)
    }

    /// Instantaneous 3-D loss of well clear.
    pub fn wcv(&self, s: Vect3, v: Vect3) -> bool {
        self.horizontal_violation(s.vect2(), v.vect2())
            && self
                .vert
                .violation(self.table.zthr(), self.vertical_tstar(), s.z, v.z)
    }

    /// The tight 3-D loss interval inside `[b, t]`. Assumes
    /// `0 <= b < t`.
    pub fn wcv_interval(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> LossData {
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        let sz = so.z - si.z;
        let vz = vo.z() - vi.z();

        let vert_iv = self
            .vert
            .interval(self.table.zthr(), self.vertical_tstar(), b, t, sz, vz);
        if vert_iv.low > vert_iv.up {
            return LossData::new(t, b);
        }
        // step the horizontal state to the start of the vertical overlap
        let step = v2.scal_add(vert_iv.low, s2);
        if util::almost_equals(vert_iv.low, vert_iv.up) {
            return if self.horizontal_violation(step, v2) {
                LossData::new(vert_iv.low, vert_iv.up)
            } else {
                LossData::new(t, b)
            };
        }
        let ld = self
            .horiz
            .interval(&self.table, vert_iv.up - vert_iv.low, step, v2);
        LossData::new(ld.time_in + vert_iv.low, ld.time_out + vert_iv.low)
    }

    /// Conflict data on `[b, t]`: the loss interval plus the critical
    /// time and cylindrical distance at the interval midpoint.
    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let ld = self.wcv_interval(so, vo, si, vi, b, t);
        let t_tca = (ld.time_in() + ld.time_out()) / 2.0;
        let dist_tca = (so.linear(vo.vect3(), t_tca) - si.linear(vi.vect3(), t_tca))
            .cyl_norm(self.table.dthr(), self.table.zthr());
        ConflictData::from_loss(ld, t_tca, dist_tca, so - si, vo.sub(vi.vect3()))
    }

    /// Detection containment over the table partial order. A volume of
    /// one tau family only contains volumes of families it dominates.
    pub fn contains(&self, other: &WcvTvar) -> bool {
        if self.vert != other.vert {
            return false;
        }
        let family_ok = match self.horiz {
            HorizontalWcv::TauMod => {
                matches!(other.horiz, HorizontalWcv::TauMod | HorizontalWcv::Tcpa)
            }
            HorizontalWcv::Tcpa => matches!(other.horiz, HorizontalWcv::Tcpa),
            HorizontalWcv::Tep => matches!(
                other.horiz,
                HorizontalWcv::Tep | HorizontalWcv::TauMod | HorizontalWcv::Tcpa
            ),
            HorizontalWcv::Hz => matches!(other.horiz, HorizontalWcv::Hz),
        };
        family_ok && self.table.contains(&other.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn taumod_default() -> WcvTvar {
        WcvTvar::taumod(WcvTable::default())
    }

    #[test]
    fn test_table_contains_is_componentwise() {
        let a = WcvTable::buffered_dwc_phase_i();
        let b = WcvTable::do_365_dwc_phase_i();
        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert!(a.contains(&a));
    }

    #[test]
    fn test_table_parameter_round_trip() {
        let table = WcvTable::buffered_dwc_phase_i();
        let mut p = crate::parameters::ParameterData::new();
        table.update_parameter_data(&mut p);
        let mut restored = WcvTable::new(0.0, 0.0, 0.0, 0.0);
        restored.set_parameters(&p);
        assert_eq!(restored.dthr(), table.dthr());
        assert_eq!(restored.zthr(), table.zthr());
        assert_eq!(restored.tthr(), table.tthr());
        assert_eq!(restored.tcoa(), table.tcoa());
        assert_eq!(restored.unit("WCV_DTHR"), "nmi");
    }

    #[test]
    fn test_vertical_tcoa_interval() {
        // S3 vertical geometry: sz = -300 m, vz = +10 m/s, ZTHR 137.16
        let iv = VerticalWcv::Tcoa.interval(137.16, 0.0, 0.0, 60.0, -300.0, 10.0);
        assert!(iv.low <= iv.up);
        assert_relative_eq!(iv.low, (300.0 - 137.16) / 10.0, epsilon = 1e-9);
        assert_relative_eq!(iv.up, (300.0 + 137.16) / 10.0, epsilon = 1e-9);
        // the interval brackets the co-altitude time
        assert!(iv.contains(30.0));
    }

    #[test]
    fn test_vertical_tcoa_widened_by_threshold() {
        // with TCOA = 20 s the entry comes earlier
        let base = VerticalWcv::Tcoa.interval(137.16, 0.0, 0.0, 60.0, -300.0, 10.0);
        let wide = VerticalWcv::Tcoa.interval(137.16, 20.0, 0.0, 60.0, -300.0, 10.0);
        assert!(wide.low < base.low);
        assert_relative_eq!(wide.up, base.up, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_zero_rate_branches() {
        let inside = VerticalWcv::Tcoa.interval(100.0, 0.0, 0.0, 60.0, 50.0, 0.0);
        assert_eq!((inside.low, inside.up), (0.0, 60.0));
        let outside = VerticalWcv::Tcoa.interval(100.0, 0.0, 0.0, 60.0, 500.0, 0.0);
        assert!(outside.low > outside.up);
    }

    #[test]
    fn test_vmod_violation() {
        // inside the raised band only while converging
        assert!(VerticalWcv::Vmod.violation(100.0, 10.0, -150.0, 10.0));
        assert!(!VerticalWcv::Vmod.violation(100.0, 10.0, 150.0, 10.0));
        assert!(VerticalWcv::Vmod.violation(100.0, 10.0, 50.0, 0.0));
    }

    #[test]
    fn test_taumod_interval_head_on() {
        // head-on at 200 m/s closure starting 10 km out, DTHR 1222.32 m
        let table = WcvTable::default();
        let s = Vect2::new(-10000.0, 0.0);
        let v = Vect2::new(200.0, 0.0);
        let ld = taumod_interval(&table, 120.0, s, v);
        assert!(ld.conflict());
        // tau_mod reaches TTHR before the circle itself is reached
        let entry_dist = 10000.0 - 200.0 * ld.time_in;
        assert!(entry_dist > table.dthr());
        // exit is the far-side circle crossing
        assert_relative_eq!(
            ld.time_out,
            (10000.0 + table.dthr()) / 200.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_taumod_interval_inside_circle() {
        let table = WcvTable::default();
        let s = Vect2::new(-500.0, 0.0);
        let v = Vect2::new(100.0, 0.0);
        let ld = taumod_interval(&table, 60.0, s, v);
        assert_eq!(ld.time_in, 0.0);
        assert!(ld.time_out > 0.0);
    }

    #[test]
    fn test_taumod_interval_diverging_is_empty() {
        let table = WcvTable::default();
        let s = Vect2::new(5000.0, 0.0);
        let v = Vect2::new(100.0, 0.0);
        let ld = taumod_interval(&table, 60.0, s, v);
        assert!(!ld.conflict());
    }

    #[test]
    fn test_tcpa_interval_brackets_closest_approach() {
        let table = WcvTable::default();
        let s = Vect2::new(-10000.0, 200.0);
        let v = Vect2::new(200.0, 0.0);
        let ld = tcpa_interval(&table, 120.0, s, v);
        assert!(ld.conflict());
        let tcpa = horizontal::tcpa(s, v);
        assert!(ld.time_in <= tcpa && tcpa <= ld.time_out + table.tthr());
    }

    #[test]
    fn test_tep_interval_leads_entry_by_tthr() {
        let table = WcvTable::default();
        let s = Vect2::new(-10000.0, 0.0);
        let v = Vect2::new(200.0, 0.0);
        let ld = tep_interval(&table, 120.0, s, v);
        let tep = horizontal::theta_d(s, v, -1, table.dthr());
        assert!(ld.conflict());
        assert_relative_eq!(ld.time_in, tep - table.tthr(), epsilon = 1e-9);
    }

    #[test]
    fn test_wcv_interval_vertical_only_closure() {
        // S3: pure vertical closure inside DTHR
        let table = WcvTable::new(338.8, 137.16, 35.0, 0.0);
        let det = WcvTvar::taumod(table);
        let so = Vect3::ZERO;
        let vo = Velocity::mk_vxyz(0.0, 0.0, 5.0);
        let si = Vect3::new(100.0, 0.0, 300.0);
        let vi = Velocity::mk_vxyz(0.0, 0.0, -5.0);
        let ld = det.wcv_interval(so, vo, si, vi, 0.0, 60.0);
        assert!(ld.conflict());
        assert!(ld.time_in < 30.0 && 30.0 < ld.time_out);
        let cd = det.conflict_detection(so, vo, si, vi, 0.0, 60.0);
        assert!(cd.conflict());
        assert!(cd.time_crit() > 0.0);
        // the instantaneous predicate agrees inside and outside the loss
        let s_mid = (so - si).linear(vo.vect3() - vi.vect3(), 30.0);
        assert!(det.wcv(s_mid, vo.vect3() - vi.vect3()));
        assert!(!det.wcv(so - si, vo.vect3() - vi.vect3()));
    }

    #[test]
    fn test_wcv_interval_symmetry() {
        // swapping ownship and intruder leaves the interval unchanged
        let det = taumod_default();
        let so = Vect3::new(0.0, 0.0, 0.0);
        let vo = Velocity::mk_trk_gs_vs(1.0, 140.0, 2.0);
        let si = Vect3::new(-8000.0, 3000.0, 200.0);
        let vi = Velocity::mk_trk_gs_vs(2.2, 120.0, -1.5);
        let a = det.wcv_interval(so, vo, si, vi, 0.0, 300.0);
        let b = det.wcv_interval(si, vi, so, vo, 0.0, 300.0);
        assert_relative_eq!(a.time_in, b.time_in, epsilon = 1e-9);
        assert_relative_eq!(a.time_out, b.time_out, epsilon = 1e-9);
    }

    #[test]
    fn test_wcv_window_composition() {
        // empty on [0,T1] and empty on [T1,T2] implies empty on [0,T2]
        let det = taumod_default();
        let so = Vect3::ZERO;
        let vo = Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0);
        let si = Vect3::new(0.0, 30000.0, 3000.0);
        let vi = Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0);
        let first = det.wcv_interval(so, vo, si, vi, 0.0, 60.0);
        let second = det.wcv_interval(so, vo, si, vi, 60.0, 120.0);
        let whole = det.wcv_interval(so, vo, si, vi, 0.0, 120.0);
        assert!(!first.conflict());
        assert!(!second.conflict());
        assert!(!whole.conflict());
    }

    #[test]
    fn test_containment_implies_detection() {
        // S6: if the Phase I volume reports loss, the buffered volume
        // (which contains it) must as well
        let small = WcvTvar::taumod(WcvTable::do_365_dwc_phase_i());
        let large = WcvTvar::taumod(WcvTable::buffered_dwc_phase_i());
        assert!(large.contains(&small));
        let so = Vect3::ZERO;
        let vo = Velocity::mk_vxyz(0.0, 0.0, 5.0);
        let si = Vect3::new(100.0, 0.0, 300.0);
        let vi = Velocity::mk_vxyz(0.0, 0.0, -5.0);
        let a = small.wcv_interval(so, vo, si, vi, 0.0, 60.0);
        let b = large.wcv_interval(so, vo, si, vi, 0.0, 60.0);
        if a.conflict() {
            assert!(b.conflict());
            assert!(b.time_in <= a.time_in + 1e-9);
            assert!(a.time_out <= b.time_out + 1e-9);
        }
    }

    #[test]
    fn test_tvar_family_containment_rules() {
        let t = WcvTable::default();
        assert!(WcvTvar::taumod(t.clone()).contains(&WcvTvar::tcpa(t.clone())));
        assert!(!WcvTvar::tcpa(t.clone()).contains(&WcvTvar::taumod(t.clone())));
        assert!(WcvTvar::tep(t.clone()).contains(&WcvTvar::taumod(t.clone())));
        assert!(!WcvTvar::taumod(t.clone()).contains(&WcvTvar::hz(t.clone())));
        assert!(WcvTvar::hz(t.clone()).contains(&WcvTvar::hz(t)));
    }
}
