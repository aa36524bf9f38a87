//! TCAS-II advisory detection, kept as a preset for regression and
//! comparison against the well-clear volumes.
//!
//! Thresholds are layered by sensitivity level, which is selected from
//! the ownship altitude. The TA and RA rows are the fixed DO-185B
//! values.

use serde::{Deserialize, Serialize};

use daa_kinematics::units;
use daa_kinematics::util;
use daa_kinematics::{Vect2, Vect3, Velocity};

use crate::detector::ConflictData;
use crate::horizontal;
use crate::vertical;

// Upper altitude bound of sensitivity levels 1..=7, in feet; level 8 is
// unbounded.
const LEVEL_BOUNDS_FT: [f64; 7] = [0.0, 1000.0, 2350.0, 5000.0, 10000.0, 20000.0, 42000.0];

const TA_TAU: [f64; 8] = [0.0, 20.0, 25.0, 30.0, 40.0, 45.0, 48.0, 48.0];
const RA_TAU: [f64; 8] = [0.0, 0.0, 15.0, 20.0, 25.0, 30.0, 35.0, 35.0];
const TA_DMOD_NMI: [f64; 8] = [0.0, 0.30, 0.33, 0.48, 0.75, 1.0, 1.3, 1.3];
const RA_DMOD_NMI: [f64; 8] = [0.0, 0.0, 0.2, 0.35, 0.55, 0.8, 1.1, 1.1];
const TA_ZTHR_FT: [f64; 8] = [0.0, 850.0, 850.0, 850.0, 850.0, 850.0, 850.0, 1200.0];
const RA_ZTHR_FT: [f64; 8] = [0.0, 0.0, 600.0, 600.0, 600.0, 600.0, 700.0, 800.0];
const RA_HMD_FT: [f64; 8] = [0.0, 0.0, 1215.0, 2126.0, 3342.0, 4861.0, 6683.0, 6683.0];

/// Per-sensitivity-level TCAS thresholds. Rows are indexed by level,
/// 1-based at the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcasTable {
    hmd_filter: bool,
    /// Upper altitude bound per level; one entry fewer than the rows.
    levels: Vec<f64>,
    tau: Vec<f64>,
    tcoa: Vec<f64>,
    dmod: Vec<f64>,
    zthr: Vec<f64>,
    hmd: Vec<f64>,
}

impl TcasTable {
    /// The default TCAS-II table: RA thresholds when `ra`, TA otherwise.
    pub fn make_tcasii(ra: bool) -> Self {
        let levels: Vec<f64> = LEVEL_BOUNDS_FT
            .iter()
            .map(|ft| units::from("ft", *ft))
            .collect();
        let (tau, dmod, zthr, hmd): (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) = if ra {
            (
                RA_TAU.to_vec(),
                RA_DMOD_NMI.iter().map(|d| units::from("nmi", *d)).collect(),
                RA_ZTHR_FT.iter().map(|z| units::from("ft", *z)).collect(),
                RA_HMD_FT.iter().map(|h| units::from("ft", *h)).collect(),
            )
        } else {
            (
                TA_TAU.to_vec(),
                TA_DMOD_NMI.iter().map(|d| units::from("nmi", *d)).collect(),
                TA_ZTHR_FT.iter().map(|z| units::from("ft", *z)).collect(),
                TA_DMOD_NMI.iter().map(|d| units::from("nmi", *d)).collect(),
            )
        };
        TcasTable {
            hmd_filter: ra,
            levels,
            tcoa: tau.clone(),
            tau,
            dmod,
            zthr,
            hmd,
        }
    }

    /// A zeroed table with a single unbounded level.
    pub fn make_empty() -> Self {
        TcasTable {
            hmd_filter: false,
            levels: Vec::new(),
            tau: vec![0.0],
            tcoa: vec![0.0],
            dmod: vec![0.0],
            zthr: vec![0.0],
            hmd: vec![0.0],
        }
    }

    pub fn hmd_filter(&self) -> bool {
        self.hmd_filter
    }

    pub fn set_hmd_filter(&mut self, flag: bool) {
        self.hmd_filter = flag;
    }

    /// Sensitivity level for an ownship altitude, 1-based.
    pub fn sensitivity_level(&self, alt: f64) -> usize {
        for (i, bound) in self.levels.iter().enumerate() {
            if alt <= *bound {
                return i + 1;
            }
        }
        self.levels.len() + 1
    }

    pub fn max_sensitivity_level(&self) -> usize {
        self.levels.len() + 1
    }

    pub fn is_valid_sensitivity_level(&self, sl: usize) -> bool {
        1 <= sl && sl <= self.levels.len() + 1
    }

    /// Open lower altitude bound of a level; 0 for the lowest.
    pub fn level_altitude_lower_bound(&self, sl: usize) -> f64 {
        if !self.is_valid_sensitivity_level(sl) {
            return -1.0;
        }
        let mut sl = sl - 1;
        while sl > 0 && self.levels[sl - 1] == 0.0 {
            sl -= 1;
        }
        if sl > 0 {
            self.levels[sl - 1]
        } else {
            0.0
        }
    }

    /// Closed upper altitude bound of a level; infinite for the last.
    pub fn level_altitude_upper_bound(&self, sl: usize) -> f64 {
        if !self.is_valid_sensitivity_level(sl) {
            return -1.0;
        }
        if sl == self.max_sensitivity_level() {
            f64::INFINITY
        } else {
            self.levels[sl - 1]
        }
    }

    fn row(&self, v: &[f64], sl: usize) -> f64 {
        if self.is_valid_sensitivity_level(sl) {
            v[sl - 1]
        } else {
            -1.0
        }
    }

    pub fn tau(&self, sl: usize) -> f64 {
        self.row(&self.tau, sl)
    }

    pub fn tcoa(&self, sl: usize) -> f64 {
        self.row(&self.tcoa, sl)
    }

    pub fn dmod(&self, sl: usize) -> f64 {
        self.row(&self.dmod, sl)
    }

    pub fn zthr(&self, sl: usize) -> f64 {
        self.row(&self.zthr, sl)
    }

    pub fn hmd(&self, sl: usize) -> f64 {
        self.row(&self.hmd, sl)
    }

    pub fn update_parameter_data(&self, p: &mut crate::parameters::ParameterData) {
        p.set_bool("TCAS_HMD_filter", self.hmd_filter);
        for (i, bound) in self.levels.iter().enumerate() {
            p.set_internal(&format!("TCAS_level_{}", i + 1), *bound, "ft");
        }
        for i in 1..=self.max_sensitivity_level() {
            p.set_internal(&format!("TCAS_TAU_{i}"), self.tau(i), "s");
            p.set_internal(&format!("TCAS_TCOA_{i}"), self.tcoa(i), "s");
            p.set_internal(&format!("TCAS_DMOD_{i}"), self.dmod(i), "nmi");
            p.set_internal(&format!("TCAS_ZTHR_{i}"), self.zthr(i), "ft");
            p.set_internal(&format!("TCAS_HMD_{i}"), self.hmd(i), "ft");
        }
    }

    pub fn set_parameters(&mut self, p: &crate::parameters::ParameterData) {
        if p.contains("TCAS_HMD_filter") {
            self.hmd_filter = p.get_bool("TCAS_HMD_filter");
        }
        let mut levels = Vec::new();
        for i in 1.. {
            let key = format!("TCAS_level_{i}");
            if !p.contains(&key) {
                break;
            }
            levels.push(p.get_value(&key));
        }
        if !levels.is_empty() || p.contains("TCAS_TAU_1") {
            let rows = levels.len() + 1;
            let read = |name: &str| -> Vec<f64> {
                (1..=rows)
                    .map(|i| p.get_value(&format!("TCAS_{name}_{i}")))
                    .collect()
            };
            self.tau = read("TAU");
            self.tcoa = read("TCOA");
            self.dmod = read("DMOD");
            self.zthr = read("ZTHR");
            self.hmd = read("HMD");
            self.levels = levels;
        }
    }

    /// Componentwise containment over identical level layering.
    pub fn contains(&self, other: &TcasTable) -> bool {
        if self.levels.len() != other.levels.len() || self.hmd_filter != other.hmd_filter {
            return false;
        }
        for i in 0..=self.levels.len() {
            if i < self.levels.len() && !util::almost_equals(self.levels[i], other.levels[i]) {
                return false;
            }
            if !(self.tau[i] >= other.tau[i]
                && self.tcoa[i] >= other.tcoa[i]
                && self.dmod[i] >= other.dmod[i]
                && self.zthr[i] >= other.zthr[i]
                && self.hmd[i] >= other.hmd[i])
            {
                return false;
            }
        }
        true
    }
}

// --- 2-D RA machinery -------------------------------------------------

fn tau_mod(dmod: f64, s: Vect2, v: Vect2) -> f64 {
    let sdotv = s.dot(v);
    if util::almost_equals(sdotv, 0.0) {
        return 0.0;
    }
    (util::sq(dmod) - s.sqv()) / sdotv
}

fn horizontal_ra(dmod: f64, tau: f64, s: Vect2, v: Vect2) -> bool {
    if s.dot(v) >= 0.0 {
        s.norm() <= dmod
    } else {
        s.norm() <= dmod || tau_mod(dmod, s, v) <= tau
    }
}

fn horizontal_ra_at(dmod: f64, tau: f64, s: Vect2, v: Vect2, t: f64) -> bool {
    horizontal_ra(dmod, tau, v.scal_add(t, s), v)
}

fn nominal_tau(b: f64, t: f64, s: Vect2, v: Vect2, rr: f64) -> f64 {
    if v.is_zero() {
        return b;
    }
    f64::max(b, f64::min(t, -s.dot(v) / v.sqv() - rr / 2.0))
}

fn time_of_min_tau(dmod: f64, b: f64, t: f64, s: Vect2, v: Vect2) -> f64 {
    if v.scal_add(b, s).dot(v) >= 0.0 {
        return b;
    }
    let d = horizontal::delta(s, v, dmod);
    let rr = if d < 0.0 { 2.0 * (-d).sqrt() / v.sqv() } else { 0.0 };
    if v.scal_add(t, s).dot(v) < 0.0 {
        return t;
    }
    nominal_tau(b, t, s, v, rr)
}

fn cd2d_tcas_after(hmd: f64, s: Vect2, vo: Vect2, vi: Vect2, t: f64) -> bool {
    let v = vo - vi;
    (vo.almost_equals(vi) && s.sqv() <= util::sq(hmd))
        || (v.sqv() > 0.0
            && horizontal::delta(s, v, hmd) >= 0.0
            && horizontal::theta_d(s, v, 1, hmd) >= t)
}

fn cd2d_tcas(hmd: f64, s: Vect2, vo: Vect2, vi: Vect2) -> bool {
    cd2d_tcas_after(hmd, s, vo, vi, 0.0)
}

// 2-D RA interval on [b,t]; an empty result is encoded `in > out`.
fn ra2d_interval(dmod: f64, tau: f64, b: f64, t: f64, s: Vect2, vo: Vect2, vi: Vect2) -> (f64, f64) {
    let v = vo - vi;
    let sqs = s.sqv();
    let sdotv = s.dot(v);
    let sq_d = util::sq(dmod);
    if vo.almost_equals(vi) && sqs <= sq_d {
        return (b, t);
    }
    let sqv = v.sqv();
    if sqs <= sq_d {
        return (b, util::root2b(sqv, sdotv, sqs - sq_d, 1));
    }
    let bq = 2.0 * sdotv + tau * sqv;
    let cq = sqs + tau * sdotv - sq_d;
    if sdotv >= 0.0 || util::discr(sqv, bq, cq) < 0.0 {
        return (t + 1.0, 0.0);
    }
    let t_in = util::root(sqv, bq, cq, -1);
    let t_out = if horizontal::delta(s, v, dmod) >= 0.0 {
        horizontal::theta_d(s, v, 1, dmod)
    } else {
        util::root(sqv, bq, cq, 1)
    };
    (t_in, t_out)
}

/// TCAS-II advisory detector over a threshold table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tcas3d {
    id: String,
    table: TcasTable,
}

impl Default for Tcas3d {
    fn default() -> Self {
        Tcas3d::make_tcasii_ra()
    }
}

impl Tcas3d {
    pub fn new(table: TcasTable) -> Self {
        Tcas3d {
            id: String::new(),
            table,
        }
    }

    /// Detector with the RA thresholds.
    pub fn make_tcasii_ra() -> Self {
        Tcas3d::new(TcasTable::make_tcasii(true))
    }

    /// Detector with the TA thresholds.
    pub fn make_tcasii_ta() -> Self {
        Tcas3d::new(TcasTable::make_tcasii(false))
    }

    pub fn table(&self) -> &TcasTable {
        &self.table
    }

    pub fn identifier(&self) -> &str {
        &self.id
    }

    pub fn set_identifier(&mut self, id: &str) {
        self.id = id.to_string();
    }

    pub fn set_table_parameters(&mut self, p: &crate::parameters::ParameterData) {
        self.table.set_parameters(p);
    }

    fn vertical_ra(sz: f64, vz: f64, zthr: f64, tcoa: f64) -> bool {
        if sz.abs() <= zthr {
            return true;
        }
        if util::almost_equals(vz, 0.0) {
            return false;
        }
        let t = vertical::time_coalt(sz, vz);
        0.0 <= t && t <= tcoa
    }

    /// True iff the ownship has an advisory at the current instant.
    pub fn tcasii_ra(&self, so: Vect3, vo: Vect3, si: Vect3, vi: Vect3) -> bool {
        let s2 = so.vect2() - si.vect2();
        let vo2 = vo.vect2();
        let vi2 = vi.vect2();
        let v2 = vo2 - vi2;
        let sl = self.table.sensitivity_level(so.z);
        let usehmdf = self.table.hmd_filter();
        (!usehmdf || cd2d_tcas(self.table.hmd(sl), s2, vo2, vi2))
            && horizontal_ra(self.table.dmod(sl), self.table.tau(sl), s2, v2)
            && Tcas3d::vertical_ra(
                so.z - si.z,
                vo.z - vi.z,
                self.table.zthr(sl),
                self.table.tcoa(sl),
            )
    }

    // Advisory interval within one sensitivity level; returns
    // (time_in, time_out, time_of_min_tau).
    #[allow(clippy::too_many_arguments)]
    fn ra3d_interval(
        &self,
        sl: usize,
        so2: Vect2,
        soz: f64,
        vo2: Vect2,
        voz: f64,
        si2: Vect2,
        siz: f64,
        vi2: Vect2,
        viz: f64,
        b: f64,
        t: f64,
    ) -> (f64, f64, f64) {
        let mut time_in = t;
        let mut time_out = b;
        let mut time_mintau = f64::INFINITY;
        let s2 = so2 - si2;
        let v2 = vo2 - vi2;
        let sz = soz - siz;
        let vz = voz - viz;
        let usehmdf = self.table.hmd_filter();
        let tau = self.table.tau(sl);
        let tcoa = self.table.tcoa(sl);
        let dmod = self.table.dmod(sl);
        let hmd = self.table.hmd(sl);
        let zthr = self.table.zthr(sl);

        if usehmdf && !cd2d_tcas_after(hmd, s2, vo2, vi2, b) {
            time_mintau = time_of_min_tau(dmod, b, t, s2, v2);
            return (time_in, time_out, time_mintau);
        }
        if util::almost_equals(voz, viz) && sz.abs() > zthr {
            time_mintau = time_of_min_tau(dmod, b, t, s2, v2);
            return (time_in, time_out, time_mintau);
        }
        let mut tentry = b;
        let mut texit = t;
        if !util::almost_equals(voz, viz) {
            let act_h = f64::max(zthr, vz.abs() * tcoa);
            tentry = vertical::theta_h(sz, vz, -1, act_h);
            texit = vertical::theta_h(sz, vz, 1, zthr);
        }
        let ventry = v2.scal_add(tentry, s2);
        let exit_at_centry = ventry.dot(v2) >= 0.0;
        let los_at_centry = ventry.sqv() <= util::sq(hmd);
        if texit < b || t < tentry {
            time_mintau = time_of_min_tau(dmod, b, t, s2, v2);
            return (time_in, time_out, time_mintau);
        }
        let tin = f64::max(b, tentry);
        let tout = f64::min(t, texit);
        let (ra2d_in, ra2d_out) = ra2d_interval(dmod, tau, tin, tout, s2, vo2, vi2);
        let ra_in_look = f64::max(tin, f64::min(tout, ra2d_in));
        let ra_out_look = f64::max(tin, f64::min(tout, ra2d_out));
        if ra2d_in > ra2d_out
            || ra2d_out < tin
            || ra2d_in > tout
            || (usehmdf && hmd < dmod && exit_at_centry && !los_at_centry)
        {
            time_mintau = time_of_min_tau(dmod, b, t, s2, v2);
            return (time_in, time_out, time_mintau);
        }
        if usehmdf && hmd < dmod {
            let mut exit_theta = t;
            if v2.sqv() > 0.0 {
                exit_theta = f64::max(b, f64::min(horizontal::theta_d(s2, v2, 1, hmd), t));
            }
            let min_ra_out_theta = f64::min(ra_out_look, exit_theta);
            time_in = ra_in_look;
            time_out = min_ra_out_theta;
            time_mintau = if ra_in_look <= min_ra_out_theta {
                time_of_min_tau(dmod, ra_in_look, min_ra_out_theta, s2, v2)
            } else {
                time_of_min_tau(dmod, b, t, s2, v2)
            };
        } else {
            time_in = ra_in_look;
            time_out = ra_out_look;
            time_mintau = time_of_min_tau(dmod, ra_in_look, ra_out_look, s2, v2);
        }
        (time_in, time_out, time_mintau)
    }

    /// Advisory interval within `[b, t]`, walking the sensitivity-level
    /// transitions the ownship's vertical profile crosses.
    pub fn ra3d(
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
        let so2 = so.vect2();
        let vo2 = vo.vect2();
        let si2 = si.vect2();
        let vi2 = vi.vect2();

        let max_sl = self.table.max_sensitivity_level();
        let dmod_max = self.table.dmod(max_sl);
        let zthr_max = self.table.zthr(max_sl);

        let mut tin = f64::INFINITY;
        let mut tout = f64::NEG_INFINITY;
        let mut tmin = f64::INFINITY;
        let sl_first = self.table.sensitivity_level(so.z + b * vo.z());
        let sl_last = self.table.sensitivity_level(so.z + t * vo.z());
        if sl_first == sl_last || util::almost_equals(vo.z(), 0.0) {
            let (i, o, m) = self.ra3d_interval(
                sl_first,
                so2,
                so.z,
                vo2,
                vo.z(),
                si2,
                si.z,
                vi2,
                vi.z(),
                b,
                t,
            );
            tin = i;
            tout = o;
            tmin = m;
        } else {
            let up = sl_first < sl_last;
            let mut sl = sl_first;
            let mut t_b = b;
            while t_b < t {
                if self.table.is_valid_sensitivity_level(sl) {
                    let level = if up {
                        self.table.level_altitude_upper_bound(sl)
                    } else {
                        self.table.level_altitude_lower_bound(sl)
                    };
                    let t_level = if level.is_infinite() {
                        f64::INFINITY
                    } else {
                        (level - so.z) / vo.z()
                    };
                    let (i, o, m) = self.ra3d_interval(
                        sl,
                        so2,
                        so.z,
                        vo2,
                        vo.z(),
                        si2,
                        si.z,
                        vi2,
                        vi.z(),
                        t_b,
                        f64::min(t_level, t),
                    );
                    if util::almost_less(i, o) {
                        tin = f64::min(tin, i);
                        tout = f64::max(tout, o);
                    }
                    tmin = f64::min(tmin, m);
                    t_b = t_level;
                    if sl == sl_last {
                        break;
                    }
                }
                sl = if up { sl + 1 } else { sl - 1 };
            }
        }
        let dmin = s.linear(v.vect3(), tmin).cyl_norm(dmod_max, zthr_max);
        ConflictData::new(tin, tout, tmin, dmin, s, v)
    }
}
