//! The detector variants and their common conflict record.
//!
//! The polymorphic detector family is a tagged enum: dispatch is a
//! match, copies are plain clones with full independence, and the
//! parameter round-trip is keyed by a detector-class name that survives
//! configuration I/O.

use serde::{Deserialize, Serialize};

use daa_kinematics::util;
use daa_kinematics::{LossData, Vect3, Velocity};

use crate::cylinder::CdCylinder;
use crate::horizontal;
use crate::parameters::ParameterData;
use crate::tcas::Tcas3d;
use crate::vertical;
use crate::wcv::{HorizontalWcv, WcvTable, WcvTvar};

/// Result of conflict detection on a look-ahead window.
///
/// `time_in > time_out` means no conflict; the normalized accessors on
/// construction map that case to `(+inf, -inf)`. `dist_crit` is the
/// detector's severity norm at the critical time: 0 is most severe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictData {
    pub time_in: f64,
    pub time_out: f64,
    time_crit: f64,
    dist_crit: f64,
    s: Vect3,
    v: Velocity,
}

impl ConflictData {
    pub const EMPTY: ConflictData = ConflictData {
        time_in: f64::INFINITY,
        time_out: f64::NEG_INFINITY,
        time_crit: f64::INFINITY,
        dist_crit: f64::INFINITY,
        s: Vect3::INVALID,
        v: Velocity::INVALID,
    };

    pub fn new(time_in: f64, time_out: f64, time_crit: f64, dist_crit: f64, s: Vect3, v: Velocity) -> Self {
        ConflictData {
            time_in,
            time_out,
            time_crit,
            dist_crit,
            s,
            v,
        }
    }

    /// Build from a loss interval, normalizing empty intervals to the
    /// `(+inf, -inf)` convention.
    pub fn from_loss(ld: LossData, time_crit: f64, dist_crit: f64, s: Vect3, v: Velocity) -> Self {
        ConflictData {
            time_in: ld.time_in(),
            time_out: ld.time_out(),
            time_crit,
            dist_crit,
            s,
            v,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.s.is_invalid() && !self.v.is_invalid()
    }

    pub fn conflict(&self) -> bool {
        util::almost_less(self.time_in, self.time_out)
    }

    pub fn conflict_before(&self, t: f64) -> bool {
        (self.time_in == 0.0 || util::almost_less(self.time_in, t)) && self.conflict()
    }

    pub fn loss_data(&self) -> LossData {
        LossData::new(self.time_in, self.time_out)
    }

    /// Relative position at detection time.
    pub fn relative_position(&self) -> Vect3 {
        self.s
    }

    /// Relative velocity at detection time.
    pub fn relative_velocity(&self) -> Velocity {
        self.v
    }

    pub fn time_crit(&self) -> f64 {
        self.time_crit
    }

    pub fn dist_crit(&self) -> f64 {
        self.dist_crit
    }

    /// Horizontal miss distance within lookahead `t`, straight-line.
    pub fn hmd(&self, t: f64) -> f64 {
        horizontal::hmd(self.s.vect2(), self.v.vect2(), t)
    }

    /// Vertical miss distance within lookahead `t`, straight-line.
    pub fn vmd(&self, t: f64) -> f64 {
        vertical::vmd(self.s.z, self.v.z(), t)
    }

    pub fn horizontal_separation(&self) -> f64 {
        self.s.norm2d()
    }

    pub fn vertical_separation(&self) -> f64 {
        self.s.z.abs()
    }

    /// Rate of horizontal closure; negative when diverging.
    pub fn horizontal_closure_rate(&self) -> f64 {
        let n = self.s.norm2d();
        if n > 0.0 {
            -self.s.dot2d(self.v.vect3()) / n
        } else {
            self.v.gs()
        }
    }

    /// Rate of vertical closure; negative when diverging.
    pub fn vertical_closure_rate(&self) -> f64 {
        if self.s.z > 0.0 {
            -self.v.z()
        } else if self.s.z < 0.0 {
            self.v.z()
        } else {
            self.v.z().abs()
        }
    }
}

/// State-based conflict detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Detector {
    /// Plain distance-threshold cylinder.
    Cylinder(CdCylinder),
    /// Time-modulated well-clear volume.
    WcvTvar(WcvTvar),
    /// TCAS-II advisory thresholds (legacy preset).
    Tcas(Tcas3d),
    /// Reports no conflict for any state; identity for composition.
    None,
}

impl Detector {
    /// DO-365 Phase I well-clear volume with default thresholds.
    pub fn wcv_taumod() -> Detector {
        Detector::WcvTvar(WcvTvar::taumod(WcvTable::default()))
    }

    /// Conflict data on the window `[b, t]`.
    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        match self {
            Detector::Cylinder(c) => c.conflict_detection(so, vo, si, vi, b, t),
            Detector::WcvTvar(w) => w.conflict_detection(so, vo, si, vi, b, t),
            Detector::Tcas(tc) => tc.ra3d(so, vo, si, vi, b, t),
            Detector::None => ConflictData::EMPTY,
        }
    }

    /// True iff a conflict exists within `[b, t]`. A degenerate window
    /// (`b` almost equal to `t`) is probed with a one-second window and
    /// requires the loss to start at `b`.
    pub fn conflict(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity, b: f64, t: f64) -> bool {
        if util::almost_equals(b, t) {
            let cd = self.conflict_detection(so, vo, si, vi, b, b + 1.0);
            return cd.conflict() && util::almost_equals(cd.time_in, b);
        }
        if b > t {
            return false;
        }
        self.conflict_detection(so, vo, si, vi, b, t).conflict()
    }

    /// Instantaneous violation at the current states.
    pub fn violation(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> bool {
        self.conflict(so, vo, si, vi, 0.0, 0.0)
    }

    /// A fresh instance of the same detector class with default
    /// parameters.
    pub fn make(&self) -> Detector {
        match self {
            Detector::Cylinder(_) => Detector::Cylinder(CdCylinder::default()),
            Detector::WcvTvar(w) => {
                Detector::WcvTvar(WcvTvar::new(w.horiz, w.vert, WcvTable::default()))
            }
            Detector::Tcas(_) => Detector::Tcas(Tcas3d::make_tcasii_ra()),
            Detector::None => Detector::None,
        }
    }

    /// Volume containment: `self.contains(other)` implies that any
    /// state detected by `other` is detected by `self`.
    pub fn contains(&self, other: &Detector) -> bool {
        match (self, other) {
            (Detector::Cylinder(a), Detector::Cylinder(b)) => a.contains(b),
            (Detector::WcvTvar(a), Detector::WcvTvar(b)) => a.contains(b),
            (Detector::Tcas(a), Detector::Tcas(b)) => a.table().contains(b.table()),
            (_, Detector::None) => true,
            _ => false,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Detector::Cylinder(c) => c.identifier(),
            Detector::WcvTvar(w) => w.identifier(),
            Detector::Tcas(t) => t.identifier(),
            Detector::None => "",
        }
    }

    pub fn set_identifier(&mut self, id: &str) {
        match self {
            Detector::Cylinder(c) => c.set_identifier(id),
            Detector::WcvTvar(w) => w.set_identifier(id),
            Detector::Tcas(t) => t.set_identifier(id),
            Detector::None => {}
        }
    }

    /// Class name used for configuration round-trip.
    pub fn class_name(&self) -> &'static str {
        match self {
            Detector::Cylinder(_) => "CDCylinder",
            Detector::WcvTvar(w) => match w.horiz {
                HorizontalWcv::TauMod => "WCV_TAUMOD",
                HorizontalWcv::Tcpa => "WCV_TCPA",
                HorizontalWcv::Tep => "WCV_TEP",
                HorizontalWcv::Hz => "WCV_HZ",
            },
            Detector::Tcas(_) => "TCAS3D",
            Detector::None => "NoDetector",
        }
    }

    pub fn to_parameters(&self) -> ParameterData {
        let mut p = ParameterData::new();
        self.update_parameter_data(&mut p);
        p
    }

    pub fn update_parameter_data(&self, p: &mut ParameterData) {
        p.set("detector_class", self.class_name());
        p.set("id", self.identifier());
        match self {
            Detector::Cylinder(c) => c.update_parameter_data(p),
            Detector::WcvTvar(w) => w.table().update_parameter_data(p),
            Detector::Tcas(t) => t.table().update_parameter_data(p),
            Detector::None => {}
        }
    }

    /// Rebuild a detector from a parameter table written by
    /// [`Detector::update_parameter_data`]. Unknown class names yield
    /// `None`.
    pub fn from_parameters(p: &ParameterData) -> Detector {
        let mut det = match p.get_string("detector_class") {
            Some("CDCylinder") => {
                let mut c = CdCylinder::default();
                c.set_parameters(p);
                Detector::Cylinder(c)
            }
            Some("WCV_TAUMOD") => {
                let mut table = WcvTable::default();
                table.set_parameters(p);
                Detector::WcvTvar(WcvTvar::taumod(table))
            }
            Some("WCV_TCPA") => {
                let mut table = WcvTable::default();
                table.set_parameters(p);
                Detector::WcvTvar(WcvTvar::tcpa(table))
            }
            Some("WCV_TEP") => {
                let mut table = WcvTable::default();
                table.set_parameters(p);
                Detector::WcvTvar(WcvTvar::tep(table))
            }
            Some("WCV_HZ") => {
                let mut table = WcvTable::default();
                table.set_parameters(p);
                Detector::WcvTvar(WcvTvar::hz(table))
            }
            Some("TCAS3D") => {
                let mut t = Tcas3d::make_tcasii_ra();
                t.set_table_parameters(p);
                Detector::Tcas(t)
            }
            _ => Detector::None,
        };
        if let Some(id) = p.get_string("id") {
            det.set_identifier(id);
        }
        det
    }
}
