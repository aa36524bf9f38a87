//! Velocity with cached polar components.
//!
//! The compass track (clockwise from true north) and ground speed are
//! carried alongside the Cartesian triple so that repeated projections
//! do not re-derive them, and so that a velocity whose ground speed
//! passes through zero keeps its track: `v.mk_gs(0.0).mk_gs(gs)` points
//! the same way as `v`.

use serde::{Deserialize, Serialize};

use crate::util;
use crate::vect::{Vect2, Vect3};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Velocity {
    trk: f64,
    gs: f64,
    v: Vect3,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity {
        trk: 0.0,
        gs: 0.0,
        v: Vect3::ZERO,
    };

    /// All-NaN sentinel. Test with [`Velocity::is_invalid`], never with
    /// equality.
    pub const INVALID: Velocity = Velocity {
        trk: f64::NAN,
        gs: f64::NAN,
        v: Vect3::INVALID,
    };

    fn from_cartesian(vx: f64, vy: f64, vz: f64) -> Velocity {
        Velocity {
            trk: util::atan2_safe(vx, vy),
            gs: util::sqrt_safe(vx * vx + vy * vy),
            v: Vect3::new(vx, vy, vz),
        }
    }

    fn with_cached(trk: f64, gs: f64, vx: f64, vy: f64, vz: f64) -> Velocity {
        Velocity {
            trk,
            gs,
            v: Vect3::new(vx, vy, vz),
        }
    }

    /// New velocity from Euclidean components, in internal units.
    pub fn mk_vxyz(vx: f64, vy: f64, vz: f64) -> Velocity {
        Velocity::from_cartesian(vx, vy, vz)
    }

    /// New velocity from track, ground speed and vertical speed.
    pub fn mk_trk_gs_vs(trk: f64, gs: f64, vs: f64) -> Velocity {
        Velocity::with_cached(trk, gs, trkgs2vx(trk, gs), trkgs2vy(trk, gs), vs)
    }

    pub fn make(v: Vect3) -> Velocity {
        Velocity::from_cartesian(v.x, v.y, v.z)
    }

    pub fn make2d(v: Vect2) -> Velocity {
        Velocity::from_cartesian(v.x, v.y, 0.0)
    }

    /// Compass track from `p1` to `p2`.
    pub fn track(p1: Vect3, p2: Vect3) -> f64 {
        util::atan2_safe(p2.x - p1.x, p2.y - p1.y)
    }

    pub fn vect3(&self) -> Vect3 {
        self.v
    }

    pub fn vect2(&self) -> Vect2 {
        self.v.vect2()
    }

    pub fn x(&self) -> f64 {
        self.v.x
    }

    pub fn y(&self) -> f64 {
        self.v.y
    }

    pub fn z(&self) -> f64 {
        self.v.z
    }

    /// Compass track in `[0, 2pi)`.
    pub fn trk(&self) -> f64 {
        util::to_2pi(self.trk)
    }

    pub fn gs(&self) -> f64 {
        self.gs
    }

    pub fn vs(&self) -> f64 {
        self.v.z
    }

    pub fn is_zero(&self) -> bool {
        self.v.is_zero()
    }

    pub fn is_invalid(&self) -> bool {
        self.v.is_invalid()
    }

    pub fn neg(&self) -> Velocity {
        Velocity::with_cached(
            util::to_pi(self.trk + std::f64::consts::PI),
            self.gs,
            -self.v.x,
            -self.v.y,
            -self.v.z,
        )
    }

    /// Vector sum. A sum that cancels the horizontal component keeps the
    /// original track.
    pub fn add(&self, v: Vect3) -> Velocity {
        if util::almost_equals(self.v.x, -v.x) && util::almost_equals(self.v.y, -v.y) {
            return Velocity::with_cached(self.trk, 0.0, 0.0, 0.0, self.v.z + v.z);
        }
        Velocity::mk_vxyz(self.v.x + v.x, self.v.y + v.y, self.v.z + v.z)
    }

    /// Vector difference. A difference that cancels the horizontal
    /// component keeps the original track.
    pub fn sub(&self, v: Vect3) -> Velocity {
        if util::almost_equals(self.v.x, v.x) && util::almost_equals(self.v.y, v.y) {
            return Velocity::with_cached(self.trk, 0.0, 0.0, 0.0, self.v.z - v.z);
        }
        Velocity::mk_vxyz(self.v.x - v.x, self.v.y - v.y, self.v.z - v.z)
    }

    /// Unit 2-D vector along the track.
    pub fn hat2d(&self) -> Vect2 {
        Vect2::new(self.trk.sin(), self.trk.cos())
    }

    /// Rotate the vector by `atrk` (positive is clockwise), using one
    /// sine and one cosine rather than rebuilding from polar form.
    pub fn mk_add_trk(&self, atrk: f64) -> Velocity {
        let s = atrk.sin();
        let c = atrk.cos();
        Velocity::with_cached(
            util::to_pi(self.trk + atrk),
            self.gs,
            self.v.x * c + self.v.y * s,
            -self.v.x * s + self.v.y * c,
            self.v.z,
        )
    }

    /// Same velocity with only the track changed.
    pub fn mk_trk(&self, trk: f64) -> Velocity {
        Velocity::mk_trk_gs_vs(trk, self.gs, self.v.z)
    }

    /// Same velocity with only the ground speed changed. Negative ground
    /// speed is out of domain and yields the INVALID sentinel.
    pub fn mk_gs(&self, ags: f64) -> Velocity {
        if ags < 0.0 {
            return Velocity::INVALID;
        }
        if self.gs > 0.0 {
            let scal = ags / self.gs;
            Velocity::with_cached(self.trk, ags, self.v.x * scal, self.v.y * scal, self.v.z)
        } else {
            Velocity::mk_trk_gs_vs(self.trk, ags, self.v.z)
        }
    }

    /// Same velocity with only the vertical speed changed.
    pub fn mk_vs(&self, vs: f64) -> Velocity {
        Velocity::with_cached(self.trk, self.gs, self.v.x, self.v.y, vs)
    }

    pub fn almost_equals(&self, w: Velocity) -> bool {
        self.v.almost_equals(w.v)
    }
}

impl PartialEq for Velocity {
    fn eq(&self, other: &Self) -> bool {
        self.v == other.v
    }
}

/// x component of a track/ground-speed pair.
pub fn trkgs2vx(trk: f64, gs: f64) -> f64 {
    gs * trk.sin()
}

/// y component of a track/ground-speed pair.
pub fn trkgs2vy(trk: f64, gs: f64) -> f64 {
    gs * trk.cos()
}

/// 2-D vector of a track/ground-speed pair.
pub fn trkgs2v(trk: f64, gs: f64) -> Vect2 {
    Vect2::new(trkgs2vx(trk, gs), trkgs2vy(trk, gs))
}
