//! Closed-form trajectory projections.
//!
//! Every function here is pure: it takes a position/velocity pair and
//! returns a new one at time `t` (or distance `d`), never mutating its
//! inputs and never failing. Out-of-domain inputs produce the INVALID
//! sentinels or negative times.

use std::f64::consts::PI;

use tracing::debug;

use crate::units::GN;
use crate::util;
use crate::vect::{Vect2, Vect3};
use crate::velocity::Velocity;

/// A position/velocity pair.
pub type StateVector = (Vect3, Velocity);

// ---------------------------------------------------------------------
// Turn geometry helpers
// ---------------------------------------------------------------------

/// Turn radius for a ground speed and bank angle under gravity `g`.
/// Returns 0 when `|bank| >= pi/2` and `f64::MAX` for a zero bank.
pub fn turn_radius_g(speed: f64, bank: f64, g: f64) -> f64 {
    let abank = bank.abs();
    let g = if g <= 0.0 { GN } else { g };
    if abank >= PI / 2.0 {
        return 0.0;
    }
    if abank == 0.0 {
        return f64::MAX;
    }
    speed * speed / (g * abank.tan())
}

/// Turn radius under standard sea-level gravity.
pub fn turn_radius(speed: f64, bank: f64) -> f64 {
    turn_radius_g(speed, bank, GN)
}

/// Turn radius from speed and track rate.
pub fn turn_radius_by_rate(speed: f64, omega: f64) -> f64 {
    if util::almost_equals(omega, 0.0) {
        return f64::MAX;
    }
    (speed / omega).abs()
}

/// Ground speed of a turn with radius `R` at the given bank angle.
/// NaN when `|bank| >= pi/2`.
pub fn speed_of_turn(r: f64, bank: f64) -> f64 {
    let abank = bank.abs();
    if abank >= PI / 2.0 {
        debug!(bank, "speed_of_turn: bank angle out of domain");
        return f64::NAN;
    }
    (GN * abank.tan() * r).sqrt()
}

/// Track rate from ground speed and bank angle; positive is a right
/// turn.
pub fn turn_rate(speed: f64, bank: f64) -> f64 {
    if util::almost_equals(bank, 0.0) {
        return 0.0;
    }
    GN * bank.tan() / speed
}

/// Track rate from ground speed and radius. Does not carry the turn
/// direction.
pub fn turn_rate_radius(speed: f64, r: f64) -> f64 {
    if util::almost_equals(r, 0.0) {
        return f64::MAX;
    }
    speed / r
}

/// Unsigned bank angle used for a turn of radius `R` at `speed`.
pub fn bank_angle_radius(speed: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    util::atan2_safe(speed * speed, r * GN)
}

/// Bank angle for the minimum turn from `track` to `goal_track`;
/// positive means turn right.
pub fn bank_angle_goal(track: f64, goal_track: f64, max_bank: f64) -> f64 {
    util::turn_dir(track, goal_track) as f64 * max_bank
}

/// Bank angle that produces the given track rate at `speed`.
pub fn bank_angle(speed: f64, turn_rate: f64) -> f64 {
    (turn_rate * speed / GN).atan()
}

/// Track rate for the minimum turn to `goal_track` at bank `max_bank`.
pub fn turn_rate_goal(vo: Velocity, goal_track: f64, max_bank: f64) -> f64 {
    let bank = bank_angle_goal(vo.trk(), goal_track, max_bank);
    turn_rate(vo.gs(), bank)
}

/// Time to turn through `delta_track` at the given bank angle.
pub fn turn_time_delta(ground_speed: f64, delta_track: f64, bank: f64) -> f64 {
    let omega = turn_rate(ground_speed, bank);
    if omega == 0.0 {
        return f64::MAX;
    }
    (delta_track / omega).abs()
}

/// Time for the minimum turn from `v0`'s track to `goal_track`.
pub fn turn_time(v0: Velocity, goal_track: f64, max_bank: f64) -> f64 {
    let delta = util::signed_turn_delta(v0.trk(), goal_track);
    turn_time_delta(v0.gs(), delta, max_bank)
}

/// Time to reach `goal_track` turning in the direction given by
/// `turn_right`; can exceed a half-turn.
pub fn turn_time_dir(v0: Velocity, goal_track: f64, max_bank: f64, turn_right: bool) -> f64 {
    let delta = util::turn_delta_dir(v0.trk(), goal_track, if turn_right { 1 } else { -1 });
    turn_time_delta(v0.gs(), delta, max_bank)
}

/// Has a turn moving in direction `turn_right` passed `target_track`?
pub fn turn_done(current_track: f64, target_track: f64, turn_right: bool) -> bool {
    if util::turn_delta(current_track, target_track) < 0.0001 {
        return true;
    }
    if turn_right {
        !util::clockwise(current_track, target_track)
    } else {
        util::clockwise(current_track, target_track)
    }
}

/// True if the minimum turn to `goal_track` is to the right.
pub fn turn_right(vo: Velocity, goal_track: f64) -> bool {
    util::clockwise(vo.trk(), goal_track)
}

/// Center of the turn with track rate `omega` starting at `(s0, v0)`.
pub fn center(s0: Vect3, v0: Velocity, omega: f64) -> Vect2 {
    let v = v0.gs();
    let theta = v0.trk();
    let r = v / omega;
    Vect2::new(s0.x + r * theta.cos(), s0.y - r * theta.sin())
}

/// Center of the turn with radius `R` from a 2-D state; `dir` is +1
/// for a right turn, -1 for a left turn.
pub fn center_of_turn(so: Vect2, trk: f64, r: f64, dir: i32) -> Vect2 {
    Vect2::new(
        so.x + dir as f64 * r * trk.cos(),
        so.y - dir as f64 * r * trk.sin(),
    )
}

// ---------------------------------------------------------------------
// Projections
// ---------------------------------------------------------------------

/// Straight-line projection.
pub fn linear(s0: Vect3, v0: Velocity, t: f64) -> StateVector {
    (s0.linear(v0.vect3(), t), v0)
}

/// Position/velocity after `t` seconds turning at track rate `omega`.
///
/// Uses one sine and one cosine (through the velocity rotation) so the
/// update stays stable as `omega -> 0`, where it coincides with
/// [`linear`].
pub fn turn_omega(s0: Vect3, v0: Velocity, t: f64, omega: f64) -> StateVector {
    if util::almost_equals(omega, 0.0) {
        return linear(s0, v0, t);
    }
    let nv = v0.mk_add_trk(omega * t);
    let xt = s0.x + (v0.y() - nv.y()) / omega;
    let yt = s0.y + (-v0.x() + nv.x()) / omega;
    let zt = s0.z + v0.z() * t;
    (Vect3::new(xt, yt, zt), nv)
}

/// Position/velocity after `t` seconds turning with radius `R` in the
/// direction given by `turn_right`.
pub fn turn(s0: Vect3, v0: Velocity, t: f64, r: f64, turn_right: bool) -> StateVector {
    if util::almost_equals(r, 0.0) {
        return (s0, v0);
    }
    let dir = if turn_right { 1.0 } else { -1.0 };
    let omega = dir * v0.gs() / r;
    turn_omega(s0, v0, t, omega)
}

/// Position/velocity after `t` seconds turning at bank angle `bank`;
/// the sign of the bank selects the direction.
pub fn turn_by_bank(s0: Vect3, v0: Velocity, t: f64, bank: f64) -> StateVector {
    if util::almost_equals(bank, 0.0) {
        linear(s0, v0, t)
    } else {
        let r = turn_radius(v0.gs(), bank);
        turn(s0, v0, t, r, bank >= 0.0)
    }
}

/// Position/velocity after advancing a signed distance `d` along the
/// arc centered at `center` (altitude is not computed). Undefined when
/// `so` coincides with the center: returns an INVALID velocity.
pub fn turn_by_dist_2d(so: Vect3, arc_center: Vect3, dir: i32, d: f64, gs_at_d: f64) -> StateVector {
    let r = so.distance_h(arc_center);
    if r == 0.0 {
        return (so, Velocity::INVALID);
    }
    let alpha = dir as f64 * d / r;
    let trk_from_center = Velocity::track(arc_center, so);
    let n_trk = trk_from_center + alpha;
    let sn = arc_center.linear_by_dist_2d(n_trk, r).mk_z(0.0);
    let final_trk = n_trk + dir as f64 * PI / 2.0;
    let vn = Velocity::mk_trk_gs_vs(final_trk, gs_at_d, 0.0);
    (sn, vn)
}

/// Turn at rate `omega` for `turn_time` seconds, then continue straight
/// up to time `t`. Can turn through more than a half-circle.
pub fn turn_until_time_omega(
    s0: Vect3,
    v0: Velocity,
    t: f64,
    turn_time: f64,
    omega: f64,
) -> StateVector {
    if t <= turn_time {
        turn_omega(s0, v0, t, omega)
    } else {
        let (s1, v1) = turn_omega(s0, v0, turn_time, omega);
        linear(s1, v1, t - turn_time)
    }
}

/// Turn in the minimum direction until `goal_track` is reached, then
/// continue straight for the remainder of `t`.
pub fn turn_until(s0: Vect3, v0: Velocity, t: f64, goal_track: f64, max_bank: f64) -> StateVector {
    let omega = turn_rate_goal(v0, goal_track, max_bank);
    let tt = turn_time(v0, goal_track, max_bank);
    turn_until_time_omega(s0, v0, t, tt, omega)
}

/// Position at the end of the minimum turn to `goal_track`.
pub fn position_after_turn(s0: Vect3, v0: Velocity, goal_track: f64, max_bank: f64) -> Vect3 {
    let omega = turn_rate_goal(v0, goal_track, max_bank);
    let tt = turn_time(v0, goal_track, max_bank);
    turn_omega(s0, v0, tt, omega).0
}

// ---------------------------------------------------------------------
// Ground-speed acceleration
// ---------------------------------------------------------------------

fn gs_accel_pos(so: Vect3, vo: Velocity, t: f64, a: f64) -> Vect3 {
    let so2 = so.vect2();
    let vo2 = vo.vect2();
    let sk = so2 + vo2.hat() * (vo2.norm() * t + 0.5 * a * t * t);
    Vect3::from_vect2(sk, so.z + vo.z() * t)
}

/// Position/velocity after a constant ground-speed acceleration for `t`
/// seconds. Altitude is linear.
pub fn gs_accel(so: Vect3, vo: Velocity, t: f64, a: f64) -> StateVector {
    let ngs = vo.gs() + a * t;
    (gs_accel_pos(so, vo, t, a), vo.mk_gs(ngs))
}

/// Time to accelerate from `gs0` to `goal_gs` at rate `accel`
/// (made positive if the caller passes a negative one).
pub fn gs_accel_time(gs0: f64, goal_gs: f64, accel: f64) -> f64 {
    let accel = if accel < 0.0 {
        debug!(accel, "gs_accel_time: negative acceleration, using magnitude");
        -accel
    } else {
        accel
    };
    let delta = (gs0 - goal_gs).abs();
    if delta == 0.0 {
        return 0.0;
    }
    delta / accel
}

/// Accelerate (or decelerate) to `goal_gs`, then hold it for the rest of
/// `t`.
pub fn gs_accel_until(so: Vect3, vo: Velocity, t: f64, goal_gs: f64, accel: f64) -> StateVector {
    let accel = accel.abs();
    let accel_time = gs_accel_time(vo.gs(), goal_gs, accel);
    let sgn = if goal_gs < vo.gs() { -1.0 } else { 1.0 };
    let a = sgn * accel;
    if t <= accel_time {
        gs_accel(so, vo, t, a)
    } else {
        let (ns, nv) = gs_accel(so, vo, accel_time, a);
        gs_accel(ns, nv, t - accel_time, 0.0)
    }
}

// ---------------------------------------------------------------------
// Vertical-speed acceleration
// ---------------------------------------------------------------------

fn vs_accel_pos(so: Vect3, vo: Velocity, t: f64, a: f64) -> Vect3 {
    Vect3::new(
        so.x + t * vo.x(),
        so.y + t * vo.y(),
        so.z + vo.z() * t + 0.5 * a * t * t,
    )
}

/// Position/velocity after a constant vertical acceleration for `t`
/// seconds. Horizontal motion is linear.
pub fn vs_accel(so: Vect3, vo: Velocity, t: f64, a: f64) -> StateVector {
    let nvs = vo.vs() + a * t;
    (vs_accel_pos(so, vo, t, a), vo.mk_vs(nvs))
}

/// Time to change vertical speed from `vs` to `goal_vs` at rate `accel`.
pub fn vs_accel_time(vs: f64, goal_vs: f64, accel: f64) -> f64 {
    ((vs - goal_vs) / accel).abs()
}

/// Accelerate vertically to `goal_vs`, then hold it for the rest of `t`.
pub fn vs_accel_until(so: Vect3, vo: Velocity, t: f64, goal_vs: f64, accel: f64) -> StateVector {
    let accel = if accel < 0.0 {
        debug!(accel, "vs_accel_until: negative acceleration, using magnitude");
        -accel
    } else {
        accel
    };
    let accel_time = vs_accel_time(vo.vs(), goal_vs, accel);
    let sgn = if goal_vs < vo.vs() { -1.0 } else { 1.0 };
    if t <= accel_time {
        vs_accel(so, vo, t, sgn * accel)
    } else {
        let pos_end = vs_accel_pos(so, vo, accel_time, sgn * accel);
        let nvo = Velocity::mk_vxyz(vo.x(), vo.y(), goal_vs);
        linear(pos_end, nvo, t - accel_time)
    }
}

// ---------------------------------------------------------------------
// Vertical level-out
// ---------------------------------------------------------------------

/// Phase times and accelerations of a level-out maneuver: accelerate to
/// the climb rate until `t1`, hold it until `t2`, decelerate to zero
/// vertical speed at `t3`. A negative `t1` marks an infeasible request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelOutTimes {
    pub t1: f64,
    pub t2: f64,
    pub t3: f64,
    pub a1: f64,
    pub a2: f64,
}

fn lo_v1(voz: f64, a1: f64, t: f64) -> f64 {
    voz + a1 * t
}

fn lo_s1(voz: f64, a1: f64, t: f64) -> f64 {
    voz * t + 0.5 * a1 * t * t
}

fn lo_t3(voz: f64, a1: f64) -> f64 {
    -voz / a1
}

fn lo_s3(voz: f64, a1: f64) -> f64 {
    lo_s1(voz, a1, lo_t3(voz, a1))
}

// Core of the level-out timing, assuming the initial vertical speed
// does not oppose the required direction of altitude change.
fn vs_level_out_times_ad(
    s0z: f64,
    v0z: f64,
    climb_rate: f64,
    target_alt: f64,
    accel_up: f64,
    accel_down: f64,
    allow_climb_rate_change: bool,
) -> LevelOutTimes {
    let alt_dir = if target_alt >= s0z { 1.0 } else { -1.0 };
    let mut climb_rate = alt_dir * climb_rate.abs();
    if allow_climb_rate_change {
        climb_rate = alt_dir * f64::max(climb_rate.abs(), v0z.abs());
    }
    let s = target_alt - s0z;
    let a1 = if climb_rate >= v0z { accel_up } else { accel_down };
    let a2 = if target_alt >= s0z { accel_down } else { accel_up };
    let t1 = (climb_rate - v0z) / a1;

    if s.abs() >= (lo_s1(v0z, a1, t1) + lo_s3(lo_v1(v0z, a1, t1), a2)).abs() {
        // Normal case: a constant-rate phase exists.
        let t2 = (s - lo_s1(v0z, a1, t1) - lo_s3(lo_v1(v0z, a1, t1), a2)) / climb_rate;
        LevelOutTimes {
            t1,
            t2: t1 + t2,
            t3: t1 + t2 + lo_t3(climb_rate, a2),
            a1,
            a2,
        }
    } else {
        // Degenerate case: no constant-rate phase. Reduce the climb rate
        // by solving aa*T1^2 + bb*T1 + cc = 0 for the acceleration time.
        let aa = 0.5 * a1 * (1.0 - a1 / a2);
        let bb = v0z * (1.0 - a1 / a2);
        let cc = -v0z * v0z / (2.0 * a2) - s;
        let root1 = util::root(aa, bb, cc, 1);
        let root2 = util::root(aa, bb, cc, -1);
        let t1 = if root1 < 0.0 {
            root2
        } else if root2 < 0.0 {
            root1
        } else {
            root1.min(root2)
        };
        LevelOutTimes {
            t1,
            t2: t1,
            t3: t1 + lo_t3(lo_v1(v0z, a1, t1), a2),
            a1,
            a2,
        }
    }
}

/// Phase times `(T1,T2,T3)` and accelerations `(a1,a2)` of a level-out
/// from vertical state `(s0z, v0z)` to `target_alt`.
pub fn vs_level_out_times(
    s0z: f64,
    v0z: f64,
    climb_rate: f64,
    target_alt: f64,
    accel_up: f64,
    accel_down: f64,
    allow_climb_rate_change: bool,
) -> LevelOutTimes {
    let sgnv = if v0z >= 0.0 { 1 } else { -1 };
    let alt_dir = if target_alt >= s0z { 1 } else { -1 };
    let s = target_alt - s0z;
    let a1 = if target_alt >= s0z { accel_up } else { accel_down };
    let a2 = if target_alt >= s0z { accel_down } else { accel_up };

    if sgnv == alt_dir || util::almost_equals(v0z, 0.0) {
        if s.abs() >= lo_s3(v0z, a2).abs() {
            vs_level_out_times_ad(
                s0z,
                v0z,
                climb_rate,
                target_alt,
                accel_up,
                accel_down,
                allow_climb_rate_change,
            )
        } else {
            // Overshoot along the current direction: level off first,
            // then move back.
            let ot = vs_level_out_times_ad(
                s0z + lo_s3(v0z, a2),
                0.0,
                climb_rate,
                target_alt,
                accel_up,
                accel_down,
                allow_climb_rate_change,
            );
            let shift = -v0z / a2;
            LevelOutTimes {
                t1: shift + ot.t1,
                t2: shift + ot.t2,
                t3: shift + ot.t3,
                a1: ot.a1,
                a2: ot.a2,
            }
        }
    } else {
        // Moving away from the target altitude: cancel the vertical
        // speed, then run the aligned case from the turnaround point.
        let ot = vs_level_out_times_ad(
            s0z + lo_s3(v0z, a1),
            0.0,
            climb_rate,
            target_alt,
            accel_up,
            accel_down,
            allow_climb_rate_change,
        );
        let shift = -v0z / a1;
        LevelOutTimes {
            t1: shift + ot.t1,
            t2: shift + ot.t2,
            t3: shift + ot.t3,
            a1: ot.a1,
            a2: ot.a2,
        }
    }
}

// Vertical position and speed at time `t` of the three-phase profile.
fn vs_level_out_calc(
    soz: f64,
    voz: f64,
    target_alt: f64,
    times: &LevelOutTimes,
    t: f64,
) -> (f64, f64) {
    let LevelOutTimes { t1, t2, t3, a1, a2 } = *times;
    if t <= t1 {
        (soz + lo_s1(voz, a1, t), voz + a1 * t)
    } else if t <= t2 {
        (
            soz + lo_s1(voz, a1, t1) + lo_v1(voz, a1, t1) * (t - t1),
            voz + a1 * t1,
        )
    } else if t <= t3 {
        (
            soz + lo_s1(voz, a1, t1)
                + lo_v1(voz, a1, t1) * (t2 - t1)
                + lo_s1(lo_v1(voz, a1, t1), a2, t - t2),
            voz + a1 * t1 + a2 * (t - t2),
        )
    } else {
        (target_alt, 0.0)
    }
}

/// State at time `t` of a level-out with precomputed phase data.
pub fn vs_level_out_at(
    s0: Vect3,
    v0: Velocity,
    target_alt: f64,
    times: &LevelOutTimes,
    t: f64,
) -> StateVector {
    let (nz, nvs) = vs_level_out_calc(s0.z, v0.z(), target_alt, times, t);
    let ns = s0.linear(v0.vect3(), t).mk_z(nz);
    (ns, v0.mk_vs(nvs))
}

/// State at time `t` of a level-out maneuver: accelerate to
/// `climb_rate`, hold, then decelerate to level flight at `target_alt`.
pub fn vs_level_out(
    s0: Vect3,
    v0: Velocity,
    t: f64,
    climb_rate: f64,
    target_alt: f64,
    a: f64,
    allow_climb_rate_change: bool,
) -> StateVector {
    let times = vs_level_out_times(
        s0.z,
        v0.z(),
        climb_rate,
        target_alt,
        a,
        -a,
        allow_climb_rate_change,
    );
    vs_level_out_at(s0, v0, target_alt, &times, t)
}

/// Final state and relative time of a level-out, or
/// `(INVALID, INVALID, -1.0)` when the request is infeasible.
pub fn vs_level_out_final(
    s0: Vect3,
    v0: Velocity,
    climb_rate: f64,
    target_alt: f64,
    a: f64,
    allow_climb_rate_change: bool,
) -> (Vect3, Velocity, f64) {
    let times = vs_level_out_times(
        s0.z,
        v0.z(),
        climb_rate,
        target_alt,
        a,
        -a,
        allow_climb_rate_change,
    );
    if times.t1 < 0.0 || times.t1.is_nan() {
        return (Vect3::INVALID, Velocity::INVALID, -1.0);
    }
    let (ns, nv) = vs_level_out_at(s0, v0, target_alt, &times, times.t3);
    (ns, nv, times.t3)
}

/// Total time of a level-out maneuver; -1 when infeasible.
pub fn vs_level_out_time(
    s0: Vect3,
    v0: Velocity,
    climb_rate: f64,
    target_alt: f64,
    a: f64,
    allow_climb_rate_change: bool,
) -> f64 {
    let times = vs_level_out_times(
        s0.z,
        v0.z(),
        climb_rate,
        target_alt,
        a,
        -a,
        allow_climb_rate_change,
    );
    if times.t1 < 0.0 || times.t1.is_nan() {
        -1.0
    } else {
        times.t3
    }
}

// ---------------------------------------------------------------------
// Maneuver-vs-traffic loss scans
// ---------------------------------------------------------------------

/// Scan a track maneuver against linear traffic in 1 s steps over
/// `stop_time`, checking the `(d, h)` separation cylinder.
pub fn test_los_trk(
    so: Vect3,
    vo: Velocity,
    nvo: Velocity,
    si: Vect3,
    vi: Velocity,
    bank_angle: f64,
    stop_time: f64,
    d: f64,
    h: f64,
) -> bool {
    let mut t = 0.0;
    while t < stop_time {
        let so_at = turn_until(so, vo, t, nvo.trk(), bank_angle).0;
        let si_at = si.linear(vi.vect3(), t);
        let rel = so_at - si_at;
        if rel.norm2d() < d && rel.z.abs() < h {
            return true;
        }
        t += 1.0;
    }
    false
}

/// Scan a ground-speed maneuver against linear traffic in 1 s steps.
pub fn test_los_gs(
    so: Vect3,
    vo: Velocity,
    nvo: Velocity,
    si: Vect3,
    vi: Velocity,
    gs_accel_rate: f64,
    stop_time: f64,
    d: f64,
    h: f64,
) -> bool {
    let mut t = 0.0;
    while t < stop_time {
        let so_at = gs_accel_until(so, vo, t, nvo.gs(), gs_accel_rate).0;
        let si_at = si.linear(vi.vect3(), t);
        let rel = so_at - si_at;
        if rel.norm2d() < d && rel.z.abs() < h {
            return true;
        }
        t += 1.0;
    }
    false
}

/// Scan a vertical-speed maneuver against linear traffic in 1 s steps.
pub fn test_los_vs(
    so: Vect3,
    vo: Velocity,
    nvo: Velocity,
    si: Vect3,
    vi: Velocity,
    vs_accel_rate: f64,
    stop_time: f64,
    d: f64,
    h: f64,
) -> bool {
    let mut t = 0.0;
    while t < stop_time {
        let so_at = vs_accel_until(so, vo, t, nvo.vs(), vs_accel_rate).0;
        let si_at = si.linear(vi.vect3(), t);
        let rel = so_at - si_at;
        if rel.norm2d() < d && rel.z.abs() < h {
            return true;
        }
        t += 1.0;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn sv(x: f64, y: f64, z: f64, trk: f64, gs: f64, vs: f64) -> StateVector {
        (Vect3::new(x, y, z), Velocity::mk_trk_gs_vs(trk, gs, vs))
    }

    #[test]
    fn test_linear() {
        let (s, v) = sv(0.0, 0.0, 100.0, FRAC_PI_2, 50.0, 2.0);
        let (s1, v1) = linear(s, v, 10.0);
        assert_relative_eq!(s1.x, 500.0, epsilon = 1e-9);
        assert_relative_eq!(s1.z, 120.0, epsilon = 1e-9);
        assert_eq!(v1, v);
    }

    #[test]
    fn test_turn_omega_reverses_in_time() {
        let (s, v) = sv(100.0, -50.0, 300.0, 0.7, 120.0, -3.0);
        let omega = 0.05;
        let (s1, v1) = turn_omega(s, v, 12.0, omega);
        let (s2, v2) = turn_omega(s1, v1, -12.0, omega);
        assert_relative_eq!(s2.x, s.x, epsilon = 1e-9);
        assert_relative_eq!(s2.y, s.y, epsilon = 1e-9);
        assert_relative_eq!(s2.z, s.z, epsilon = 1e-9);
        assert_relative_eq!(v2.x(), v.x(), epsilon = 1e-9);
        assert_relative_eq!(v2.y(), v.y(), epsilon = 1e-9);
    }

    #[test]
    fn test_turn_omega_linear_in_limit() {
        let (s, v) = sv(0.0, 0.0, 0.0, 0.3, 100.0, 0.0);
        let (sl, _) = linear(s, v, 10.0);
        let (st, _) = turn_omega(s, v, 10.0, 1e-12);
        assert!((st - sl).norm() < 1e-6);
        // and an omega small enough to be almost zero short-circuits
        let (se, _) = turn_omega(s, v, 10.0, 1e-14);
        assert_eq!(se, sl);
    }

    #[test]
    fn test_turn_preserves_gs_and_changes_heading() {
        let (s, v) = sv(0.0, 0.0, 0.0, 0.0, 100.0, 0.0);
        let omega = 0.02;
        let t = 25.0;
        let (_, v1) = turn_omega(s, v, t, omega);
        assert_relative_eq!(v1.gs(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(v1.trk(), omega * t, epsilon = 1e-12);
    }

    #[test]
    fn test_turn_until_track_reaches_goal() {
        // S4: trk 0 -> pi/2 at bank pi/6, gs 100
        let (s, v) = sv(0.0, 0.0, 0.0, 0.0, 100.0, 0.0);
        let goal = FRAC_PI_2;
        let bank = PI / 6.0;
        // the 90 degree turn takes ~27.7 s at this bank and speed
        let (sf, vf) = turn_until(s, v, 30.0, goal, bank);
        assert_relative_eq!(vf.trk(), goal, epsilon = 1e-6);
        assert_relative_eq!(vf.gs(), 100.0, epsilon = 1e-9);
        // while still turning, the position stays on the circle around
        // the turn center
        let omega = turn_rate_goal(v, goal, bank);
        let c = center(s, v, omega);
        let r = turn_radius(100.0, bank);
        let (s5, _) = turn_until(s, v, 5.0, goal, bank);
        let dist = (s5.vect2() - c).norm();
        assert_relative_eq!(dist, r, epsilon = 1e-6);
        assert!(sf.x > 0.0 && sf.y > 0.0);
    }

    #[test]
    fn test_turn_by_dist_2d_degenerate_center() {
        let so = Vect3::new(10.0, 10.0, 0.0);
        let (s, v) = turn_by_dist_2d(so, so, 1, 100.0, 50.0);
        assert_eq!(s, so);
        assert!(v.is_invalid());
    }

    #[test]
    fn test_turn_by_dist_2d_quarter_circle() {
        // start east of center, turn left a quarter of the circle
        let c = Vect3::ZERO;
        let so = Vect3::new(100.0, 0.0, 0.0);
        let quarter = 100.0 * FRAC_PI_2;
        let (s, v) = turn_by_dist_2d(so, c, -1, quarter, 30.0);
        assert_relative_eq!(s.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(s.y, 100.0, epsilon = 1e-9);
        assert_relative_eq!(v.gs(), 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_turn_radius_domain() {
        assert_eq!(turn_radius(100.0, FRAC_PI_2), 0.0);
        assert_eq!(turn_radius(100.0, 0.0), f64::MAX);
        assert!(turn_radius(100.0, 0.4) > 0.0);
        assert!(speed_of_turn(1000.0, FRAC_PI_2).is_nan());
    }

    #[test]
    fn test_gs_accel() {
        let (s, v) = sv(0.0, 0.0, 0.0, FRAC_PI_2, 50.0, 0.0);
        let (s1, v1) = gs_accel(s, v, 10.0, 2.0);
        assert_relative_eq!(v1.gs(), 70.0, epsilon = 1e-9);
        // x = 50*10 + 0.5*2*100 = 600
        assert_relative_eq!(s1.x, 600.0, epsilon = 1e-9);
        assert_relative_eq!(v1.trk(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_gs_accel_until_holds_goal() {
        let (s, v) = sv(0.0, 0.0, 0.0, FRAC_PI_2, 50.0, 0.0);
        let (_, v1) = gs_accel_until(s, v, 30.0, 70.0, 2.0);
        assert_relative_eq!(v1.gs(), 70.0, epsilon = 1e-9);
        // deceleration also works
        let (_, v2) = gs_accel_until(s, v, 30.0, 30.0, 2.0);
        assert_relative_eq!(v2.gs(), 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vs_accel() {
        let (s, v) = sv(0.0, 0.0, 100.0, 0.0, 50.0, 0.0);
        let (s1, v1) = vs_accel(s, v, 10.0, 0.5);
        assert_relative_eq!(v1.vs(), 5.0, epsilon = 1e-12);
        // z = 100 + 0 + 0.5*0.5*100 = 125
        assert_relative_eq!(s1.z, 125.0, epsilon = 1e-9);
        assert_relative_eq!(s1.y, 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vs_accel_until_reaches_goal() {
        let (s, v) = sv(0.0, 0.0, 0.0, 0.0, 50.0, 0.0);
        let (s1, v1) = vs_accel_until(s, v, 20.0, 5.0, 1.0);
        assert_relative_eq!(v1.vs(), 5.0, epsilon = 1e-12);
        // 5 s ramp gains 12.5 m, 15 s at 5 m/s gains 75 m
        assert_relative_eq!(s1.z, 87.5, epsilon = 1e-9);
    }

    #[test]
    fn test_vs_level_out_phase_times() {
        // S5: from level flight at 0 m to 300 m, climb 5 m/s, accel 2
        let times = vs_level_out_times(0.0, 0.0, 5.0, 300.0, 2.0, -2.0, true);
        assert_relative_eq!(times.t1, 2.5, epsilon = 1e-12);
        assert!(times.t3.is_finite());
        assert!(times.t2 > times.t1);
    }

    #[test]
    fn test_vs_level_out_reaches_target() {
        let s0 = Vect3::ZERO;
        let v0 = Velocity::mk_trk_gs_vs(0.0, 50.0, 0.0);
        let (sf, vf, t) = vs_level_out_final(s0, v0, 5.0, 300.0, 2.0, true);
        assert!(t > 0.0);
        assert_relative_eq!(sf.z, 300.0, epsilon = 1e-6);
        assert_relative_eq!(vf.vs(), 0.0, epsilon = 1e-9);
        // descending works symmetrically
        let s1 = Vect3::new(0.0, 0.0, 500.0);
        let (sd, vd, td) = vs_level_out_final(s1, v0, 5.0, 200.0, 2.0, true);
        assert!(td > 0.0);
        assert_relative_eq!(sd.z, 200.0, epsilon = 1e-6);
        assert_relative_eq!(vd.vs(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_vs_level_out_degenerate_short_hop() {
        // 2 m altitude change cannot fit a full 5 m/s climb phase
        let times = vs_level_out_times(0.0, 0.0, 5.0, 2.0, 2.0, -2.0, true);
        assert_relative_eq!(times.t1, times.t2, epsilon = 1e-12);
        let s0 = Vect3::ZERO;
        let v0 = Velocity::mk_trk_gs_vs(0.0, 50.0, 0.0);
        let (sf, _, _) = vs_level_out_final(s0, v0, 5.0, 2.0, 2.0, true);
        assert_relative_eq!(sf.z, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_vs_level_out_from_opposing_descent() {
        // descending at 8 m/s with the target above: the profile first
        // cancels the descent, then climbs and levels at the target
        let s0 = Vect3::new(0.0, 0.0, 100.0);
        let v0 = Velocity::mk_trk_gs_vs(0.0, 50.0, -8.0);
        let (sf, vf, t) = vs_level_out_final(s0, v0, 5.0, 300.0, 2.0, true);
        assert!(t > 0.0);
        assert_relative_eq!(sf.z, 300.0, epsilon = 1e-6);
        assert_relative_eq!(vf.vs(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_los_scan_detects_predicted_loss() {
        // ownship turning toward a converging intruder
        let so = Vect3::ZERO;
        let vo = Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0);
        let si = Vect3::new(2000.0, 2000.0, 0.0);
        let vi = Velocity::mk_trk_gs_vs(-FRAC_PI_2, 100.0, 0.0);
        let nvo = vo.mk_trk(FRAC_PI_2);
        assert!(test_los_trk(
            so,
            vo,
            nvo,
            si,
            vi,
            PI / 6.0,
            120.0,
            1000.0,
            100.0
        ));
        // straight-ahead maneuver against parallel traffic stays clear
        let vi_par = Velocity::mk_trk_gs_vs(0.0, 100.0, 0.0);
        let si_far = Vect3::new(5000.0, 0.0, 0.0);
        assert!(!test_los_trk(
            so, vo, vo, si_far, vi_par, 0.3, 120.0, 1000.0, 100.0
        ));
    }
}
