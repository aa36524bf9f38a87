//! Aircraft state snapshots consumed by the alerting logic.
//!
//! States are produced once per time step by the external reader and
//! consumed read-only here. Positions are Euclidean (the geodetic
//! projection is the reader's concern).

use serde::{Deserialize, Serialize};

use daa_kinematics::util;
use daa_kinematics::{Vect3, Velocity};

/// Sensor Uncertainty Mitigation data: position and velocity standard
/// deviations, in internal units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SumData {
    /// East/West position standard deviation.
    #[serde(default)]
    pub s_ew_std: f64,
    /// North/South position standard deviation.
    #[serde(default)]
    pub s_ns_std: f64,
    /// East/North position covariance term.
    #[serde(default)]
    pub s_en_std: f64,
    /// Vertical position standard deviation.
    #[serde(default)]
    pub sz_std: f64,
    /// East/West velocity standard deviation.
    #[serde(default)]
    pub v_ew_std: f64,
    /// North/South velocity standard deviation.
    #[serde(default)]
    pub v_ns_std: f64,
    /// East/North velocity covariance term.
    #[serde(default)]
    pub v_en_std: f64,
    /// Vertical velocity standard deviation.
    #[serde(default)]
    pub vz_std: f64,
}

impl SumData {
    pub const EMPTY: SumData = SumData {
        s_ew_std: 0.0,
        s_ns_std: 0.0,
        s_en_std: 0.0,
        sz_std: 0.0,
        v_ew_std: 0.0,
        v_ns_std: 0.0,
        v_en_std: 0.0,
        vz_std: 0.0,
    };

    // Semi-major axis of the uncertainty ellipse defined by the two
    // axis deviations and the covariance term.
    fn horizontal_uncertainty(x_std: f64, y_std: f64, xy_std: f64) -> f64 {
        let x2 = util::sq(x_std);
        let y2 = util::sq(y_std);
        util::sqrt_safe((x2 + y2) / 2.0 + ((x2 - y2) / 2.0).hypot(util::sq(xy_std)))
    }

    /// Aggregated horizontal position error.
    pub fn horizontal_position_error(&self) -> f64 {
        SumData::horizontal_uncertainty(self.s_ew_std, self.s_ns_std, self.s_en_std)
    }

    /// Aggregated horizontal speed error.
    pub fn horizontal_speed_error(&self) -> f64 {
        SumData::horizontal_uncertainty(self.v_ew_std, self.v_ns_std, self.v_en_std)
    }

    pub fn vertical_position_error(&self) -> f64 {
        self.sz_std
    }

    pub fn vertical_speed_error(&self) -> f64 {
        self.vz_std
    }

    /// True iff any deviation is set.
    pub fn has_uncertainty(&self) -> bool {
        *self != SumData::EMPTY
    }

    pub fn reset(&mut self) {
        *self = SumData::EMPTY;
    }
}

/// One aircraft at one time step: identifier, Euclidean position,
/// velocity, the 1-based alerter index it declares (0 = unset), and
/// optional sensor uncertainty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficState {
    pub id: String,
    pub s: Vect3,
    pub v: Velocity,
    #[serde(default)]
    pub alerter: usize,
    #[serde(default)]
    pub sum: SumData,
}

impl TrafficState {
    pub fn new(id: impl Into<String>, s: Vect3, v: Velocity) -> Self {
        TrafficState {
            id: id.into(),
            s,
            v,
            alerter: 1,
            sum: SumData::EMPTY,
        }
    }

    /// Set the declared alerter index (1-based).
    pub fn with_alerter(mut self, alerter: usize) -> Self {
        self.alerter = alerter;
        self
    }

    pub fn with_sum(mut self, sum: SumData) -> Self {
        self.sum = sum;
        self
    }

    /// A state is usable when it has an identifier and finite position
    /// and velocity components.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && self.s.x.is_finite()
            && self.s.y.is_finite()
            && self.s.z.is_finite()
            && !self.v.is_invalid()
            && self.v.vect3().x.is_finite()
            && self.v.vect3().y.is_finite()
            && self.v.vect3().z.is_finite()
    }

    /// The same aircraft `offset` seconds later under a linear
    /// projection.
    pub fn linear_projection(&self, offset: f64) -> TrafficState {
        TrafficState {
            id: self.id.clone(),
            s: self.s.linear(self.v.vect3(), offset),
            v: self.v,
            alerter: self.alerter,
            sum: self.sum,
        }
    }

    /// Index of the aircraft with the given id, if present.
    pub fn find_index(traffic: &[TrafficState], id: &str) -> Option<usize> {
        traffic.iter().position(|ac| ac.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_validity() {
        let ok = TrafficState::new("AC1", Vect3::ZERO, Velocity::mk_vxyz(10.0, 0.0, 0.0));
        assert!(ok.is_valid());
        let unnamed = TrafficState::new("", Vect3::ZERO, Velocity::ZERO);
        assert!(!unnamed.is_valid());
        let nan = TrafficState::new("AC2", Vect3::INVALID, Velocity::ZERO);
        assert!(!nan.is_valid());
    }

    #[test]
    fn test_linear_projection() {
        let ac = TrafficState::new(
            "AC1",
            Vect3::new(0.0, 0.0, 100.0),
            Velocity::mk_vxyz(50.0, 0.0, -2.0),
        );
        let later = ac.linear_projection(10.0);
        assert_relative_eq!(later.s.x, 500.0, epsilon = 1e-9);
        assert_relative_eq!(later.s.z, 80.0, epsilon = 1e-9);
        assert_eq!(later.v, ac.v);
        assert_eq!(later.id, "AC1");
    }

    #[test]
    fn test_sum_uncertainty_flags() {
        let mut sum = SumData::EMPTY;
        assert!(!sum.has_uncertainty());
        sum.s_ew_std = 50.0;
        assert!(sum.has_uncertainty());
        assert!(sum.horizontal_position_error() > 0.0);
        sum.reset();
        assert!(!sum.has_uncertainty());
    }

    #[test]
    fn test_sum_horizontal_aggregation_is_symmetric_axis_max() {
        let sum = SumData {
            s_ew_std: 30.0,
            s_ns_std: 40.0,
            ..SumData::EMPTY
        };
        // without covariance the aggregate is the larger axis deviation
        assert_relative_eq!(sum.horizontal_position_error(), 40.0, epsilon = 1e-9);
    }

    #[test]
    fn test_find_index() {
        let traffic = vec![
            TrafficState::new("A", Vect3::ZERO, Velocity::ZERO),
            TrafficState::new("B", Vect3::ZERO, Velocity::ZERO),
        ];
        assert_eq!(TrafficState::find_index(&traffic, "B"), Some(1));
        assert_eq!(TrafficState::find_index(&traffic, "C"), None);
    }
}
