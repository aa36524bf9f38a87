//! The per-intruder alerting decision.
//!
//! Given an ownship and a traffic list, pick the alerter (ownship- or
//! intruder-centric), optionally project all states forward by a fixed
//! time, and walk the ladder from the most severe level down: the first
//! level whose detector reports a conflict inside its alerting window
//! wins. A second pass produces the per-level time-to-volume column for
//! reporting.

use serde::{Deserialize, Serialize};

use daa_kinematics::{Vect3, Velocity};

use crate::alerter::Alerter;
use crate::detector::ConflictData;
use crate::errors::{DaaError, ErrorLog};
use crate::traffic::TrafficState;

/// Alerting configuration.
///
/// `alerters` is the 1-indexed list the per-aircraft alerter indices
/// point into. With `ownship_centric` (the default) every intruder is
/// judged by the ownship's declared alerter; otherwise by its own.
/// When `sum_enabled`, an intruder carrying sensor uncertainty is
/// alerted on the early alerting window instead of the nominal one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    pub ownship_centric: bool,
    pub sum_enabled: bool,
    /// Fixed projection applied to every state before detection [s].
    pub projection_time: f64,
    /// Global cap on every alerting window [s].
    pub lookahead_time: f64,
    pub alerters: Vec<Alerter>,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        AlertingConfig {
            ownship_centric: true,
            sum_enabled: false,
            projection_time: 0.0,
            lookahead_time: 180.0,
            alerters: vec![Alerter::dwc_phase_i()],
        }
    }
}

impl AlertingConfig {
    /// Alerter at a 1-based index.
    pub fn alerter_at(&self, index: usize) -> Option<&Alerter> {
        if (1..=self.alerters.len()).contains(&index) {
            Some(&self.alerters[index - 1])
        } else {
            None
        }
    }
}

/// The alerting engine: configuration plus a diagnostic log.
#[derive(Debug, Clone, Default)]
pub struct AlertingLogic {
    config: AlertingConfig,
    errors: ErrorLog,
}

impl AlertingLogic {
    pub fn new(config: AlertingConfig) -> Self {
        let mut errors = ErrorLog::new();
        for alerter in &config.alerters {
            alerter.validate(&mut errors);
        }
        AlertingLogic { config, errors }
    }

    pub fn config(&self) -> &AlertingConfig {
        &self.config
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn error_log_mut(&mut self) -> &mut ErrorLog {
        &mut self.errors
    }

    /// Alerter index used for the intruder at `idx` (0-based into
    /// `traffic`): the ownship's declared index under ownship-centric
    /// logic, the intruder's otherwise. 0 when out of range.
    pub fn alerter_index_of(
        &self,
        ownship: &TrafficState,
        traffic: &[TrafficState],
        idx: usize,
    ) -> usize {
        if idx < traffic.len() {
            if self.config.ownship_centric {
                ownship.alerter
            } else {
                traffic[idx].alerter
            }
        } else {
            0
        }
    }

    fn checked_states<'a>(
        &mut self,
        ownship: &'a TrafficState,
        traffic: &'a [TrafficState],
        idx: usize,
    ) -> Option<(&'a TrafficState, &'a TrafficState)> {
        let intruder = traffic.get(idx)?;
        if !ownship.is_valid() {
            self.errors.report(
                "alerting",
                DaaError::InputValidation(format!("invalid ownship state {}", ownship.id)),
            );
            return None;
        }
        if !intruder.is_valid() {
            self.errors.report(
                "alerting",
                DaaError::InputValidation(format!("invalid intruder state {}", intruder.id)),
            );
            return None;
        }
        if ownship.id == intruder.id {
            self.errors.report(
                "alerting",
                DaaError::InputValidation(format!("duplicate aircraft id {}", ownship.id)),
            );
            return None;
        }
        Some((ownship, intruder))
    }

    // Projected Euclidean states for one pair.
    fn projected_pair(
        &self,
        ownship: &TrafficState,
        intruder: &TrafficState,
    ) -> (Vect3, Velocity, Vect3, Velocity) {
        let t = self.config.projection_time;
        if t > 0.0 {
            let own = ownship.linear_projection(t);
            let intr = intruder.linear_projection(t);
            (own.s, own.v, intr.s, intr.v)
        } else {
            (ownship.s, ownship.v, intruder.s, intruder.v)
        }
    }

    // The alerting window of one level for one intruder, capped by the
    // global lookahead.
    fn alerting_window(
        &self,
        thresholds: &crate::alerter::AlertThresholds,
        intruder: &TrafficState,
    ) -> f64 {
        let time = if self.config.sum_enabled && intruder.sum.has_uncertainty() {
            thresholds.early_alerting_time()
        } else {
            thresholds.alerting_time()
        };
        f64::min(self.config.lookahead_time, time)
    }

    /// Most severe alert level warranted for the intruder at `idx`;
    /// 0 when no level fires, 0 as well when no alerter applies.
    pub fn alert_level(
        &mut self,
        ownship: &TrafficState,
        traffic: &[TrafficState],
        idx: usize,
    ) -> usize {
        let alerter_idx = self.alerter_index_of(ownship, traffic, idx);
        let Some(alerter) = self.config.alerter_at(alerter_idx) else {
            if alerter_idx != 0 {
                self.errors.report(
                    "alerting",
                    DaaError::ConfigurationInvalid(format!(
                        "alerter index {alerter_idx} out of range"
                    )),
                );
            }
            return 0;
        };
        let alerter = alerter.clone();
        let Some((own, intr)) = self.checked_states(ownship, traffic, idx) else {
            return 0;
        };
        let (so, vo, si, vi) = self.projected_pair(own, intr);
        let intruder = intr.clone();
        for level in (1..=alerter.most_severe_alert_level()).rev() {
            let thresholds = alerter.level(level).expect("level in range");
            if !thresholds.is_valid() {
                continue;
            }
            let detector = thresholds.detector();
            if detector.violation(so, vo, si, vi) {
                return level;
            }
            let window = self.alerting_window(thresholds, &intruder);
            if window > 0.0
                && detector
                    .conflict_detection(so, vo, si, vi, 0.0, window)
                    .conflict_before(window)
            {
                return level;
            }
        }
        0
    }

    /// Conflict data of a specific 1-based alert level against the
    /// intruder at `idx`, on that level's alerting window.
    pub fn violation_of_alert_thresholds(
        &mut self,
        ownship: &TrafficState,
        traffic: &[TrafficState],
        idx: usize,
        alert_level: usize,
    ) -> ConflictData {
        let alerter_idx = self.alerter_index_of(ownship, traffic, idx);
        let Some(alerter) = self.config.alerter_at(alerter_idx) else {
            return ConflictData::EMPTY;
        };
        let Some(thresholds) = alerter.level(alert_level) else {
            self.errors.report(
                "alerting",
                DaaError::ConfigurationInvalid(format!(
                    "alert level {alert_level} out of range for {}",
                    alerter.id()
                )),
            );
            return ConflictData::EMPTY;
        };
        let thresholds = thresholds.clone();
        let Some((own, intr)) = self.checked_states(ownship, traffic, idx) else {
            return ConflictData::EMPTY;
        };
        let (so, vo, si, vi) = self.projected_pair(own, intr);
        let window = self.alerting_window(&thresholds, intr);
        if window <= 0.0 {
            return ConflictData::EMPTY;
        }
        thresholds
            .detector()
            .conflict_detection(so, vo, si, vi, 0.0, window)
    }

    /// Per-level time to volume entry for the intruder at `idx`:
    /// `None` when that level's volume is not entered inside its
    /// window. This is the reporting column next to the alert level.
    pub fn time_to_volume(
        &mut self,
        ownship: &TrafficState,
        traffic: &[TrafficState],
        idx: usize,
    ) -> Vec<Option<f64>> {
        let alerter_idx = self.alerter_index_of(ownship, traffic, idx);
        let Some(alerter) = self.config.alerter_at(alerter_idx) else {
            return Vec::new();
        };
        let n = alerter.most_severe_alert_level();
        (1..=n)
            .map(|level| {
                let cd = self.violation_of_alert_thresholds(ownship, traffic, idx, level);
                if cd.conflict() {
                    Some(cd.time_in)
                } else {
                    None
                }
            })
            .collect()
    }
}
