//! Alert threshold ladders.
//!
//! An alerter is an ordered list of threshold sets, 1-indexed by
//! increasing severity. The ladder is expected to be monotone: the
//! volume of level `i` contains the volume of level `i+1`, so a level
//! firing implies every level below it fires. The component validates
//! but never reorders.

use serde::{Deserialize, Serialize};

use crate::detector::Detector;
use crate::errors::{DaaError, ErrorLog};
use crate::parameters::ParameterData;
use crate::tcas::Tcas3d;
use crate::wcv::{WcvTable, WcvTvar};

/// Coarse severity region attached to an alert level, consumed by the
/// downstream guidance colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandsRegion {
    None,
    Far,
    Mid,
    Near,
}

impl BandsRegion {
    pub fn name(&self) -> &'static str {
        match self {
            BandsRegion::None => "NONE",
            BandsRegion::Far => "FAR",
            BandsRegion::Mid => "MID",
            BandsRegion::Near => "NEAR",
        }
    }

    pub fn parse(s: &str) -> Option<BandsRegion> {
        match s {
            "NONE" => Some(BandsRegion::None),
            "FAR" => Some(BandsRegion::Far),
            "MID" => Some(BandsRegion::Mid),
            "NEAR" => Some(BandsRegion::Near),
            _ => None,
        }
    }
}

/// One rung of the ladder: a detector, its alerting time windows, and
/// a guidance region.
///
/// When the alerting time is positive the alert is based on predicted
/// conflict inside that window; at zero it degenerates to instantaneous
/// violation. The early alerting time is used instead of the nominal
/// one when the intruder carries sensor uncertainty and the SUM
/// configuration is on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    detector: Detector,
    alerting_time: f64,
    early_alerting_time: f64,
    region: BandsRegion,
}

impl AlertThresholds {
    pub fn new(
        detector: Detector,
        alerting_time: f64,
        early_alerting_time: f64,
        region: BandsRegion,
    ) -> Self {
        let alerting_time = alerting_time.abs();
        AlertThresholds {
            detector,
            alerting_time,
            early_alerting_time: f64::max(alerting_time, early_alerting_time),
            region,
        }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn alerting_time(&self) -> f64 {
        self.alerting_time
    }

    pub fn early_alerting_time(&self) -> f64 {
        self.early_alerting_time
    }

    pub fn region(&self) -> BandsRegion {
        self.region
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.detector, Detector::None)
    }

    pub fn to_parameters(&self) -> ParameterData {
        let mut p = ParameterData::new();
        p.set("region", self.region.name());
        p.set_internal("alerting_time", self.alerting_time, "s");
        p.set_internal("early_alerting_time", self.early_alerting_time, "s");
        p.set("detector", self.detector.identifier());
        p
    }

    pub fn set_parameters(&mut self, p: &ParameterData) {
        if let Some(region) = p.get_string("region").and_then(BandsRegion::parse) {
            self.region = region;
        }
        if p.contains("alerting_time") {
            self.alerting_time = p.get_value("alerting_time").abs();
        }
        if p.contains("early_alerting_time") {
            self.early_alerting_time = f64::max(self.alerting_time, p.get_value("early_alerting_time"));
        }
    }
}

/// An ordered ladder of alert thresholds, 1-indexed by increasing
/// severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alerter {
    id: String,
    levels: Vec<AlertThresholds>,
}

impl Default for Alerter {
    fn default() -> Self {
        Alerter::new("default")
    }
}

impl Alerter {
    pub fn new(id: &str) -> Self {
        Alerter {
            id: if id.is_empty() { "default".into() } else { id.into() },
            levels: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: &str) {
        if !id.is_empty() {
            self.id = id.to_string();
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Number of levels; level indices run from 1 to this value.
    pub fn most_severe_alert_level(&self) -> usize {
        self.levels.len()
    }

    /// Smallest level whose region equals `region`; 0 when none does.
    pub fn alert_level_for_region(&self, region: BandsRegion) -> usize {
        for (i, level) in self.levels.iter().enumerate() {
            if level.region() == region {
                return i + 1;
            }
        }
        0
    }

    /// Detector of a 1-based level.
    pub fn detector(&self, alert_level: usize) -> Option<&Detector> {
        self.level(alert_level).map(AlertThresholds::detector)
    }

    /// Thresholds of a 1-based level.
    pub fn level(&self, alert_level: usize) -> Option<&AlertThresholds> {
        if (1..=self.levels.len()).contains(&alert_level) {
            Some(&self.levels[alert_level - 1])
        } else {
            None
        }
    }

    /// Replace a 1-based level. Out-of-range indices are ignored.
    pub fn set_level(&mut self, alert_level: usize, thresholds: AlertThresholds) {
        if (1..=self.levels.len()).contains(&alert_level) {
            self.levels[alert_level - 1] = thresholds;
            self.relabel();
        }
    }

    /// Append a level and return its 1-based index. The caller provides
    /// levels ordered by severity; the ladder is never reordered.
    pub fn add_level(&mut self, thresholds: AlertThresholds) -> usize {
        self.levels.push(thresholds);
        let idx = self.levels.len();
        self.relabel();
        idx
    }

    // Keep the detector identifiers aligned with level order so the
    // parameter tables stay unambiguous.
    fn relabel(&mut self) {
        for (i, level) in self.levels.iter_mut().enumerate() {
            level.detector.set_identifier(&format!("det_{}", i + 1));
        }
    }

    /// Check ladder monotonicity, reporting each violation. Level `i`'s
    /// volume must contain level `i+1`'s so that a severe alert implies
    /// the milder ones.
    pub fn validate(&self, log: &mut ErrorLog) -> bool {
        let mut ok = true;
        for i in 1..self.levels.len() {
            let below = &self.levels[i - 1];
            let above = &self.levels[i];
            // Containment is only decidable within the table-ordered
            // detector classes; TCAS TA/RA layering is fixed by its
            // tables and not re-derived here.
            let comparable = matches!(
                (below.detector(), above.detector()),
                (Detector::Cylinder(_), Detector::Cylinder(_))
                    | (Detector::WcvTvar(_), Detector::WcvTvar(_))
            );
            if comparable && !below.detector().contains(above.detector()) {
                log.report(
                    "alerter",
                    DaaError::ConfigurationInvalid(format!(
                        "{}: volume of level {} does not contain level {}",
                        self.id,
                        i,
                        i + 1
                    )),
                );
                ok = false;
            }
            if below.alerting_time() < above.alerting_time() {
                log.report(
                    "alerter",
                    DaaError::ConfigurationInvalid(format!(
                        "{}: alerting time increases from level {} to {}",
                        self.id,
                        i,
                        i + 1
                    )),
                );
                ok = false;
            }
        }
        ok
    }

    pub fn to_parameters(&self) -> ParameterData {
        let mut p = ParameterData::new();
        for (i, level) in self.levels.iter().enumerate() {
            let prefix = format!("alert_{}_", i + 1);
            p.copy_from(&level.to_parameters().copy_with_prefix(&prefix));
            let det = level.detector();
            p.copy_from(
                &det.to_parameters()
                    .copy_with_prefix(&format!("{}_", det.identifier())),
            );
        }
        p
    }

    pub fn set_parameters(&mut self, p: &ParameterData) {
        let mut counter = 1;
        loop {
            let sub = p.extract_prefix(&format!("alert_{counter}_"));
            if sub.is_empty() {
                break;
            }
            if counter == 1 {
                self.levels.clear();
            }
            let detector = sub
                .get_string("detector")
                .map(|det_id| Detector::from_parameters(&p.extract_prefix(&format!("{det_id}_"))))
                .unwrap_or(Detector::None);
            let mut thresholds = AlertThresholds::new(detector, 0.0, 0.0, BandsRegion::None);
            thresholds.set_parameters(&sub);
            self.add_level(thresholds);
            counter += 1;
        }
    }

    // ----- preset ladders -------------------------------------------

    fn dwc_phase_i_levels(id: &str, preventive_zthr_ft: f64) -> Alerter {
        let preventive = WcvTable::make(0.66, "nmi", preventive_zthr_ft, "ft", 35.0, "s", 0.0, "s");
        let corrective = WcvTable::do_365_dwc_phase_i();
        let warning = WcvTable::do_365_dwc_phase_i();
        let mut alerter = Alerter::new(id);
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(preventive)),
            55.0,
            75.0,
            BandsRegion::None,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(corrective)),
            55.0,
            75.0,
            BandsRegion::Mid,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(warning)),
            25.0,
            55.0,
            BandsRegion::Near,
        ));
        alerter
    }

    /// DO-365 Phase I (en-route) alerting thresholds. Preventive,
    /// corrective, and warning volumes; MID is corrective, NEAR is
    /// warning.
    pub fn dwc_phase_i() -> Alerter {
        Alerter::dwc_phase_i_levels("DWC_Phase_I", 700.0)
    }

    /// DO-365 Phase I thresholds for sensor-uncertainty operation; the
    /// same recipe, with the early windows applied through SUM.
    pub fn dwc_phase_i_sum() -> Alerter {
        Alerter::dwc_phase_i_levels("DWC_Phase_I_SUM", 700.0)
    }

    fn dwc_fixed_dthr(id: &str, dthr_ft: f64, times: [(f64, f64); 3]) -> Alerter {
        let table = WcvTable::make(dthr_ft, "ft", 450.0, "ft", 0.0, "s", 0.0, "s");
        let regions = [BandsRegion::None, BandsRegion::Mid, BandsRegion::Near];
        let mut alerter = Alerter::new(id);
        for ((alerting, early), region) in times.into_iter().zip(regions) {
            alerter.add_level(AlertThresholds::new(
                Detector::WcvTvar(WcvTvar::taumod(table.clone())),
                alerting,
                early,
                region,
            ));
        }
        alerter
    }

    /// DO-365 Phase II (terminal) alerting thresholds: DTHR=1500 ft,
    /// ZTHR=450 ft, one 45 s alerting time for all levels.
    pub fn dwc_phase_ii() -> Alerter {
        Alerter::dwc_fixed_dthr(
            "DWC_Phase_II",
            1500.0,
            [(45.0, 75.0), (45.0, 75.0), (45.0, 75.0)],
        )
    }

    /// DO-365 Phase II thresholds for sensor-uncertainty operation.
    pub fn dwc_phase_ii_sum() -> Alerter {
        let mut a = Alerter::dwc_phase_ii();
        a.set_id("DWC_Phase_II_SUM");
        a
    }

    /// DO-365 non-cooperative alerting thresholds: DTHR=2200 ft,
    /// ZTHR=450 ft.
    pub fn dwc_non_coop() -> Alerter {
        Alerter::dwc_fixed_dthr(
            "DWC_Non_Coop",
            2200.0,
            [(55.0, 110.0), (55.0, 110.0), (25.0, 90.0)],
        )
    }

    /// DO-365 non-cooperative thresholds for sensor-uncertainty
    /// operation.
    pub fn dwc_non_coop_sum() -> Alerter {
        let mut a = Alerter::dwc_non_coop();
        a.set_id("DWC_Non_Coop_SUM");
        a
    }

    /// Buffered DO-365 Phase I thresholds: DTHR=1 nmi, TCOA=20 s, and
    /// longer alerting times.
    pub fn buffered_dwc_phase_i() -> Alerter {
        let preventive = WcvTable::buffered_phase_i_preventive();
        let corrective = WcvTable::buffered_dwc_phase_i();
        let warning = WcvTable::buffered_dwc_phase_i();
        let mut alerter = Alerter::new("Buffered_DWC_Phase_I");
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(preventive)),
            60.0,
            75.0,
            BandsRegion::None,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(corrective)),
            60.0,
            75.0,
            BandsRegion::Mid,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(warning)),
            30.0,
            55.0,
            BandsRegion::Near,
        ));
        alerter
    }

    /// A single NEAR level over an arbitrary detector.
    pub fn single_bands(detector: Detector, alerting_time: f64, lookahead_time: f64) -> Alerter {
        let mut alerter = Alerter::new("");
        alerter.add_level(AlertThresholds::new(
            detector,
            alerting_time,
            lookahead_time,
            BandsRegion::Near,
        ));
        alerter
    }

    /// Single-level ladder over the CD3D cylinder (5 nmi / 1000 ft,
    /// 180 s).
    pub fn cd3d_single_bands() -> Alerter {
        let mut alerter = Alerter::single_bands(
            Detector::Cylinder(crate::cylinder::CdCylinder::default()),
            180.0,
            180.0,
        );
        alerter.set_id("CD3D");
        alerter
    }

    /// Single-level ladder over the DO-365 well-clear volume.
    pub fn wcv_taumod_single_bands() -> Alerter {
        let mut alerter = Alerter::single_bands(Detector::wcv_taumod(), 55.0, 75.0);
        alerter.set_id("WCV_TAUMOD");
        alerter
    }

    /// TCAS-II traffic and resolution advisories as a two-level ladder:
    /// TA is MID, RA is NEAR. Zero alerting times: both levels fire on
    /// instantaneous violation of their tables, as TCAS advisories do.
    pub fn tcasii() -> Alerter {
        let mut alerter = Alerter::new("TCASII");
        alerter.add_level(AlertThresholds::new(
            Detector::Tcas(Tcas3d::make_tcasii_ta()),
            0.0,
            0.0,
            BandsRegion::Mid,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::Tcas(Tcas3d::make_tcasii_ra()),
            0.0,
            0.0,
            BandsRegion::Near,
        ));
        alerter
    }

    /// Look up a preset ladder by its round-trip identifier.
    pub fn from_name(name: &str) -> Option<Alerter> {
        match name {
            "DWC_Phase_I" => Some(Alerter::dwc_phase_i()),
            "DWC_Phase_I_SUM" => Some(Alerter::dwc_phase_i_sum()),
            "DWC_Phase_II" => Some(Alerter::dwc_phase_ii()),
            "DWC_Phase_II_SUM" => Some(Alerter::dwc_phase_ii_sum()),
            "DWC_Non_Coop" => Some(Alerter::dwc_non_coop()),
            "DWC_Non_Coop_SUM" => Some(Alerter::dwc_non_coop_sum()),
            "Buffered_DWC_Phase_I" => Some(Alerter::buffered_dwc_phase_i()),
            "CD3D" => Some(Alerter::cd3d_single_bands()),
            "WCV_TAUMOD" => Some(Alerter::wcv_taumod_single_bands()),
            "TCASII" => Some(Alerter::tcasii()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_shapes() {
        for name in [
            "DWC_Phase_I",
            "DWC_Phase_II",
            "DWC_Non_Coop",
            "Buffered_DWC_Phase_I",
        ] {
            let a = Alerter::from_name(name).unwrap();
            assert_eq!(a.most_severe_alert_level(), 3, "{name}");
            assert_eq!(a.level(1).unwrap().region(), BandsRegion::None);
            assert_eq!(a.level(2).unwrap().region(), BandsRegion::Mid);
            assert_eq!(a.level(3).unwrap().region(), BandsRegion::Near);
            assert_eq!(a.id(), name);
        }
        assert_eq!(Alerter::cd3d_single_bands().most_severe_alert_level(), 1);
        assert_eq!(Alerter::tcasii().most_severe_alert_level(), 2);
        assert!(Alerter::from_name("bogus").is_none());
    }

    #[test]
    fn test_presets_are_monotone() {
        let mut log = ErrorLog::new();
        for name in [
            "DWC_Phase_I",
            "DWC_Phase_I_SUM",
            "DWC_Phase_II",
            "DWC_Non_Coop",
            "Buffered_DWC_Phase_I",
            "CD3D",
            "WCV_TAUMOD",
            "TCASII",
        ] {
            let a = Alerter::from_name(name).unwrap();
            assert!(a.validate(&mut log), "{name} ladder not monotone");
        }
        assert!(!log.has_errors());
    }

    #[test]
    fn test_non_monotone_ladder_is_reported() {
        let mut alerter = Alerter::new("inverted");
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(WcvTable::do_365_dwc_phase_i())),
            25.0,
            55.0,
            BandsRegion::Mid,
        ));
        alerter.add_level(AlertThresholds::new(
            Detector::WcvTvar(WcvTvar::taumod(WcvTable::buffered_dwc_phase_i())),
            55.0,
            75.0,
            BandsRegion::Near,
        ));
        let mut log = ErrorLog::new();
        assert!(!alerter.validate(&mut log));
        assert!(log.has_errors());
    }

    #[test]
    fn test_alert_level_for_region_smallest_index() {
        let a = Alerter::dwc_phase_i();
        assert_eq!(a.alert_level_for_region(BandsRegion::Mid), 2);
        assert_eq!(a.alert_level_for_region(BandsRegion::Near), 3);
        assert_eq!(a.alert_level_for_region(BandsRegion::Far), 0);
    }

    #[test]
    fn test_level_indexing_is_one_based() {
        let a = Alerter::dwc_phase_i();
        assert!(a.level(0).is_none());
        assert!(a.level(1).is_some());
        assert!(a.level(3).is_some());
        assert!(a.level(4).is_none());
        assert!(a.detector(2).is_some());
    }

    #[test]
    fn test_detector_identifiers_follow_level_order() {
        let a = Alerter::dwc_phase_i();
        assert_eq!(a.detector(1).unwrap().identifier(), "det_1");
        assert_eq!(a.detector(3).unwrap().identifier(), "det_3");
    }

    #[test]
    fn test_alerter_parameter_round_trip() {
        let a = Alerter::buffered_dwc_phase_i();
        let p = a.to_parameters();
        let mut restored = Alerter::new("Buffered_DWC_Phase_I");
        restored.set_parameters(&p);
        assert_eq!(restored.most_severe_alert_level(), 3);
        for i in 1..=3 {
            assert_eq!(restored.level(i), a.level(i), "level {i}");
        }
    }

    #[test]
    fn test_phase_i_preventive_contains_corrective() {
        let a = Alerter::dwc_phase_i();
        // level 1 volume contains level 2, level 2 contains level 3
        assert!(a.detector(1).unwrap().contains(a.detector(2).unwrap()));
        assert!(a.detector(2).unwrap().contains(a.detector(3).unwrap()));
    }
}
