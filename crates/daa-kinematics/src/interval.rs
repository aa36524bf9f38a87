//! Closed real intervals and loss-of-separation time intervals.

use serde::{Deserialize, Serialize};

use crate::util;

/// A closed interval `[low, up]`; empty iff `low > up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub up: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval { low: 0.0, up: -1.0 };

    pub fn new(low: f64, up: f64) -> Self {
        Interval { low, up }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.up
    }

    pub fn is_single(&self) -> bool {
        self.low >= self.up
    }

    pub fn width(&self) -> f64 {
        self.up - self.low
    }

    /// Closed-interval membership.
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.up
    }

    /// Open-interval membership.
    pub fn contains_open(&self, x: f64) -> bool {
        self.low < x && x < self.up
    }

    pub fn intersect(&self, r: Interval) -> Interval {
        if self.is_empty() || r.is_empty() {
            return Interval::EMPTY;
        }
        Interval::new(self.low.max(r.low), self.up.min(r.up))
    }

    pub fn shift(&self, d: f64) -> Interval {
        Interval::new(self.low + d, self.up + d)
    }
}

/// Time interval of loss of separation relative to the current time.
///
/// Every point in the open interval is a violation time; whether the
/// bounds themselves are depends on the detector. `time_in > time_out`
/// encodes "no loss in the window".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossData {
    pub time_in: f64,
    pub time_out: f64,
}

impl LossData {
    pub const EMPTY: LossData = LossData {
        time_in: f64::INFINITY,
        time_out: f64::NEG_INFINITY,
    };

    pub fn new(time_in: f64, time_out: f64) -> Self {
        LossData { time_in, time_out }
    }

    /// True iff the interval is non-empty, i.e. there is a loss.
    pub fn conflict(&self) -> bool {
        util::almost_less(self.time_in, self.time_out)
    }

    /// True iff the loss starts before `t`. Zero is special: loss
    /// intervals are cut at zero, so an entry at exactly 0 counts.
    pub fn conflict_before(&self, t: f64) -> bool {
        (self.time_in == 0.0 || util::almost_less(self.time_in, t)) && self.conflict()
    }

    /// True iff the loss lasts at least `thr` seconds.
    pub fn conflict_last_more_than(&self, thr: f64) -> bool {
        self.conflict() && self.time_out - self.time_in >= thr
    }

    /// Entry time; positive infinity when there is no conflict.
    pub fn time_in(&self) -> f64 {
        if self.conflict() {
            self.time_in
        } else {
            f64::INFINITY
        }
    }

    /// Exit time; negative infinity when there is no conflict.
    pub fn time_out(&self) -> f64 {
        if self.conflict() {
            self.time_out
        } else {
            f64::NEG_INFINITY
        }
    }

    pub fn time_interval(&self) -> Interval {
        Interval::new(self.time_in, self.time_out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_interval() {
        assert!(Interval::EMPTY.is_empty());
        assert!(!Interval::new(0.0, 0.0).is_empty());
        assert!(Interval::new(2.0, 1.0).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Interval::new(0.0, 10.0);
        let b = Interval::new(5.0, 15.0);
        assert_eq!(a.intersect(b), Interval::new(5.0, 10.0));
        assert!(a.intersect(Interval::new(11.0, 12.0)).is_empty());
        assert!(a.intersect(Interval::EMPTY).is_empty());
    }

    #[test]
    fn test_loss_data_conflict_convention() {
        assert!(!LossData::EMPTY.conflict());
        assert!(LossData::new(1.0, 5.0).conflict());
        // degenerate interval is not a conflict
        assert!(!LossData::new(3.0, 3.0).conflict());
        assert!(LossData::new(0.0, 4.0).conflict_before(0.0));
        assert!(!LossData::new(2.0, 4.0).conflict_before(1.0));
    }
}
