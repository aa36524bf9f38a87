//! Error taxonomy and the caller-owned error log.
//!
//! Arithmetic problems are always recovered locally (Invalid sentinels,
//! negative times) and never reach this log. What does reach it is
//! configuration and input diagnostics: a non-monotone alert ladder, a
//! NaN in an aircraft state, a ULP boundary branch worth flagging.
//!
//! The log is an ordinary value owned by whoever builds the detection
//! stack. Callers that want isolation keep their own instance; there is
//! no process-wide singleton. `purge` is deliberately coarse-grained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DaaError {
    /// Out-of-domain input to geometry; recovered locally, logged for
    /// visibility only.
    #[error("arithmetic domain: {0}")]
    ArithmeticDomain(String),
    /// Ladder not monotone, negative thresholds, bad alerter index. The
    /// detector remains usable but results are undefined.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
    /// NaN in a state, missing or duplicate aircraft id. The affected
    /// aircraft is skipped for the time step.
    #[error("invalid input: {0}")]
    InputValidation(String),
    /// A ULP-tolerance branch was taken where exact arithmetic would
    /// have chosen differently.
    #[error("numeric limit: {0}")]
    LimitViolation(String),
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub source: String,
    pub error: DaaError,
    pub at: DateTime<Utc>,
}

/// Caller-owned diagnostic sink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorLog {
    entries: Vec<ErrorEntry>,
    purged: bool,
}

impl ErrorLog {
    pub fn new() -> Self {
        ErrorLog::default()
    }

    /// Record a diagnostic, also emitting it as a tracing event.
    pub fn report(&mut self, source: &str, error: DaaError) {
        match &error {
            DaaError::ConfigurationInvalid(msg) | DaaError::InputValidation(msg) => {
                warn!(source, %msg, "daa diagnostic");
            }
            DaaError::ArithmeticDomain(msg) | DaaError::LimitViolation(msg) => {
                debug!(source, %msg, "daa diagnostic");
            }
        }
        self.entries.push(ErrorEntry {
            source: source.to_string(),
            error,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    /// True once `purge` has been called at least once.
    pub fn was_purged(&self) -> bool {
        self.purged
    }

    /// Drop all recorded diagnostics.
    pub fn purge(&mut self) {
        self.entries.clear();
        self.purged = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_and_purge() {
        let mut log = ErrorLog::new();
        assert!(!log.has_errors());
        log.report(
            "alerter",
            DaaError::ConfigurationInvalid("ladder not monotone".into()),
        );
        assert!(log.has_errors());
        assert_eq!(log.entries().len(), 1);
        assert!(!log.was_purged());
        log.purge();
        assert!(!log.has_errors());
        assert!(log.was_purged());
    }

    #[test]
    fn test_copies_are_independent() {
        let mut log = ErrorLog::new();
        log.report("traffic", DaaError::InputValidation("NaN position".into()));
        let snapshot = log.clone();
        log.purge();
        assert!(snapshot.has_errors());
        assert!(!log.has_errors());
    }
}
