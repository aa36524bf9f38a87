//! DAA Core - Well-clear detection and alerting
//!
//! Given the state of an ownship and a set of traffic aircraft, this
//! crate decides, per intruder, the most severe alert level currently
//! warranted and the time interval during which each alert threshold
//! volume would be violated under a short linear projection.
//!
//! The crate is pure computation: single-threaded, deterministic, no
//! I/O, no networking dependencies. Every value type is `Clone` with
//! full independence of the copy, so callers may snapshot configuration
//! at a time step and mutate the live copy.

pub mod alerter;
pub mod alerting;
pub mod cylinder;
pub mod detector;
pub mod errors;
pub mod horizontal;
pub mod parameters;
pub mod tcas;
pub mod traffic;
pub mod vertical;
pub mod wcv;

pub use alerter::{AlertThresholds, Alerter, BandsRegion};
pub use alerting::{AlertingConfig, AlertingLogic};
pub use cylinder::CdCylinder;
pub use detector::{ConflictData, Detector};
pub use errors::{DaaError, ErrorLog};
pub use tcas::{Tcas3d, TcasTable};
pub use traffic::{SumData, TrafficState};
pub use wcv::{HorizontalWcv, VerticalWcv, WcvTable, WcvTvar};
