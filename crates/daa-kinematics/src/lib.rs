//! DAA Kinematics - Pure math for detect-and-avoid
//!
//! This crate contains the Euclidean vector algebra, velocity model and
//! closed-form trajectory projections used by the detection layer,
//! with NO networking dependencies.
//!
//! All internal quantities are SI (meters, seconds, radians). Unit
//! conversions happen only at the parameter I/O boundary, through the
//! tags in [`units`].

pub mod interval;
pub mod kinematics;
pub mod units;
pub mod util;
pub mod vect;
pub mod velocity;

pub use interval::{Interval, LossData};
pub use vect::{Vect2, Vect3, Vect4};
pub use velocity::Velocity;
