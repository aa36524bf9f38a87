//! Unit tags and conversions for the parameter I/O boundary.
//!
//! Internally everything is SI. Only the tags that appear in detector
//! and alerter parameter tables are supported; full unit-string parsing
//! belongs to the external I/O layer.

use std::f64::consts::PI;

/// Meters per nautical mile.
pub const NMI: f64 = 1852.0;
/// Meters per foot.
pub const FT: f64 = 0.3048;
/// Meters per second per knot.
pub const KNOT: f64 = 1852.0 / 3600.0;
/// Meters per second per foot-per-minute.
pub const FPM: f64 = 0.3048 / 60.0;
/// Radians per degree.
pub const DEG: f64 = PI / 180.0;
/// Standard sea-level gravitational acceleration [m/s^2].
pub const GN: f64 = 9.80665;

fn factor(unit: &str) -> f64 {
    match unit {
        "m" | "m/s" | "s" | "rad" | "unitless" | "unspecified" => 1.0,
        "ft" => FT,
        "nmi" | "NM" => NMI,
        "knot" | "kn" | "kts" => KNOT,
        "fpm" | "ft/min" => FPM,
        "deg" => DEG,
        "km" => 1000.0,
        "min" => 60.0,
        _ => 1.0,
    }
}

/// Convert `value` expressed in `unit` to internal (SI) units.
pub fn from(unit: &str, value: f64) -> f64 {
    value * factor(unit)
}

/// Convert an internal (SI) `value` to `unit`.
pub fn to(unit: &str, value: f64) -> f64 {
    value / factor(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for u in ["m", "ft", "nmi", "knot", "fpm", "deg", "s"] {
            let v = to(u, from(u, 123.456));
            assert!((v - 123.456).abs() < 1e-12);
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(from("nmi", 1.0), 1852.0);
        assert!((from("ft", 450.0) - 137.16).abs() < 1e-9);
        assert!((from("knot", 1.0) - 0.5144444444444445).abs() < 1e-12);
    }
}
