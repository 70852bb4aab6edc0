//! Newtype wrappers for aviation units.
//!
//! These keep feet, knots and degrees from being mixed up when the
//! closest-aircraft record is turned into display text.

use crate::geo::{compass_label, NM_TO_KM};

/// Altitude or vertical distance in feet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Feet(pub i32);

impl Feet {
    /// Convert to flight level (hundreds of feet).
    pub fn to_flight_level(self) -> i32 {
        self.0 / 100
    }
}

impl std::fmt::Display for Feet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ft", self.0)
    }
}

/// Vertical rate in feet per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FeetPerMinute(pub i32);

impl std::fmt::Display for FeetPerMinute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} fpm", self.0)
    }
}

/// Speed in knots (nautical miles per hour).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Knots(pub f64);

impl Knots {
    /// Convert to km/h.
    pub fn to_kmh(self) -> f64 {
        self.0 * NM_TO_KM
    }
}

impl std::fmt::Display for Knots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} kts", self.0)
    }
}

/// Bearing or heading in degrees (0-360, clockwise from north).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Degrees(pub f64);

impl Degrees {
    /// Normalize to 0..360 range.
    pub fn normalized(self) -> Self {
        Self(((self.0 % 360.0) + 360.0) % 360.0)
    }

    /// 16-point compass label for this heading.
    pub fn compass(self) -> &'static str {
        compass_label(self.0)
    }
}

impl std::fmt::Display for Degrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} deg ({})", self.0, self.compass())
    }
}

/// Distance in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Kilometers(pub f64);

impl Kilometers {
    /// Convert to nautical miles.
    pub fn to_nm(self) -> f64 {
        self.0 / NM_TO_KM
    }
}

impl std::fmt::Display for Kilometers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} km", self.0)
    }
}
