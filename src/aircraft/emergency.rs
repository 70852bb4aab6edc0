use serde::Serialize;

/// Emergency and special-purpose squawk codes
pub const SQUAWK_HIJACK: &str = "7500";      // Aircraft hijacking
pub const SQUAWK_RADIO_FAIL: &str = "7600";  // Radio failure
pub const SQUAWK_EMERGENCY: &str = "7700";   // General emergency
pub const SQUAWK_VFR: &str = "7000";         // VFR conspicuity (ICAO)

/// Meaning of a transponder code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SquawkKind {
    Hijack,         // 7500
    RadioFail,      // 7600
    General,        // 7700
    VfrConspicuity, // 7000
    Discrete,
}

impl SquawkKind {
    pub fn from_squawk(squawk: &str) -> Self {
        match squawk.trim() {
            SQUAWK_HIJACK => SquawkKind::Hijack,
            SQUAWK_RADIO_FAIL => SquawkKind::RadioFail,
            SQUAWK_EMERGENCY => SquawkKind::General,
            SQUAWK_VFR => SquawkKind::VfrConspicuity,
            _ => SquawkKind::Discrete,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SquawkKind::Hijack => "Hijacking",
            SquawkKind::RadioFail => "Radio Failure",
            SquawkKind::General => "General Emergency",
            SquawkKind::VfrConspicuity => "VFR Conspicuity",
            SquawkKind::Discrete => "Discrete Code",
        }
    }

    /// True for the three codes that declare an emergency.
    pub fn is_emergency(&self) -> bool {
        matches!(self, SquawkKind::Hijack | SquawkKind::RadioFail | SquawkKind::General)
    }
}
