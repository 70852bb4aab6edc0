use serde::Deserialize;

use crate::aircraft::NOT_AVAILABLE;
use crate::json;

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// One entry of a dump1090 `aircraft.json` list.
///
/// Every field is optional in the feed. A field that is missing or has
/// the wrong type decodes as `None`; the hex address falls back to
/// [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftPosition {
    /// ICAO 24-bit address (hex string)
    #[serde(default = "not_available", deserialize_with = "hex_or_placeholder")]
    pub hex: String,
    /// Callsign, trailing padding removed
    #[serde(default, deserialize_with = "json::trimmed_text")]
    pub flight: Option<String>,
    /// Mode A code (4 octal digits)
    #[serde(default, deserialize_with = "json::trimmed_text")]
    pub squawk: Option<String>,
    /// Latitude in degrees
    #[serde(default, deserialize_with = "json::float")]
    pub lat: Option<f64>,
    /// Longitude in degrees
    #[serde(default, deserialize_with = "json::float")]
    pub lon: Option<f64>,
    /// Barometric altitude in feet; `"ground"` decodes as absent
    #[serde(rename = "alt_baro", default, deserialize_with = "json::int")]
    pub altitude_ft: Option<i32>,
    /// Ground speed in knots
    #[serde(rename = "gs", default, deserialize_with = "json::float")]
    pub ground_speed_kts: Option<f64>,
    /// True track over ground in degrees (0-360)
    #[serde(rename = "track", default, deserialize_with = "json::float")]
    pub track_deg: Option<f64>,
    /// Barometric vertical rate in feet per minute
    #[serde(rename = "baro_rate", default, deserialize_with = "json::int")]
    pub vert_rate_fpm: Option<i32>,
}

fn hex_or_placeholder<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(json::trimmed_text(deserializer)?.unwrap_or_else(not_available))
}

impl AircraftPosition {
    /// Latitude and longitude when both are present and finite.
    /// Entries without them cannot be placed and are skipped by the scan.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    #[serde(default, deserialize_with = "json::records")]
    aircraft: Vec<AircraftPosition>,
}

/// Decode a dump1090 `aircraft.json` body.
///
/// A body that is not JSON at all is an error. Valid JSON without an
/// `aircraft` array (or one that is not an object) is an empty feed.
pub fn parse_feed(body: &[u8]) -> Result<Vec<AircraftPosition>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    Ok(FeedPayload::deserialize(value)
        .map(|payload| payload.aircraft)
        .unwrap_or_default())
}
