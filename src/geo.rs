//! Shared geodesic math used to place aircraft relative to the observer.
//!
//! Centralizes haversine distance, initial bearing and compass labeling
//! so the resolver and the console agree on the same numbers.

// =============================================================================
// Constants
// =============================================================================

/// Earth mean radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Conversion factor: nautical miles to kilometers
pub const NM_TO_KM: f64 = 1.852;

/// The 16 compass points, clockwise from north
const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE",
    "S", "SSW", "SW", "WSW", "W", "WNW", "NW", "NNW",
];

/// Width of one compass sector in degrees
const COMPASS_SECTOR_DEG: f64 = 22.5;

// =============================================================================
// Geodesic Functions
// =============================================================================

/// Calculate the great-circle distance between two lat/lon points
/// using the Haversine formula. Inputs are degrees, result is kilometers.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // clamp guards against a creeping past 1.0 for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate the initial bearing (forward azimuth) from point 1 to point 2.
/// Returns bearing in degrees (0-360, clockwise from north).
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin()
        - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    let bearing = (y.atan2(x).to_degrees() + 360.0) % 360.0;
    // -0.0 and values that round up to exactly 360.0 both belong to north
    if bearing >= 360.0 || bearing <= 0.0 {
        0.0
    } else {
        bearing
    }
}

/// Map a heading in degrees to one of the 16 compass points.
///
/// Headings outside 0-360 wrap around, so `compass_label(360.0)` and
/// `compass_label(-22.5)` are "N" and "NNW" respectively.
pub fn compass_label(track_deg: f64) -> &'static str {
    if !track_deg.is_finite() {
        return COMPASS_POINTS[0];
    }
    let sector = (track_deg / COMPASS_SECTOR_DEG).round() as i64;
    COMPASS_POINTS[sector.rem_euclid(COMPASS_POINTS.len() as i64) as usize]
}
