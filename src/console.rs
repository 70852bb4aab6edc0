//! Terminal presentation of the closest-aircraft record.
//!
//! Reads the shared cell on a short frame interval and prints a block of
//! labelled lines whenever a new record has been published.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::aircraft::NOT_AVAILABLE;
use crate::closest::{ClosestAircraftState, ProximityAlert, SharedClosest, Status};
use crate::units::{Degrees, Feet, FeetPerMinute, Kilometers, Knots};

/// How often the presentation loop samples the shared record
pub const FRAME_INTERVAL: Duration = Duration::from_millis(250);

pub const ALERT_BANNER: &str = "!!! PROXIMITY ALERT !!!";

/// Format a record as labelled lines.
pub fn render(state: &ClosestAircraftState, alert_active: bool) -> String {
    let mut out = String::new();

    if state.status != Status::Tracking {
        let _ = writeln!(out, "{}", state.flight);
        return out;
    }

    if alert_active {
        let _ = writeln!(out, "{}", ALERT_BANNER);
    }

    let kind = state.squawk_kind();
    let squawk = if state.squawk == NOT_AVAILABLE {
        state.squawk.clone()
    } else {
        format!("{} ({})", state.squawk, kind.description())
    };
    let altitude = Feet(state.altitude_ft);
    let speed = Knots(state.ground_speed_kts);
    let distance = Kilometers(state.distance_km);
    let updated = match state.updated_at {
        Some(at) => at.format("%H:%M:%S UTC").to_string(),
        None => NOT_AVAILABLE.to_string(),
    };

    let lines: [(&str, String); 14] = [
        ("Flight", state.flight.clone()),
        ("Operator", state.operator.clone()),
        ("Registration", state.registration.clone()),
        ("Type", state.aircraft_type.clone()),
        ("Hex", state.hex.clone()),
        ("Squawk", squawk),
        ("Distance", format!("{} ({:.1} nm)", distance, distance.to_nm())),
        ("Location", format!("{:.4}, {:.4}", state.lat, state.lon)),
        ("Altitude", format!("{} (FL{:03})", altitude, altitude.to_flight_level())),
        ("Vert rate", FeetPerMinute(state.vert_rate_fpm).to_string()),
        ("Speed", format!("{} ({:.0} km/h)", speed, speed.to_kmh())),
        ("Track", Degrees(state.track_deg).normalized().to_string()),
        ("Bearing", Degrees(state.bearing_deg).normalized().to_string()),
        ("Updated", updated),
    ];
    for (label, value) in lines {
        let _ = writeln!(out, "{:<14}{}", format!("{}:", label), value);
    }
    if kind.is_emergency() {
        let _ = writeln!(out, "*** EMERGENCY: {} ***", kind.description());
    }
    out
}

/// Print the record every time it changes, until Ctrl-C.
pub async fn run(cell: &SharedClosest, frame_interval: Duration) {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown: Option<Arc<ClosestAircraftState>> = None;
    let mut alert = ProximityAlert::default();

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("cannot listen for Ctrl-C: {}", e);
                }
                break;
            }
            _ = ticker.tick() => {}
        }

        // the worker is mid-publish; try again next frame
        let Some(state) = cell.try_snapshot() else {
            continue;
        };
        if shown.as_ref().is_some_and(|prev| Arc::ptr_eq(prev, &state)) {
            continue;
        }

        if alert.update(state.within_alert_radius(cell.alert_radius_km())) {
            info!("{} within {:.1} km", state.flight, cell.alert_radius_km());
        }
        println!("{}", render(&state, alert.is_active()));
        shown = Some(state);
    }
}
