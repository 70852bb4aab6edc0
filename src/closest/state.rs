use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adsb::AircraftPosition;
use crate::aircraft::{AircraftMetadata, SquawkKind, NOT_AVAILABLE};

/// Distance reported while no aircraft is known. Larger than any distance
/// on Earth, and never a real reading.
pub const DISTANCE_SENTINEL_KM: f64 = 999_999.9;

/// Default radius for the proximity alert
pub const PROXIMITY_ALERT_KM: f64 = 5.0;

pub const WAITING_TEXT: &str = "Waiting for data...";
pub const NO_AIRCRAFT_TEXT: &str = "No aircraft in range";

/// What the published record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No refresh cycle has completed yet
    Waiting,
    /// The last completed cycle found nothing with a usable position
    NoAircraft,
    /// The record holds the closest aircraft
    Tracking,
}

/// The closest aircraft to the observer, merged with its lookup metadata.
///
/// Always replaced as a whole; readers never see a mix of two cycles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosestAircraftState {
    pub status: Status,
    pub flight: String,
    pub hex: String,
    pub squawk: String,
    pub registration: String,
    pub aircraft_type: String,
    pub operator: String,
    pub lat: f64,
    pub lon: f64,
    /// Kilometers from the observer, or [`DISTANCE_SENTINEL_KM`] when not tracking
    pub distance_km: f64,
    /// Initial bearing from the observer to the aircraft in degrees
    pub bearing_deg: f64,
    pub altitude_ft: i32,
    pub vert_rate_fpm: i32,
    pub ground_speed_kts: f64,
    pub track_deg: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ClosestAircraftState {
    /// Record shown before the first cycle completes.
    pub fn waiting() -> Self {
        Self::placeholder(Status::Waiting, WAITING_TEXT, None)
    }

    /// Record published when a cycle found nothing usable.
    pub fn no_aircraft(now: DateTime<Utc>) -> Self {
        Self::placeholder(Status::NoAircraft, NO_AIRCRAFT_TEXT, Some(now))
    }

    fn placeholder(status: Status, flight: &str, updated_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status,
            flight: flight.to_string(),
            hex: String::new(),
            squawk: String::new(),
            registration: String::new(),
            aircraft_type: String::new(),
            operator: String::new(),
            lat: 0.0,
            lon: 0.0,
            distance_km: DISTANCE_SENTINEL_KM,
            bearing_deg: 0.0,
            altitude_ft: 0,
            vert_rate_fpm: 0,
            ground_speed_kts: 0.0,
            track_deg: 0.0,
            updated_at,
        }
    }

    /// Record for a selected aircraft. Metadata fields start as `N/A`
    /// until [`apply_metadata`](Self::apply_metadata) fills them in.
    pub fn tracking(
        position: &AircraftPosition,
        distance_km: f64,
        bearing_deg: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            status: Status::Tracking,
            flight: text(&position.flight),
            hex: position.hex.clone(),
            squawk: text(&position.squawk),
            registration: NOT_AVAILABLE.to_string(),
            aircraft_type: NOT_AVAILABLE.to_string(),
            operator: NOT_AVAILABLE.to_string(),
            lat: position.lat.unwrap_or_default(),
            lon: position.lon.unwrap_or_default(),
            distance_km,
            bearing_deg,
            altitude_ft: position.altitude_ft.unwrap_or_default(),
            vert_rate_fpm: position.vert_rate_fpm.unwrap_or_default(),
            ground_speed_kts: position.ground_speed_kts.unwrap_or_default(),
            track_deg: position.track_deg.unwrap_or_default(),
            updated_at: Some(now),
        }
    }

    pub fn apply_metadata(&mut self, metadata: &AircraftMetadata) {
        self.registration = metadata.registration_or_default().to_string();
        self.aircraft_type = metadata.type_code_or_default().to_string();
        self.operator = metadata.operator_or_default().to_string();
    }

    pub fn has_aircraft(&self) -> bool {
        self.status == Status::Tracking
    }

    /// Distance to the tracked aircraft; `None` whenever the sentinel applies.
    pub fn distance(&self) -> Option<f64> {
        (self.has_aircraft() && self.distance_km < DISTANCE_SENTINEL_KM).then_some(self.distance_km)
    }

    pub fn within_alert_radius(&self, radius_km: f64) -> bool {
        self.distance().is_some_and(|d| d < radius_km)
    }

    pub fn squawk_kind(&self) -> SquawkKind {
        SquawkKind::from_squawk(&self.squawk)
    }
}

impl Default for ClosestAircraftState {
    fn default() -> Self {
        Self::waiting()
    }
}

/// The single published record, shared between the refresh worker and the
/// presentation loop.
///
/// Publishing swaps an `Arc`, so the lock is held only for a pointer copy.
#[derive(Clone, Debug)]
pub struct SharedClosest {
    current: Arc<Mutex<Arc<ClosestAircraftState>>>,
    alert_radius_km: f64,
}

impl SharedClosest {
    pub fn new(alert_radius_km: f64) -> Self {
        Self {
            current: Arc::new(Mutex::new(Arc::new(ClosestAircraftState::waiting()))),
            alert_radius_km,
        }
    }

    /// Replace the published record.
    pub fn publish(&self, state: ClosestAircraftState) {
        let state = Arc::new(state);
        // the stored value is always a complete record, so a poisoned lock is still usable
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current = state;
    }

    /// The latest record.
    pub fn snapshot(&self) -> Arc<ClosestAircraftState> {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// The latest record, or `None` if the worker holds the lock right now.
    pub fn try_snapshot(&self) -> Option<Arc<ClosestAircraftState>> {
        match self.current.try_lock() {
            Ok(current) => Some(Arc::clone(&current)),
            Err(std::sync::TryLockError::Poisoned(poisoned)) => Some(Arc::clone(&poisoned.into_inner())),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }

    pub fn alert_radius_km(&self) -> f64 {
        self.alert_radius_km
    }

    /// True while the published aircraft is inside the alert radius.
    pub fn within_alert_radius(&self) -> bool {
        self.snapshot().within_alert_radius(self.alert_radius_km)
    }
}

impl Default for SharedClosest {
    fn default() -> Self {
        Self::new(PROXIMITY_ALERT_KM)
    }
}

/// Edge detector for the proximity alert: fires once when an aircraft
/// enters the radius and re-arms after it leaves.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProximityAlert {
    active: bool,
}

impl ProximityAlert {
    /// Feed the current level. Returns `true` only on the transition into the radius.
    pub fn update(&mut self, within_radius: bool) -> bool {
        let fired = within_radius && !self.active;
        self.active = within_radius;
        fired
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> AircraftPosition {
        AircraftPosition {
            hex: "4ca1fa".into(),
            flight: Some("RYR4AB".into()),
            squawk: None,
            lat: Some(51.47),
            lon: Some(-0.45),
            altitude_ft: Some(3500),
            ground_speed_kts: None,
            track_deg: Some(271.0),
            vert_rate_fpm: None,
        }
    }

    #[test]
    fn test_placeholders_carry_the_sentinel() {
        let waiting = ClosestAircraftState::waiting();
        assert_eq!(waiting.status, Status::Waiting);
        assert_eq!(waiting.flight, WAITING_TEXT);
        assert_eq!(waiting.distance_km, DISTANCE_SENTINEL_KM);
        assert_eq!(waiting.distance(), None);
        assert!(!waiting.within_alert_radius(f64::MAX));

        let none = ClosestAircraftState::no_aircraft(Utc::now());
        assert_eq!(none.flight, NO_AIRCRAFT_TEXT);
        assert!(!none.has_aircraft());
        assert_eq!(none.distance(), None);
    }

    #[test]
    fn test_tracking_defaults_missing_fields() {
        let state = ClosestAircraftState::tracking(&position(), 3.2, 45.0, Utc::now());
        assert_eq!(state.flight, "RYR4AB");
        assert_eq!(state.squawk, NOT_AVAILABLE);
        assert_eq!(state.registration, NOT_AVAILABLE);
        assert_eq!(state.operator, NOT_AVAILABLE);
        assert_eq!(state.ground_speed_kts, 0.0);
        assert_eq!(state.vert_rate_fpm, 0);
        assert_eq!(state.altitude_ft, 3500);
        assert_eq!(state.distance(), Some(3.2));
        assert!(state.within_alert_radius(PROXIMITY_ALERT_KM));
        assert!(!state.within_alert_radius(3.0));
    }

    #[test]
    fn test_apply_metadata_overwrites_defaults() {
        let mut state = ClosestAircraftState::tracking(&position(), 10.0, 0.0, Utc::now());
        state.apply_metadata(&AircraftMetadata {
            registration: Some("EI-DCL".into()),
            type_code: None,
            operator: Some("Ryanair".into()),
        });
        assert_eq!(state.registration, "EI-DCL");
        assert_eq!(state.aircraft_type, NOT_AVAILABLE);
        assert_eq!(state.operator, "Ryanair");
    }

    #[test]
    fn test_shared_cell_replaces_whole_record() {
        let cell = SharedClosest::default();
        let before = cell.snapshot();
        assert_eq!(before.status, Status::Waiting);

        let next = ClosestAircraftState::tracking(&position(), 2.0, 90.0, Utc::now());
        cell.publish(next.clone());

        assert_eq!(*cell.snapshot(), next);
        // the earlier snapshot is untouched
        assert_eq!(before.status, Status::Waiting);
        assert!(cell.within_alert_radius());
        assert!(cell.try_snapshot().is_some());
    }

    #[test]
    fn test_readers_on_other_threads_see_complete_records() {
        let cell = SharedClosest::default();
        let writer = {
            let cell = cell.clone();
            std::thread::spawn(move || {
                for i in 0..500 {
                    let mut p = position();
                    p.hex = format!("{i:06x}");
                    p.altitude_ft = Some(i);
                    cell.publish(ClosestAircraftState::tracking(&p, i as f64, 0.0, Utc::now()));
                }
            })
        };
        for _ in 0..500 {
            let seen = cell.snapshot();
            if seen.has_aircraft() {
                let i = seen.altitude_ft;
                assert_eq!(seen.hex, format!("{i:06x}"));
                assert_eq!(seen.distance_km, i as f64);
            }
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_proximity_alert_fires_once_per_entry() {
        let mut alert = ProximityAlert::default();
        assert!(!alert.update(false));
        assert!(alert.update(true));
        assert!(!alert.update(true));
        assert!(alert.is_active());
        assert!(!alert.update(false));
        assert!(!alert.is_active());
        assert!(alert.update(true));
    }

    #[test]
    fn test_state_serializes_for_consumers() {
        let state = ClosestAircraftState::tracking(&position(), 2.5, 90.0, Utc::now());
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "tracking");
        assert_eq!(json["hex"], "4ca1fa");
        assert_eq!(json["distance_km"], 2.5);
    }
}
