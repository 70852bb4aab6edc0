use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::adsb::{parse_feed, AircraftPosition, FeedSource, FetchError};
use crate::aircraft::{parse_lookup, AircraftMetadata, MetadataSource, NOT_AVAILABLE};
use crate::geo::{haversine_distance_km, initial_bearing_deg};

use super::state::{ClosestAircraftState, SharedClosest};

/// Fixed point distances and bearings are measured from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub latitude: f64,
    pub longitude: f64,
}

impl Observer {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Why a refresh cycle left the published record untouched.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("feed unavailable: {0}")]
    Feed(#[from] FetchError),

    #[error("feed is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl CycleError {
    /// The feed did not answer in time, as opposed to answering badly.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CycleError::Feed(e) if e.is_timeout())
    }
}

/// The closest entry found by [`find_nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a> {
    pub position: &'a AircraftPosition,
    pub distance_km: f64,
    pub bearing_deg: f64,
}

/// Single pass over the feed keeping the closest entry with usable coordinates.
///
/// Only a strictly smaller distance replaces the current holder, so the
/// first of several equidistant aircraft wins. The bearing is taken when
/// an entry becomes the holder.
pub fn find_nearest(observer: Observer, positions: &[AircraftPosition]) -> Option<Nearest<'_>> {
    let mut min_distance = f64::INFINITY;
    let mut nearest = None;

    for position in positions {
        let Some((lat, lon)) = position.coordinates() else {
            continue;
        };
        let distance = haversine_distance_km(observer.latitude, observer.longitude, lat, lon);
        if distance < min_distance {
            min_distance = distance;
            nearest = Some(Nearest {
                position,
                distance_km: distance,
                bearing_deg: initial_bearing_deg(observer.latitude, observer.longitude, lat, lon),
            });
        }
    }

    nearest
}

/// Runs one fetch / scan / enrich cycle and publishes the outcome.
pub struct Resolver<F, M> {
    observer: Observer,
    feed: F,
    lookup: Option<M>,
}

impl<F: FeedSource, M: MetadataSource> Resolver<F, M> {
    /// `lookup` is optional; without it metadata stays `N/A`.
    pub fn new(observer: Observer, feed: F, lookup: Option<M>) -> Self {
        Self { observer, feed, lookup }
    }

    pub fn observer(&self) -> Observer {
        self.observer
    }

    /// Produce the next record without publishing it.
    ///
    /// Fails only when the feed itself is unavailable or not JSON; a failed
    /// lookup degrades to `N/A` metadata.
    pub async fn resolve(&self) -> Result<ClosestAircraftState, CycleError> {
        let body = self.feed.fetch_feed().await?;
        let positions = parse_feed(&body)?;

        let Some(nearest) = find_nearest(self.observer, &positions) else {
            debug!("feed listed {} aircraft, none with a position", positions.len());
            return Ok(ClosestAircraftState::no_aircraft(Utc::now()));
        };

        debug!(
            "closest of {} aircraft: {} at {:.2} km",
            positions.len(),
            nearest.position.hex,
            nearest.distance_km
        );

        let mut state = ClosestAircraftState::tracking(
            nearest.position,
            nearest.distance_km,
            nearest.bearing_deg,
            Utc::now(),
        );
        if let Some(metadata) = self.lookup_metadata(&state.hex).await {
            state.apply_metadata(&metadata);
        }
        Ok(state)
    }

    /// Run a cycle and publish its record. On failure the previous record
    /// stays in place and the error is returned for the caller to log.
    pub async fn refresh(&self, cell: &SharedClosest) -> Result<(), CycleError> {
        let state = self.resolve().await?;

        let previous = cell.snapshot();
        if previous.hex != state.hex && state.has_aircraft() {
            info!(
                "closest aircraft is now {} ({}) at {:.2} km",
                state.hex, state.flight, state.distance_km
            );
        } else if previous.has_aircraft() && !state.has_aircraft() {
            info!("no aircraft with a position in the feed");
        }

        cell.publish(state);
        Ok(())
    }

    async fn lookup_metadata(&self, hex: &str) -> Option<AircraftMetadata> {
        let lookup = self.lookup.as_ref()?;
        if hex == NOT_AVAILABLE {
            return None;
        }

        match lookup.fetch_metadata(hex).await {
            Ok(body) => {
                let metadata = parse_lookup(&body);
                if metadata.is_none() {
                    debug!("no lookup match for {}", hex);
                }
                metadata
            }
            Err(e) => {
                warn!("metadata lookup for {} failed: {}", hex, e);
                None
            }
        }
    }
}
