use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::schedule::Debouncer;

/// Settle window after the user stops typing before a lookup is dispatched.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(800);

/// Queries shorter than this never reach the geocoder.
pub const MIN_QUERY_LEN: usize = 3;

/// How long the cosmetic search marker stays on the map.
pub const SEARCH_MARKER_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Best match returned by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("device position unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Fuzzy text-to-coordinate resolution, scoped to the operative region by
/// the caller.
pub trait Geocoder: Send + Sync {
    fn search(&self, query: &str) -> Result<Option<GeocodeHit>, GeocodeError>;
}

/// Single-shot, high-accuracy device position.
pub trait LocationProvider: Send + Sync {
    fn current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// A lookup that is due for dispatch. The generation tags the response so a
/// stale completion can be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    pub generation: u64,
    pub query: String,
}

/// Debounced location search with a transient result marker.
///
/// Responses are applied through [`LocationSearch::complete`], which drops
/// anything tagged with an older generation than the latest dispatched
/// request. The marker is cosmetic: it recenters the map but never becomes
/// part of the captured parcel geometry.
#[derive(Debug)]
pub struct LocationSearch {
    region: String,
    debounce: Debouncer<String>,
    generation: u64,
    marker: Option<(Instant, GeocodeHit)>,
}

impl LocationSearch {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            debounce: Debouncer::new(SEARCH_DEBOUNCE),
            generation: 0,
            marker: None,
        }
    }

    /// Record a keystroke in the location field. Queries under the minimum
    /// length cancel any pending lookup without scheduling a new one.
    pub fn input(&mut self, raw: &str, now: Instant) {
        let query = raw.trim();
        if query.len() < MIN_QUERY_LEN {
            self.debounce.cancel();
            return;
        }
        self.debounce.schedule(query.to_string(), now);
    }

    /// Region-scoped query handed to the geocoding collaborator.
    pub fn scoped_query(&self, query: &str) -> String {
        format!("{query}, {}", self.region)
    }

    /// Pop the lookup whose settle window has elapsed, if any. Each
    /// dispatched request advances the generation counter.
    pub fn due_request(&mut self, now: Instant) -> Option<PendingSearch> {
        let query = self.debounce.poll(now)?;
        self.generation += 1;
        Some(PendingSearch {
            generation: self.generation,
            query: self.scoped_query(&query),
        })
    }

    /// Apply a lookup response. Stale generations and misses return `None`
    /// and leave prior state untouched; a current hit places the transient
    /// marker and hands back the coordinate to recenter on.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Option<GeocodeHit>,
        now: Instant,
    ) -> Option<GeocodeHit> {
        if generation != self.generation {
            return None;
        }
        let hit = result?;
        self.marker = Some((now + SEARCH_MARKER_TTL, hit.clone()));
        Some(hit)
    }

    /// The transient marker, if it has not expired yet.
    pub fn marker(&self, now: Instant) -> Option<&GeocodeHit> {
        match &self.marker {
            Some((expires, hit)) if now < *expires => Some(hit),
            _ => None,
        }
    }

    /// Drop the marker once its display window has passed.
    pub fn expire_marker(&mut self, now: Instant) {
        if let Some((expires, _)) = &self.marker {
            if now >= *expires {
                self.marker = None;
            }
        }
    }
}
