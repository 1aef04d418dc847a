use super::domain::Geometry;

/// WGS84 equatorial radius in meters, matching the geodesic area
/// computation the map layer used.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

const M2_PER_HECTARE: f64 = 10_000.0;

/// Signed spherical excess area of one linear ring, in square meters.
///
/// Rings follow GeoJSON conventions: `[lon, lat]` pairs with the first
/// coordinate repeated at the end.
fn ring_area_m2(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n <= 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };

        let p1 = ring[lower];
        let p2 = ring[middle];
        let p3 = ring[upper];
        total += (p3[0].to_radians() - p1[0].to_radians()) * p2[1].to_radians().sin();
    }

    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

fn polygon_area_m2(rings: &[Vec<[f64; 2]>]) -> f64 {
    let mut area = 0.0;
    for (index, ring) in rings.iter().enumerate() {
        let ring_area = ring_area_m2(ring).abs();
        if index == 0 {
            area += ring_area;
        } else {
            // Interior rings are holes.
            area -= ring_area;
        }
    }
    area
}

/// Planar-equivalent area of a geometry in square meters. Points have none.
pub fn area_m2(geometry: &Geometry) -> Option<f64> {
    match geometry {
        Geometry::Point { .. } => None,
        Geometry::Polygon { coordinates } => Some(polygon_area_m2(coordinates)),
        Geometry::MultiPolygon { coordinates } => {
            Some(coordinates.iter().map(|polygon| polygon_area_m2(polygon)).sum())
        }
    }
}

/// Parcel area in hectares at the 4-decimal precision the form records.
pub fn area_hectares(geometry: &Geometry) -> Option<f64> {
    area_m2(geometry).map(|area| (area / M2_PER_HECTARE * 10_000.0).round() / 10_000.0)
}

/// Capture state for the interactive map: either no geometry or exactly one
/// committed geometry. Committing again replaces in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParcelCapture {
    geometry: Option<Geometry>,
}

impl ParcelCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_none()
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn area_hectares(&self) -> Option<f64> {
        self.geometry.as_ref().and_then(area_hectares)
    }

    /// Commit a drawn or edited geometry, clearing any prior capture.
    /// Returns the derived area, which is `None` for a bare marker.
    pub fn commit(&mut self, geometry: Geometry) -> Option<f64> {
        self.geometry = Some(geometry);
        self.area_hectares()
    }

    /// Map click drops a marker only while nothing is captured yet.
    pub fn click_marker(&mut self, lon: f64, lat: f64) -> bool {
        if self.geometry.is_some() {
            return false;
        }
        self.geometry = Some(Geometry::Point {
            coordinates: [lon, lat],
        });
        true
    }

    /// Dragging a committed marker re-commits the point in place.
    pub fn drag_marker(&mut self, lon: f64, lat: f64) {
        if matches!(self.geometry, Some(Geometry::Point { .. })) {
            self.geometry = Some(Geometry::Point {
                coordinates: [lon, lat],
            });
        }
    }

    /// Back to `Empty`: geometry, area, and overlays are all discarded.
    pub fn reset(&mut self) {
        self.geometry = None;
    }
}
