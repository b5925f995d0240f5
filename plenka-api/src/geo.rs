use serde::{Deserialize, Serialize};

/// A point on the map, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// The latitude, nominally in `[-90, 90]`.
    pub latitude: f64,
    /// The longitude, nominally in `[-180, 180]`.
    pub longitude: f64,
}
impl Coordinate {
    /// Create a new coordinate.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Planar distance between two coordinates, in degrees.
    ///
    /// This treats latitude and longitude as a flat grid, so it overstates
    /// east-west distances away from the equator.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let latitude = self.latitude - other.latitude;
        let longitude = self.longitude - other.longitude;
        (latitude * latitude + longitude * longitude).sqrt()
    }

    /// This coordinate with both axes wrapped back into their valid ranges.
    pub fn wrapped(&self) -> Self {
        Self {
            latitude: wrap_latitude(self.latitude),
            longitude: wrap_longitude(self.longitude),
        }
    }

    /// The GeoJSON position of this coordinate: `[longitude, latitude]`.
    pub fn geojson_position(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Read a coordinate from the API's `[latitude, longitude]` pair.
    pub fn from_lat_lon(geo: [f64; 2]) -> Self {
        Self::new(geo[0], geo[1])
    }
}

/// Wraps a latitude into `[-90, 90]` by stepping it half a turn at a time.
pub fn wrap_latitude(latitude: f64) -> f64 {
    if !latitude.is_finite() || (-90.0..=90.0).contains(&latitude) {
        return latitude;
    }
    (latitude + 90.0).rem_euclid(180.0) - 90.0
}

/// Wraps a longitude into `[-180, 180]` by stepping it a full turn at a time.
pub fn wrap_longitude(longitude: f64) -> f64 {
    if !longitude.is_finite() || (-180.0..=180.0).contains(&longitude) {
        return longitude;
    }
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

/// The extent of a region, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The north-south extent.
    pub latitude_delta: f64,
    /// The east-west extent.
    pub longitude_delta: f64,
}
impl Span {
    /// Create a new span.
    pub const fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }

    /// A span with the same extent on both axes.
    pub const fn square(delta: f64) -> Self {
        Self::new(delta, delta)
    }

    /// The smaller of the two extents.
    pub fn min_delta(&self) -> f64 {
        self.latitude_delta.min(self.longitude_delta)
    }
}

/// A rectangular viewport: a center and the span around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// The center of the region.
    pub center: Coordinate,
    /// The full extent of the region.
    pub span: Span,
}
impl Region {
    /// Create a new region.
    pub const fn new(center: Coordinate, span: Span) -> Self {
        Self { center, span }
    }

    /// The region spanned by two opposite corners, in any order.
    pub fn from_corners(a: Coordinate, b: Coordinate) -> Self {
        Self {
            center: Coordinate::new(
                (a.latitude + b.latitude) / 2.0,
                (a.longitude + b.longitude) / 2.0,
            ),
            span: Span::new(
                (a.latitude - b.latitude).abs(),
                (a.longitude - b.longitude).abs(),
            ),
        }
    }

    /// The same region with its span scaled by `multiplier` around the center.
    pub fn expanded(&self, multiplier: f64) -> Self {
        Self {
            center: self.center,
            span: Span::new(
                self.span.latitude_delta * multiplier,
                self.span.longitude_delta * multiplier,
            ),
        }
    }

    /// The corners of the region as a closed ring: south-west, south-east,
    /// north-east, north-west, and south-west again. Every corner is wrapped
    /// into valid latitude/longitude ranges.
    pub fn corners(&self) -> [Coordinate; 5] {
        let half_latitude = self.span.latitude_delta / 2.0;
        let half_longitude = self.span.longitude_delta / 2.0;
        let south = self.center.latitude - half_latitude;
        let north = self.center.latitude + half_latitude;
        let west = self.center.longitude - half_longitude;
        let east = self.center.longitude + half_longitude;

        [
            Coordinate::new(south, west),
            Coordinate::new(south, east),
            Coordinate::new(north, east),
            Coordinate::new(north, west),
            Coordinate::new(south, west),
        ]
        .map(|corner| corner.wrapped())
    }

    /// The region as a GeoJSON polygon ring of `[longitude, latitude]` positions.
    pub fn polygon(&self) -> [[f64; 2]; 5] {
        self.corners().map(|corner| corner.geojson_position())
    }
}

/// A GeoJSON polygon geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    #[serde(rename = "type")]
    kind: PolygonKind,
    /// The rings of the polygon; the first is the outer boundary.
    pub coordinates: Vec<Vec<[f64; 2]>>,
}
impl From<&Region> for Polygon {
    fn from(region: &Region) -> Self {
        Self {
            kind: PolygonKind::Polygon,
            coordinates: vec![region.polygon().to_vec()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PolygonKind {
    Polygon,
}
