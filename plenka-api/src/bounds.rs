use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Client, ClientResult, NetworkCluster, NetworkPhoto, Polygon, Region, photo::lenient_list,
};

/// An inclusive range of years used to filter photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
    from: i32,
    to: i32,
}
impl YearRange {
    /// The earliest year the archive covers.
    pub const EARLIEST: i32 = 1826;
    /// The latest year the archive covers.
    pub const LATEST: i32 = 2000;

    /// Create a new range; the bounds are swapped if given in reverse.
    pub fn new(from: i32, to: i32) -> Self {
        Self {
            from: from.min(to),
            to: from.max(to),
        }
    }

    /// The first year in the range.
    pub fn start(&self) -> i32 {
        self.from
    }

    /// The last year in the range.
    pub fn end(&self) -> i32 {
        self.to
    }

    /// Whether `year` is within the range.
    pub fn contains(&self, year: i32) -> bool {
        (self.from..=self.to).contains(&year)
    }
}
impl Default for YearRange {
    fn default() -> Self {
        Self::new(Self::EARLIEST, Self::LATEST)
    }
}
impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// A request to the `photo.getByBounds` method.
#[derive(Debug, Clone)]
pub struct ByBoundsRequest {
    /// The zoom level; decides whether the server clusters photos.
    pub z: u8,
    /// The region to query.
    pub region: Region,
    /// The years to include.
    pub year_range: YearRange,
    /// The time the request was issued.
    pub start_at: DateTime<Utc>,
}
impl ByBoundsRequest {
    /// The zoom level from which the server returns individual photos only.
    pub const LOCAL_WORK_ZOOM: u8 = 17;

    /// Create a request for `region` at zoom level `z`, issued now.
    pub fn new(z: u8, region: Region, year_range: YearRange) -> Self {
        Self {
            z,
            region,
            year_range,
            start_at: Utc::now(),
        }
    }

    fn params(&self) -> ByBoundsParams {
        ByBoundsParams {
            z: self.z,
            geometry: Polygon::from(&self.region),
            start_at: self.start_at.timestamp_millis() as f64 / 1000.0,
            year: self.year_range.start(),
            year2: self.year_range.end(),
            is_painting: false,
            local_work: self.z >= Self::LOCAL_WORK_ZOOM,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ByBoundsParams {
    z: u8,
    geometry: Polygon,
    start_at: f64,
    year: i32,
    year2: i32,
    is_painting: bool,
    local_work: bool,
}

/// A response from the `photo.getByBounds` method.
///
/// Individual photos or clusters that are missing required fields are
/// dropped; the two lists themselves must be present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ByBoundsResponse {
    /// The photos that are not part of any cluster.
    #[serde(deserialize_with = "lenient_list")]
    pub photos: Vec<NetworkPhoto>,
    /// The server-side clusters.
    #[serde(deserialize_with = "lenient_list")]
    pub clusters: Vec<NetworkCluster>,
}

/// Bounding-box queries.
impl Client {
    /// Get the photos and clusters inside a region.
    pub async fn get_by_bounds(&self, request: &ByBoundsRequest) -> ClientResult<ByBoundsResponse> {
        self.request::<ByBoundsResponse>("photo.getByBounds", &request.params())
            .await
    }
}
