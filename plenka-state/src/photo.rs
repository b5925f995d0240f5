use serde::{Deserialize, Serialize};

use crate::{Coordinate, Direction, ImageQuality, api};

/// A photo ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotoId(pub u64);
impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A geotagged archival photo.
///
/// Two photos are the same photo if their IDs match; the other fields may be
/// stale copies from an earlier response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    /// The photo ID
    pub id: PhotoId,
    /// The display name
    pub name: String,
    /// The direction the camera was facing
    pub direction: Option<Direction>,
    /// The lower bound of the year the photo was taken
    pub year: i32,
    /// The upper bound of the year the photo was taken
    pub year2: i32,
    /// The server-side path of the image file
    pub file: String,
    /// Where the photo was taken
    pub coordinate: Coordinate,
}
impl Photo {
    /// The URL of this photo's image in the given quality.
    pub fn image_url(&self, base_url: &str, quality: ImageQuality) -> String {
        api::image_url(base_url, &self.file, quality)
    }

    /// The year, or year range, as shown to a reader.
    pub fn years(&self) -> String {
        if self.year == self.year2 {
            self.year.to_string()
        } else {
            format!("{}-{}", self.year, self.year2)
        }
    }
}
impl From<api::NetworkPhoto> for Photo {
    fn from(photo: api::NetworkPhoto) -> Self {
        Photo {
            id: PhotoId(photo.cid),
            name: photo.title,
            direction: photo.dir.as_deref().and_then(|d| d.parse().ok()),
            year: photo.year,
            year2: photo.year2,
            file: photo.file,
            coordinate: Coordinate::from_lat_lon(photo.geo),
        }
    }
}
impl PartialEq for Photo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Photo {}
impl std::hash::Hash for Photo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
