use serde::{Deserialize, Serialize};

use crate::{Coordinate, Direction, Photo, PhotoId, api};

/// Full metadata for a photo, shown when the photo is opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedPhoto {
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
    /// A free-form description
    pub description: Option<String>,
    /// Where the photo came from
    pub source: Option<PhotoSource>,
    /// The street address of the photo's location
    pub address: Option<String>,
    /// The photographer
    pub author: Option<String>,
    /// The display name of the uploader
    pub username: String,
}
impl From<api::NetworkDetailedPhoto> for DetailedPhoto {
    fn from(photo: api::NetworkDetailedPhoto) -> Self {
        DetailedPhoto {
            id: PhotoId(photo.cid),
            name: photo.title,
            direction: photo.dir.as_deref().and_then(|d| d.parse().ok()),
            year: photo.year,
            year2: photo.year2,
            file: photo.file,
            coordinate: Coordinate::from_lat_lon(photo.geo),
            description: photo.desc,
            source: photo.source.map(PhotoSource),
            address: photo.address,
            author: photo.author,
            username: photo.user.disp,
        }
    }
}
impl DetailedPhoto {
    /// A one-line description for sharing: the name and the year or years.
    pub fn share_description(&self) -> String {
        format!("{}, {}", self.name, self.photo().years())
    }

    /// The photo's page on the server at `base_url`.
    pub fn page_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.id)
    }

    /// The subset of this photo that the map works with.
    pub fn photo(&self) -> Photo {
        Photo {
            id: self.id,
            name: self.name.clone(),
            direction: self.direction,
            year: self.year,
            year2: self.year2,
            file: self.file.clone(),
            coordinate: self.coordinate,
        }
    }
}

/// The provenance of a photo. Free text that may contain an HTML link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSource(pub String);
impl PhotoSource {
    const HREF_START: &str = "<a href=\"";
    const HREF_STOP: &str = "\"";

    /// The target of the first link in the source, if any.
    pub fn url(&self) -> Option<&str> {
        let start = self.0.find(Self::HREF_START)? + Self::HREF_START.len();
        let rest = &self.0[start..];
        let stop = rest.find(Self::HREF_STOP)?;
        Some(&rest[..stop]).filter(|url| !url.is_empty())
    }

    /// The source as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
