use serde::{Deserialize, Serialize};

use crate::{Client, ClientResult};

/// Full metadata for a single photo, as returned by `photo.giveForPage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDetailedPhoto {
    /// The unique photo ID
    pub cid: u64,
    /// The server-side path of the image file
    pub file: String,
    /// The title of the photo
    pub title: String,
    /// The compass direction the camera was facing, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    /// The location as `[latitude, longitude]`
    pub geo: [f64; 2],
    /// The lower bound of the year the photo was taken
    pub year: i32,
    /// The upper bound of the year the photo was taken
    pub year2: i32,
    /// A free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    /// Where the photo came from; may contain HTML links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// The street address of the photo's location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// The photographer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// The user that uploaded the photo
    pub user: NetworkUser,
}

/// The uploader of a photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkUser {
    /// The display name
    pub disp: String,
}

/// Single-photo endpoints.
impl Client {
    /// Get the full metadata for one photo.
    pub async fn get_photo_details(&self, cid: u64) -> ClientResult<NetworkDetailedPhoto> {
        #[derive(Serialize)]
        struct Params {
            cid: u64,
        }

        #[derive(Deserialize)]
        struct GiveForPageResponse {
            photo: NetworkDetailedPhoto,
        }

        Ok(self
            .request::<GiveForPageResponse>("photo.giveForPage", &Params { cid })
            .await?
            .photo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct GiveForPageResponse {
        photo: NetworkDetailedPhoto,
    }

    #[test]
    fn test_parse_detailed_photo() {
        let photo = Client::parse_response::<GiveForPageResponse>(
            br#"{"result":{"photo":{
                "cid":42,"file":"q/w/e.jpg","title":"Kremlin","dir":"se","geo":[56.33,44.0],
                "year":1896,"year2":1900,"desc":"View from the river",
                "source":"<a href=\"https://example.org/archive\">Archive</a>",
                "user":{"disp":"historian","login":"h"}
            }}}"#,
        )
        .unwrap()
        .photo;
        assert_eq!(photo.cid, 42);
        assert_eq!(photo.dir.as_deref(), Some("se"));
        assert_eq!(photo.address, None);
        assert_eq!(photo.user.disp, "historian");
    }

    #[test]
    fn test_detailed_photo_requires_user() {
        let result = Client::parse_response::<GiveForPageResponse>(
            br#"{"result":{"photo":{"cid":42,"file":"f","title":"t","geo":[1.0,2.0],"year":1,"year2":2}}}"#,
        );
        assert!(result.is_err());
    }
}
