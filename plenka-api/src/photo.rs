use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

/// A photo as returned by the bounding-box query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPhoto {
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
}

/// A server-side aggregation of photos at the requested zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkCluster {
    /// The photo shown as the face of the cluster
    pub p: NetworkPhoto,
    /// The location as `[latitude, longitude]`
    pub geo: [f64; 2],
    /// The number of photos in the cluster
    pub c: u32,
}

/// Deserializes a list, dropping entries that do not match `T` instead of
/// failing the whole list. The list itself must still be present.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_without_direction() {
        let photo: NetworkPhoto = serde_json::from_str(
            r#"{"cid":1,"file":"a/b/c.jpg","title":"Bridge","geo":[56.3,44.0],"year":1900,"year2":1910}"#,
        )
        .unwrap();
        assert_eq!(photo.cid, 1);
        assert_eq!(photo.dir, None);
        assert_eq!(photo.geo, [56.3, 44.0]);
    }

    #[test]
    fn test_photo_missing_required_field_fails() {
        let result = serde_json::from_str::<NetworkPhoto>(
            r#"{"cid":1,"file":"a/b/c.jpg","geo":[56.3,44.0],"year":1900,"year2":1910}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_cluster() {
        let cluster: NetworkCluster = serde_json::from_str(
            r#"{"p":{"cid":7,"file":"f","title":"t","dir":"n","geo":[1.0,2.0],"year":1950,"year2":1950},"geo":[1.5,2.5],"c":12}"#,
        )
        .unwrap();
        assert_eq!(cluster.p.cid, 7);
        assert_eq!(cluster.p.dir.as_deref(), Some("n"));
        assert_eq!(cluster.c, 12);
    }

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(deserialize_with = "lenient_list")]
        photos: Vec<NetworkPhoto>,
    }

    #[test]
    fn test_lenient_list_drops_bad_entries() {
        let wrapper: Wrapper = serde_json::from_str(
            r#"{"photos":[
                {"cid":1,"file":"f","title":"ok","geo":[1.0,2.0],"year":1900,"year2":1900},
                {"cid":2,"file":"f","title":"no geo","year":1900,"year2":1900},
                {"cid":"three","file":"f","title":"bad id","geo":[1.0,2.0],"year":1900,"year2":1900},
                42
            ]}"#,
        )
        .unwrap();
        assert_eq!(wrapper.photos.len(), 1);
        assert_eq!(wrapper.photos[0].title, "ok");
    }

    #[test]
    fn test_lenient_list_still_requires_a_list() {
        assert!(serde_json::from_str::<Wrapper>(r#"{"photos":{}}"#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#"{}"#).is_err());
    }
}
