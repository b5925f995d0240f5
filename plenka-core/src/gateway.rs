use plenka_state::{
    Cluster, DetailedPhoto, ImageQuality, Photo, PhotoId, Region, YearRange,
    api::{self, ClientResult},
};

/// The photos and clusters the server returned for one viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportContent {
    pub photos: Vec<Photo>,
    pub clusters: Vec<Cluster>,
}
impl From<api::ByBoundsResponse> for ViewportContent {
    fn from(response: api::ByBoundsResponse) -> Self {
        Self {
            photos: response.photos.into_iter().map(Photo::from).collect(),
            clusters: response.clusters.into_iter().map(Cluster::from).collect(),
        }
    }
}

/// Where the map gets its data from.
///
/// Implemented by [`api::Client`]; tests substitute canned responses.
pub trait PhotoGateway: Send + Sync + 'static {
    /// Fetch everything inside `region` at zoom level `z`.
    fn fetch_by_viewport(
        &self,
        z: u8,
        region: Region,
        years: YearRange,
    ) -> impl Future<Output = ClientResult<ViewportContent>> + Send;

    /// Fetch the full metadata of one photo.
    fn fetch_details(&self, id: PhotoId) -> impl Future<Output = ClientResult<DetailedPhoto>> + Send;

    /// Download the image at `file`.
    fn fetch_image(
        &self,
        file: &str,
        quality: ImageQuality,
    ) -> impl Future<Output = ClientResult<Vec<u8>>> + Send;
}

impl PhotoGateway for api::Client {
    async fn fetch_by_viewport(
        &self,
        z: u8,
        region: Region,
        years: YearRange,
    ) -> ClientResult<ViewportContent> {
        let request = api::ByBoundsRequest::new(z, region, years);
        Ok(self.get_by_bounds(&request).await?.into())
    }

    async fn fetch_details(&self, id: PhotoId) -> ClientResult<DetailedPhoto> {
        Ok(self.get_photo_details(id.0).await?.into())
    }

    async fn fetch_image(&self, file: &str, quality: ImageQuality) -> ClientResult<Vec<u8>> {
        self.get_image(file, quality).await
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use plenka_state::{Coordinate, api::ClientError};

    use super::*;

    pub(crate) fn photo(id: u64, latitude: f64, longitude: f64) -> Photo {
        Photo {
            id: PhotoId(id),
            name: format!("photo {id}"),
            direction: None,
            year: 1920,
            year2: 1925,
            file: format!("x/y/{id}.jpg"),
            coordinate: Coordinate::new(latitude, longitude),
        }
    }

    pub(crate) fn cluster(id: u64, count: u32, latitude: f64, longitude: f64) -> Cluster {
        Cluster {
            photo: photo(id, latitude, longitude),
            count,
            coordinate: Coordinate::new(latitude, longitude),
        }
    }

    pub(crate) fn photos_only(photos: Vec<Photo>) -> ViewportContent {
        ViewportContent {
            photos,
            clusters: vec![],
        }
    }

    pub(crate) fn parsing_error() -> ClientError {
        serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into()
    }

    /// Serves whatever content it was last given; `None` fails every call.
    #[derive(Default)]
    pub(crate) struct FakeGateway {
        content: Mutex<Option<ViewportContent>>,
        images: Mutex<HashMap<(String, ImageQuality), Vec<u8>>>,
        image_delay: Duration,
        viewport_calls: AtomicUsize,
        image_calls: AtomicUsize,
        last_request: Mutex<Option<(u8, Region, YearRange)>>,
    }
    impl FakeGateway {
        pub(crate) fn new(photos: Vec<Photo>, clusters: Vec<Cluster>) -> Self {
            Self {
                content: Mutex::new(Some(ViewportContent { photos, clusters })),
                ..Default::default()
            }
        }

        pub(crate) fn failing() -> Self {
            Self::default()
        }

        pub(crate) fn with_image_delay(delay: Duration) -> Self {
            Self {
                image_delay: delay,
                ..Default::default()
            }
        }

        pub(crate) fn set_content(&self, content: Option<ViewportContent>) {
            *self.content.lock().unwrap() = content;
        }

        pub(crate) fn set_image(&self, file: &str, quality: ImageQuality, bytes: &[u8]) {
            self.images
                .lock()
                .unwrap()
                .insert((file.to_string(), quality), bytes.to_vec());
        }

        pub(crate) fn viewport_calls(&self) -> usize {
            self.viewport_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn image_calls(&self) -> usize {
            self.image_calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_request(&self) -> Option<(u8, Region, YearRange)> {
            *self.last_request.lock().unwrap()
        }
    }
    impl PhotoGateway for FakeGateway {
        async fn fetch_by_viewport(
            &self,
            z: u8,
            region: Region,
            years: YearRange,
        ) -> ClientResult<ViewportContent> {
            self.viewport_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((z, region, years));
            let content = self.content.lock().unwrap().clone();
            content.ok_or_else(parsing_error)
        }

        async fn fetch_details(&self, _id: PhotoId) -> ClientResult<DetailedPhoto> {
            Err(parsing_error())
        }

        async fn fetch_image(&self, file: &str, quality: ImageQuality) -> ClientResult<Vec<u8>> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            if !self.image_delay.is_zero() {
                tokio::time::sleep(self.image_delay).await;
            }
            let bytes = self
                .images
                .lock()
                .unwrap()
                .get(&(file.to_string(), quality))
                .cloned();
            bytes.ok_or_else(parsing_error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_content_from_response() {
        let response: api::ByBoundsResponse = serde_json::from_str(
            r#"{
                "photos": [
                    {"cid":1,"file":"a.jpg","title":"One","dir":"ne","geo":[56.3,44.0],"year":1900,"year2":1905},
                    {"cid":2,"file":"b.jpg","title":"Two","dir":"up","geo":[56.4,44.1],"year":1910,"year2":1910}
                ],
                "clusters": [
                    {"p":{"cid":3,"file":"c.jpg","title":"Three","geo":[56.5,44.2],"year":1920,"year2":1920},"geo":[56.51,44.21],"c":40}
                ]
            }"#,
        )
        .unwrap();

        let content = ViewportContent::from(response);
        assert_eq!(content.photos.len(), 2);
        assert_eq!(content.photos[0].id, PhotoId(1));
        assert_eq!(
            content.photos[0].direction,
            Some(plenka_state::Direction::NorthEast)
        );
        assert_eq!(content.photos[1].direction, None);
        assert_eq!(content.clusters.len(), 1);
        assert_eq!(content.clusters[0].count, 40);
        assert_eq!(content.clusters[0].photo.id, PhotoId(3));
        assert_eq!(content.clusters[0].coordinate.latitude, 56.51);
    }
}
