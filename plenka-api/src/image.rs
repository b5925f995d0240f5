use serde::{Deserialize, Serialize};

use crate::{Client, ClientResult};

/// The resolutions the server keeps for every photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    /// A small thumbnail.
    Preview,
    /// A screen-sized image.
    Medium,
    /// The full-size original.
    High,
}
impl ImageQuality {
    /// All qualities, from lowest to highest.
    pub const ALL: [ImageQuality; 3] = [
        ImageQuality::Preview,
        ImageQuality::Medium,
        ImageQuality::High,
    ];

    /// The path segment the server uses for this quality.
    pub fn path_letter(&self) -> &'static str {
        match self {
            ImageQuality::Preview => "s",
            ImageQuality::Medium => "d",
            ImageQuality::High => "a",
        }
    }

    /// This quality and every higher one, highest first.
    pub fn at_least(self) -> impl Iterator<Item = ImageQuality> {
        Self::ALL.into_iter().rev().filter(move |q| *q >= self)
    }
}

/// Image endpoints.
impl Client {
    /// The URL of the image at `file` in the given quality.
    pub fn image_url(&self, file: &str, quality: ImageQuality) -> String {
        image_url(&self.base_url, file, quality)
    }

    /// Download the image at `file` in the given quality.
    pub async fn get_image(&self, file: &str, quality: ImageQuality) -> ClientResult<Vec<u8>> {
        Ok(self
            .client
            .get(self.image_url(file, quality))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .into())
    }
}

/// The URL of the image at `file` in the given quality on the server at `base_url`.
pub fn image_url(base_url: &str, file: &str, quality: ImageQuality) -> String {
    format!(
        "{}/_p/{}/{}",
        base_url.trim_end_matches('/'),
        quality.path_letter(),
        file.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://pastvu.com", "a/b/c.jpg", ImageQuality::High),
            "https://pastvu.com/_p/a/a/b/c.jpg"
        );
        assert_eq!(
            Client::new("https://pastvu.com/").image_url("/x.jpg", ImageQuality::Preview),
            "https://pastvu.com/_p/s/x.jpg"
        );
    }

    #[test]
    fn test_at_least_is_highest_first() {
        assert_eq!(
            ImageQuality::Medium.at_least().collect::<Vec<_>>(),
            vec![ImageQuality::High, ImageQuality::Medium]
        );
        assert_eq!(ImageQuality::High.at_least().count(), 1);
    }
}
