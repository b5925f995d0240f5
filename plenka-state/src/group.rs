use serde::{Deserialize, Serialize};

use crate::{Coordinate, Photo, PhotoId};

/// A client-side grouping of nearby photos that are not part of a server
/// cluster.
///
/// The coordinate is fixed when the group is created; membership is decided
/// by distance from it, so the group never drifts as photos come and go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoGroup {
    coordinate: Coordinate,
    photos: Vec<Photo>,
}
impl PhotoGroup {
    /// Create an empty group anchored at `coordinate`.
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            photos: vec![],
        }
    }

    /// The anchor of the group.
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The photos in the group.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// The number of photos in the group.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Whether the group has no photos.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Whether the group contains the photo with `id`.
    pub fn contains(&self, id: PhotoId) -> bool {
        self.photos.iter().any(|p| p.id == id)
    }

    /// Add a photo to the group.
    pub fn push(&mut self, photo: Photo) {
        self.photos.push(photo);
    }

    /// Whether `coordinate` is close enough to the anchor to belong here.
    /// The boundary is inclusive.
    pub fn accepts(&self, coordinate: &Coordinate, max_distance: f64) -> bool {
        self.coordinate.distance_to(coordinate) <= max_distance
    }

    /// Remove and return every photo farther than `max_distance` from the
    /// anchor, keeping the rest in their original order.
    pub fn take_photos_beyond(&mut self, max_distance: f64) -> Vec<Photo> {
        let (kept, evicted): (Vec<Photo>, Vec<Photo>) = std::mem::take(&mut self.photos)
            .into_iter()
            .partition(|photo| self.accepts(&photo.coordinate, max_distance));
        self.photos = kept;
        evicted
    }

    fn sorted_ids(&self) -> Vec<PhotoId> {
        let mut ids: Vec<PhotoId> = self.photos.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids
    }
}
impl PartialEq for PhotoGroup {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate.latitude.to_bits() == other.coordinate.latitude.to_bits()
            && self.coordinate.longitude.to_bits() == other.coordinate.longitude.to_bits()
            && self.sorted_ids() == other.sorted_ids()
    }
}
impl Eq for PhotoGroup {}
impl std::hash::Hash for PhotoGroup {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.coordinate.latitude.to_bits().hash(state);
        self.coordinate.longitude.to_bits().hash(state);
        self.sorted_ids().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: u64, latitude: f64, longitude: f64) -> Photo {
        Photo {
            id: PhotoId(id),
            name: format!("photo {id}"),
            direction: None,
            year: 1900,
            year2: 1900,
            file: format!("{id}.jpg"),
            coordinate: Coordinate::new(latitude, longitude),
        }
    }

    #[test]
    fn test_take_photos_beyond_keeps_anchor() {
        let mut group = PhotoGroup::new(Coordinate::new(0.0, 0.0));
        group.push(photo(1, 0.0, 0.0));
        group.push(photo(2, 1.0, 0.0));
        group.push(photo(3, 0.0, 2.0));

        let evicted = group.take_photos_beyond(1.0);
        assert_eq!(evicted, vec![photo(3, 0.0, 2.0)]);
        assert_eq!(group.len(), 2);
        assert!(group.contains(PhotoId(1)));
        assert!(group.contains(PhotoId(2)));
        assert_eq!(group.coordinate(), Coordinate::new(0.0, 0.0));
    }

    #[test]
    fn test_equality_ignores_member_order() {
        let mut a = PhotoGroup::new(Coordinate::new(1.0, 1.0));
        a.push(photo(1, 1.0, 1.0));
        a.push(photo(2, 1.0, 1.1));
        let mut b = PhotoGroup::new(Coordinate::new(1.0, 1.0));
        b.push(photo(2, 1.0, 1.1));
        b.push(photo(1, 1.0, 1.0));
        assert_eq!(a, b);

        b.push(photo(3, 1.0, 1.0));
        assert_ne!(a, b);
    }
}
