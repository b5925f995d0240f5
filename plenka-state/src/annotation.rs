use serde::{Deserialize, Serialize};

use crate::{Cluster, Coordinate, Photo, PhotoGroup};

/// Anything that can be placed on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// A single photo.
    Photo(Photo),
    /// A cluster computed by the server.
    Cluster(Cluster),
    /// A group of nearby photos computed locally.
    Group(PhotoGroup),
}
impl Annotation {
    /// Where the annotation sits on the map.
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Annotation::Photo(photo) => photo.coordinate,
            Annotation::Cluster(cluster) => cluster.coordinate,
            Annotation::Group(group) => group.coordinate(),
        }
    }

    /// How many photos the annotation stands for.
    pub fn photo_count(&self) -> usize {
        match self {
            Annotation::Photo(_) => 1,
            Annotation::Cluster(cluster) => cluster.count as usize,
            Annotation::Group(group) => group.len(),
        }
    }

    /// The photos carried directly by this annotation: the photo itself, or
    /// the members of a group. Clusters only carry their face photo.
    pub fn photos(&self) -> &[Photo] {
        match self {
            Annotation::Photo(photo) => std::slice::from_ref(photo),
            Annotation::Cluster(cluster) => std::slice::from_ref(&cluster.photo),
            Annotation::Group(group) => group.photos(),
        }
    }
}
impl From<Photo> for Annotation {
    fn from(photo: Photo) -> Self {
        Annotation::Photo(photo)
    }
}
impl From<Cluster> for Annotation {
    fn from(cluster: Cluster) -> Self {
        Annotation::Cluster(cluster)
    }
}
impl From<PhotoGroup> for Annotation {
    fn from(group: PhotoGroup) -> Self {
        Annotation::Group(group)
    }
}
