use serde::{Deserialize, Serialize};

use crate::{Coordinate, Photo, api};

/// A server-computed aggregation of nearby photos at one zoom level.
///
/// Two clusters are the same only if they share the face photo, the count and
/// the location: a changed count makes it a different cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// The photo shown as the face of the cluster
    pub photo: Photo,
    /// The number of photos in the cluster
    pub count: u32,
    /// The location of the cluster
    pub coordinate: Coordinate,
}
impl From<api::NetworkCluster> for Cluster {
    fn from(cluster: api::NetworkCluster) -> Self {
        Cluster {
            photo: Photo::from(cluster.p),
            count: cluster.c,
            coordinate: Coordinate::from_lat_lon(cluster.geo),
        }
    }
}
impl Cluster {
    fn identity(&self) -> (crate::PhotoId, u32, u64, u64) {
        (
            self.photo.id,
            self.count,
            self.coordinate.latitude.to_bits(),
            self.coordinate.longitude.to_bits(),
        )
    }
}
impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Cluster {}
impl std::hash::Hash for Cluster {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
