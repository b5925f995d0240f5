use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use serde::Serialize;

use plenka_state::{
    Annotation, Cluster, Photo, PhotoId, Region, YearRange, api::ClientResult,
};

use crate::{GroupMaker, PhotoGateway};

/// How many group diameters fit across the smaller side of the viewport.
pub const DEFAULT_GROUP_DIVISOR: f64 = 7.0;

/// The changes to apply to the map after a load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnotationDelta {
    /// Everything previously shown must be removed before applying `added`.
    pub reset: bool,
    pub added: Vec<Annotation>,
    /// Annotations handed out earlier that no longer exist in this form,
    /// such as the old version of a group whose membership changed.
    pub removed: Vec<Annotation>,
}
impl AnnotationDelta {
    /// Whether applying this delta would change nothing on the map.
    pub fn is_empty(&self) -> bool {
        !self.reset && self.added.is_empty() && self.removed.is_empty()
    }
}

/// Tracks what is on the map and turns server responses into deltas.
///
/// All state is mutated through `&mut self`, and only after a fetch has
/// succeeded; a failed load leaves the provider exactly as it was.
pub struct AnnotationProvider<G> {
    gateway: Arc<G>,
    photos: HashSet<Photo>,
    clusters: HashSet<Cluster>,
    group_maker: GroupMaker,
    // The singles and groups last handed out from the group maker.
    displayed: Vec<Annotation>,
    group_divisor: f64,
    pending_reset: bool,
}
impl<G: PhotoGateway> AnnotationProvider<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self::with_group_divisor(gateway, DEFAULT_GROUP_DIVISOR)
    }

    pub fn with_group_divisor(gateway: Arc<G>, group_divisor: f64) -> Self {
        Self {
            gateway,
            photos: HashSet::new(),
            clusters: HashSet::new(),
            group_maker: GroupMaker::default(),
            displayed: vec![],
            group_divisor,
            pending_reset: true,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn shown_photos(&self) -> &HashSet<Photo> {
        &self.photos
    }

    pub fn shown_clusters(&self) -> &HashSet<Cluster> {
        &self.clusters
    }

    /// Everything currently on the map: clusters, groups and bare photos.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.clusters
            .iter()
            .cloned()
            .map(Annotation::Cluster)
            .chain(self.displayed.iter().cloned())
            .collect()
    }

    /// Fetch the viewport and return what changed on the map since the
    /// previous load.
    pub async fn load_annotations(
        &mut self,
        z: u8,
        region: Region,
        years: YearRange,
    ) -> ClientResult<AnnotationDelta> {
        tracing::debug!("Loading annotations for z{z} around {:?}", region.center);
        let content = match self.gateway.fetch_by_viewport(z, region, years).await {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to load annotations for z{z}: {e}");
                return Err(e);
            }
        };

        // The server may repeat a photo within a response; the first copy wins.
        let mut seen = HashSet::new();
        let new_photos: Vec<Photo> = content
            .photos
            .into_iter()
            .filter(|p| !self.photos.contains(p) && seen.insert(p.id))
            .collect();
        let mut seen = HashSet::new();
        let new_clusters: Vec<Cluster> = content
            .clusters
            .into_iter()
            .filter(|c| !self.clusters.contains(c) && seen.insert(c.clone()))
            .collect();

        self.photos.extend(new_photos.iter().cloned());
        self.clusters.extend(new_clusters.iter().cloned());

        let group_diameter = region.span.min_delta() / self.group_divisor;
        let (singles, groups) = self.group_maker.add_data(Some(group_diameter), new_photos);
        let current: Vec<Annotation> = singles
            .iter()
            .cloned()
            .map(Annotation::Photo)
            .chain(groups.iter().cloned().map(Annotation::Group))
            .collect();

        let previous: HashSet<&Annotation> = self.displayed.iter().collect();
        let now: HashSet<&Annotation> = current.iter().collect();
        let removed: Vec<Annotation> = self
            .displayed
            .iter()
            .filter(|a| !now.contains(a))
            .cloned()
            .collect();
        let added: Vec<Annotation> = new_clusters
            .into_iter()
            .map(Annotation::Cluster)
            .chain(current.iter().filter(|a| !previous.contains(a)).cloned())
            .collect();

        let delta = AnnotationDelta {
            reset: std::mem::take(&mut self.pending_reset),
            added,
            removed,
        };
        self.displayed = current;

        tracing::debug!(
            "Annotation delta: {} added, {} removed{}",
            delta.added.len(),
            delta.removed.len(),
            if delta.reset { " (reset)" } else { "" }
        );
        Ok(delta)
    }

    /// Forget everything shown. The next successful load is a reset.
    pub fn clear(&mut self) {
        self.photos.clear();
        self.clusters.clear();
        self.group_maker.clear(None);
        self.displayed.clear();
        self.pending_reset = true;
    }

    /// Which displayed annotation each shown photo currently belongs to.
    pub fn placement(&self) -> HashMap<PhotoId, &Annotation> {
        self.displayed
            .iter()
            .flat_map(|a| a.photos().iter().map(move |p| (p.id, a)))
            .collect()
    }
}
