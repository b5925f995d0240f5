use std::sync::Arc;

use plenka_state::{Cluster, Region, YearRange, Zoom, api::ClientResult};

use crate::{AnnotationDelta, AnnotationProvider, PhotoGateway, annotation_provider};

/// How much larger than the visible region each query is, so pins just off
/// screen are already loaded when the map pans.
pub const DEFAULT_REGION_EXPANSION: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub years: YearRange,
    pub region_expansion: f64,
    pub group_divisor: f64,
}
impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            years: YearRange::default(),
            region_expansion: DEFAULT_REGION_EXPANSION,
            group_divisor: annotation_provider::DEFAULT_GROUP_DIVISOR,
        }
    }
}

/// The state behind one map screen: decides when a viewport change
/// invalidates what is shown, and drives the [`AnnotationProvider`].
pub struct MapSession<G> {
    provider: AnnotationProvider<G>,
    zoom: Option<Zoom>,
    years: YearRange,
    region_expansion: f64,
    last_region: Option<Region>,
}
impl<G: PhotoGateway> MapSession<G> {
    pub fn new(gateway: Arc<G>, options: SessionOptions) -> Self {
        Self {
            provider: AnnotationProvider::with_group_divisor(gateway, options.group_divisor),
            zoom: None,
            years: options.years,
            region_expansion: options.region_expansion,
            last_region: None,
        }
    }

    pub fn provider(&self) -> &AnnotationProvider<G> {
        &self.provider
    }

    pub fn zoom(&self) -> Option<Zoom> {
        self.zoom
    }

    pub fn years(&self) -> YearRange {
        self.years
    }

    /// The most recent visible region, as passed to [`Self::viewport_changed`].
    pub fn last_region(&self) -> Option<Region> {
        self.last_region
    }

    /// Load the annotations for a new visible region.
    ///
    /// A change of zoom level throws away everything shown, since grouping
    /// and server clustering differ per level; a pan only loads what is new.
    pub async fn viewport_changed(&mut self, region: Region) -> ClientResult<AnnotationDelta> {
        let zoom = Zoom::from_span(region.span);
        if let Some(previous) = self.zoom.filter(|previous| previous.z() != zoom.z()) {
            tracing::info!(
                "Zoom level changed from {} to {}, clearing annotations",
                previous.z(),
                zoom.z()
            );
            self.provider.clear();
        }
        self.zoom = Some(zoom);
        self.last_region = Some(region);

        self.provider
            .load_annotations(zoom.z(), region.expanded(self.region_expansion), self.years)
            .await
    }

    /// Change the year filter. Returns whether it changed; if so, everything
    /// shown is cleared and the next load is a reset.
    pub fn set_year_range(&mut self, years: YearRange) -> bool {
        if years == self.years {
            return false;
        }
        tracing::info!("Year range changed from {} to {years}", self.years);
        self.years = years;
        self.provider.clear();
        true
    }

    /// The region to show when `cluster` is tapped: centered on it, one
    /// zoom level finer than the current one.
    pub fn cluster_tap_region(&self, cluster: &Cluster) -> Region {
        let zoom = self.zoom.unwrap_or_else(|| Zoom::from_level(Zoom::MIN as i32));
        let target = Zoom::from_level(zoom.cluster_expansion_level() as i32);
        Region::new(cluster.coordinate, target.span())
    }

    pub fn clear(&mut self) {
        self.provider.clear();
    }
}
