//! Representations of the map's state: photos, server clusters, local groups,
//! and the zoom model that decides when they must be rebuilt.
//!
//! Separated out to allow for use in other utilities.
#![deny(missing_docs)]

pub use plenka_api as api;
pub use plenka_api::{Coordinate, ImageQuality, Region, Span, YearRange};

mod photo;
pub use photo::{Photo, PhotoId};

mod direction;
pub use direction::{Direction, UnknownDirection};

mod cluster;
pub use cluster::Cluster;

mod group;
pub use group::PhotoGroup;

mod annotation;
pub use annotation::Annotation;

mod detailed_photo;
pub use detailed_photo::{DetailedPhoto, PhotoSource};

mod zoom;
pub use zoom::Zoom;
