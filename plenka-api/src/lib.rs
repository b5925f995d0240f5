//! A barebones client for the PastVu photo API.
#![deny(missing_docs)]

mod client;
pub use client::*;

mod geo;
pub use geo::*;

mod photo;
pub use photo::*;

mod bounds;
pub use bounds::*;

mod details;
pub use details::*;

mod image;
pub use image::*;

mod request;
