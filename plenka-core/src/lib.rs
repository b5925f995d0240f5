//! The map pipeline: turns viewport changes into annotation deltas, plus the
//! image and favourites services a map screen needs alongside it.

pub use plenka_state;

mod gateway;
pub use gateway::{PhotoGateway, ViewportContent};

mod group_maker;
pub use group_maker::GroupMaker;

pub mod annotation_provider;
pub use annotation_provider::{AnnotationDelta, AnnotationProvider};

pub mod map_session;
pub use map_session::{MapSession, SessionOptions};

pub mod session_thread;
pub use session_thread::{MapEvent, MapEventRx, SessionThread, SessionThreadSendHandle, ViewportRequest};

pub mod image_fetcher;
pub use image_fetcher::{ImageFetchError, ImageFetcher, ImageKey, ImageResult};

mod favourites;
pub use favourites::{Favourites, FavouritesError, FavouritesResult};
