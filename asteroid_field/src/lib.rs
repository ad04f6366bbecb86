//! Near-Earth object tracker: NeoWs feed, procedural asteroid field around a
//! globe, and a caching HTTP proxy for the feed.

mod camera;
pub mod config;
pub mod data;
pub mod geometry;
pub mod render;
pub mod scene;
pub mod server;
mod ui;

pub mod prelude;
pub mod sdk;

pub use data::{DateRange, FeedConfig, FeedQuery, FeedSource, FetchError, NormalizedObject};
pub use ui::{format_metric, SelectedAsteroid};
