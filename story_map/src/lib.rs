//! Homelands story map: layer registry with fades, pointer popups, name
//! search, and a story mode that steers the camera from slide to slide.
//!
//! Library root: data, layer, interaction and SDK builder modules.

mod camera;
pub mod config;
pub mod data;
pub mod layers;
pub mod media;
pub mod pointer;
pub mod region;
mod scene;
pub mod search;
pub mod story;
mod ui;

pub mod prelude;
pub mod sdk;

pub use camera::{CameraNavigator, ViewState, MAX_ZOOM, MIN_ZOOM};
pub use data::{FeatureLoader, GeoJsonFileLoader, LoadRequest, SourcePayload};
