mod channel;
pub mod geojson;
mod loader;
mod model;
pub mod projection;
mod sources;

use crossbeam_channel::Receiver;

pub use channel::SourceChannel;
pub use geojson::{LoadError, Region};
pub use loader::{GeoJsonFileLoader, LoadRequest, RegionIndex, SourcePayload};
pub use model::{Bbox, Feature, FeatureKind, Geometry, Place};
pub use sources::{ingest_sources, FeatureSources, LoadState, SourceReady};

/// Interface for feature loaders. A loader answers exactly one payload
/// per request on the returned receiver.
pub trait FeatureLoader: Send + 'static {
    fn spawn(request: LoadRequest) -> Receiver<SourcePayload>;
}
