//! Minimal prelude for SDK consumers.

pub use crate::config::MapConfig;
pub use crate::data::{Feature, FeatureKind, FeatureLoader, FeatureSources, SourceReady};
pub use crate::layers::{catalog, Layer, LayerId, LayerRegistry, StyleRule};
pub use crate::sdk::{BuildError, StoryMapBuilder};
pub use crate::story::NavPolicy;
pub use crate::{CameraNavigator, ViewState};
