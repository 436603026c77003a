//! Per-layer feature sources: load state, features, and the ready signal.

use std::collections::HashMap;
use std::path::Path;

use bevy::prelude::*;

use crate::data::channel::SourceChannel;
use crate::data::loader::{LoadRequest, RegionIndex, SourcePayload};
use crate::data::model::{Bbox, Feature};
use crate::data::FeatureLoader;
use crate::layers::{Layer, LayerId};

const MAX_PAYLOADS_PER_FRAME: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Sent once per applied payload; this is the "source loaded" signal.
#[derive(Event, Clone, Debug, PartialEq, Eq)]
pub struct SourceReady(pub LayerId);

#[derive(Debug)]
struct SourceState {
    state: LoadState,
    generation: u64,
    features: Vec<Feature>,
    region: Option<RegionIndex>,
}

/// Feature collections backing each layer.
#[derive(Resource, Default, Debug)]
pub struct FeatureSources {
    sources: HashMap<LayerId, SourceState>,
}

impl FeatureSources {
    /// Start a (re)load of `layer`. Returns the generation a payload must
    /// carry to be accepted; answers to older generations are dropped.
    /// Features already present stay readable until the new ones land.
    pub fn begin_load(&mut self, layer: &LayerId) -> u64 {
        let source = self
            .sources
            .entry(layer.clone())
            .or_insert_with(|| SourceState {
                state: LoadState::Loading,
                generation: 0,
                features: Vec::new(),
                region: None,
            });
        source.generation += 1;
        source.state = LoadState::Loading;
        source.generation
    }

    /// Begin a load of `layer` and hand it to loader `L` on `channel`.
    /// With a `bbox`, only features touching it are kept.
    pub fn request<L: FeatureLoader>(
        &mut self,
        channel: &SourceChannel,
        layer: &Layer,
        data_dir: &Path,
        bbox: Option<Bbox>,
    ) -> u64 {
        let generation = self.begin_load(layer.id());
        let request = LoadRequest::for_layer(layer, data_dir, generation);
        channel.submit::<L>(match bbox {
            Some(bbox) => request.within(bbox),
            None => request,
        });
        generation
    }

    /// Apply a payload. Returns false for payloads of unknown layers or
    /// superseded generations.
    pub fn apply(&mut self, payload: SourcePayload) -> bool {
        let Some(source) = self.sources.get_mut(&payload.layer) else {
            return false;
        };
        if payload.generation != source.generation {
            return false;
        }
        source.features = payload.features;
        source.region = payload.region;
        source.state = LoadState::Ready;
        true
    }

    /// `None` when nothing was ever requested for the layer.
    pub fn state(&self, layer: &LayerId) -> Option<LoadState> {
        self.sources.get(layer).map(|s| s.state)
    }

    pub fn features(&self, layer: &LayerId) -> &[Feature] {
        self.sources
            .get(layer)
            .map(|s| s.features.as_slice())
            .unwrap_or_default()
    }

    /// First feature of `layer` whose display name equals `name` exactly.
    pub fn find_by_name(&self, layer: &LayerId, name: &str) -> Option<&Feature> {
        self.features(layer)
            .iter()
            .find(|f| f.display_name == name)
    }

    /// Coordinate of `name` when `layer` holds only a region of its source
    /// and the feature lies outside it.
    pub fn locate_unloaded(&self, layer: &LayerId, name: &str) -> Option<Vec2> {
        let region = self.sources.get(layer)?.region.as_ref()?;
        region
            .places
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.coordinate)
            .filter(|at| !region.extent.contains(*at))
    }
}

/// Drains loader results into [`FeatureSources`] and announces ready layers.
pub fn ingest_sources(
    channel: Res<SourceChannel>,
    mut sources: ResMut<FeatureSources>,
    mut ready: EventWriter<SourceReady>,
) {
    let mut received = 0usize;
    while received < MAX_PAYLOADS_PER_FRAME {
        let Some(payload) = channel.try_recv() else {
            break;
        };
        received += 1;
        let layer = payload.layer.clone();
        if sources.apply(payload) {
            ready.send(SourceReady(layer));
        } else {
            debug!("homelands: dropped stale payload for layer {layer}");
        }
    }
}
