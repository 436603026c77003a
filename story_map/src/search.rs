//! Name search over one layer's features, and the search-to-camera hop.

use std::collections::BTreeMap;
use std::time::Duration;

use bevy::prelude::*;

use crate::camera::CameraNavigator;
use crate::data::{Feature, FeatureSources, SourceReady};
use crate::layers::LayerId;

/// Results shown under the search box.
pub const MAX_RESULTS: usize = 5;
pub const SEARCH_ZOOM: f32 = 8.0;
pub const SEARCH_DURATION: Duration = Duration::from_millis(600);

/// One searchable name.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexedFeature {
    pub display_name: String,
    pub coordinate: Vec2,
    /// Position in the source's feature list at build time.
    pub index: usize,
}

/// Normalized name → feature. Duplicate names keep the last feature seen.
#[derive(Resource, Debug)]
pub struct SearchIndex {
    layer: LayerId,
    entries: BTreeMap<String, IndexedFeature>,
}

impl SearchIndex {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            entries: BTreeMap::new(),
        }
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the whole index. The new map is built aside and swapped in,
    /// so a query never sees half of an old and half of a new index.
    pub fn build(&mut self, features: &[Feature]) {
        let mut entries = BTreeMap::new();
        for (index, feature) in features.iter().enumerate() {
            let key = normalize(&feature.display_name);
            if key.is_empty() {
                continue;
            }
            entries.insert(
                key,
                IndexedFeature {
                    display_name: feature.display_name.clone(),
                    coordinate: feature.coordinate(),
                    index,
                },
            );
        }
        self.entries = entries;
    }

    /// Up to [`MAX_RESULTS`] names containing `query`, case-insensitively,
    /// in alphabetical order. An empty query matches nothing.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a IndexedFeature> + 'a {
        let needle = normalize(query);
        let limit = if needle.is_empty() { 0 } else { MAX_RESULTS };
        self.entries
            .iter()
            .filter(move |(key, _)| key.contains(needle.as_str()))
            .map(|(_, entry)| entry)
            .take(limit)
    }

    /// Exact (normalized) name lookup.
    pub fn lookup(&self, name: &str) -> Option<&IndexedFeature> {
        self.entries.get(&normalize(name))
    }

    /// Animate the camera to `name`. Unknown names are a no-op and return false.
    pub fn zoom_to(&self, name: &str, camera: &mut CameraNavigator) -> bool {
        let Some(entry) = self.lookup(name) else {
            debug!("homelands: no search match for {name:?}");
            return false;
        };
        camera.animate_to(entry.coordinate, SEARCH_ZOOM, SEARCH_DURATION);
        true
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Rebuild the index whenever its layer's source (re)loads.
pub fn rebuild_search_index(
    mut ready: EventReader<SourceReady>,
    sources: Res<FeatureSources>,
    mut index: ResMut<SearchIndex>,
) {
    let reloaded = ready
        .read()
        .filter(|SourceReady(layer)| *layer == index.layer)
        .count()
        > 0;
    if reloaded {
        let layer = index.layer.clone();
        index.build(sources.features(&layer));
        info!("homelands: search index holds {} names", index.len());
    }
}
