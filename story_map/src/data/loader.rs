//! Feature loaders: read a GeoJSON file on a dedicated thread and hand the
//! decoded features back over a channel.

use std::path::{Path, PathBuf};
use std::thread;

use bevy::log::{info, warn};
use crossbeam_channel::{Receiver, Sender};

use crate::data::geojson::{decode_collection, decode_within, LoadError};
use crate::data::model::{Bbox, Feature, FeatureKind, Place};
use crate::data::FeatureLoader;
use crate::layers::{Layer, LayerId};

/// What to load, for which layer, and which load generation it answers.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub layer: LayerId,
    pub kind: FeatureKind,
    pub path: PathBuf,
    /// Restrict the result to features touching this box.
    pub bbox: Option<Bbox>,
    pub generation: u64,
}

impl LoadRequest {
    /// Whole-file request for `layer`'s source under `data_dir`.
    pub fn for_layer(layer: &Layer, data_dir: &Path, generation: u64) -> Self {
        Self {
            layer: layer.id().clone(),
            kind: layer.kind(),
            path: data_dir.join(&layer.source().0),
            bbox: None,
            generation,
        }
    }

    pub fn within(mut self, bbox: Bbox) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Decoded features for one layer.
#[derive(Clone, Debug)]
pub struct SourcePayload {
    pub layer: LayerId,
    pub generation: u64,
    pub features: Vec<Feature>,
    /// Set when `features` covers only part of the source.
    pub region: Option<RegionIndex>,
}

/// The box a region load was cut to, and the places of the whole source.
#[derive(Clone, Debug)]
pub struct RegionIndex {
    pub extent: Bbox,
    pub places: Vec<Place>,
}

/// Loads features from a GeoJSON file on disk.
pub struct GeoJsonFileLoader;

impl FeatureLoader for GeoJsonFileLoader {
    fn spawn(request: LoadRequest) -> Receiver<SourcePayload> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        thread::spawn(move || load_and_send(request, &tx));
        rx
    }
}

// A failed load still answers with an empty payload, so anything waiting
// on the layer settles instead of waiting forever.
fn load_and_send(request: LoadRequest, tx: &Sender<SourcePayload>) {
    let (features, region) = match read_features(&request) {
        Ok((features, region)) => {
            info!(
                "homelands: loaded {} features for layer {} ({})",
                features.len(),
                request.layer,
                request.path.display()
            );
            (features, region)
        }
        Err(err) => {
            warn!("homelands: layer {} failed to load: {err}", request.layer);
            (Vec::new(), None)
        }
    };
    let _ = tx.send(SourcePayload {
        layer: request.layer,
        generation: request.generation,
        features,
        region,
    });
}

fn read_features(request: &LoadRequest) -> Result<(Vec<Feature>, Option<RegionIndex>), LoadError> {
    let json = std::fs::read_to_string(&request.path).map_err(|source| LoadError::Io {
        path: request.path.clone(),
        source,
    })?;
    match request.bbox {
        Some(extent) => {
            let region = decode_within(request.kind, &json, &extent)?;
            let index = RegionIndex {
                extent,
                places: region.places,
            };
            Ok((region.features, Some(index)))
        }
        None => Ok((decode_collection(request.kind, &json)?, None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_file_answers_with_empty_payload() {
        let rx = GeoJsonFileLoader::spawn(LoadRequest {
            layer: LayerId::from("reservations"),
            kind: FeatureKind::Reservation,
            path: PathBuf::from("/nonexistent/reservations.geojson"),
            bbox: None,
            generation: 3,
        });
        let payload = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("loader should answer");
        assert_eq!(payload.layer, LayerId::from("reservations"));
        assert_eq!(payload.generation, 3);
        assert!(payload.features.is_empty());
        assert!(payload.region.is_none());
    }
}
