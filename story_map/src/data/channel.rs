use crossbeam_channel::{Receiver, Sender};

use crate::data::loader::{LoadRequest, SourcePayload};
use crate::data::FeatureLoader;

/// Bevy resource fanning every loader's results into one receiver.
/// Systems drain this in `ingest_sources`.
#[derive(bevy::prelude::Resource)]
pub struct SourceChannel {
    tx: Sender<SourcePayload>,
    rx: Receiver<SourcePayload>,
}

impl Default for SourceChannel {
    fn default() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(64);
        Self { tx, rx }
    }
}

impl SourceChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `L` for the request and forward its answer into this channel.
    pub fn submit<L: FeatureLoader>(&self, request: LoadRequest) {
        let rx = L::spawn(request);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            while let Ok(payload) = rx.recv() {
                if tx.send(payload).is_err() {
                    return;
                }
            }
        });
    }

    /// Hand a payload in directly, bypassing any loader.
    pub fn push(&self, payload: SourcePayload) {
        let _ = self.tx.send(payload);
    }

    pub fn try_recv(&self) -> Option<SourcePayload> {
        self.rx.try_recv().ok()
    }
}
