//! Viewport-bounded refresh for the ancestral-territory overlay.
//!
//! The full territory file is large, so while the layer is shown only the
//! features touching the current view are kept. View changes settle for
//! [`REGION_DEBOUNCE`] before a refresh is issued; every refresh goes
//! through [`FeatureSources::request`], whose generation check drops any
//! answer that a newer refresh has overtaken.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::{CameraNavigator, ViewState};
use crate::config::MapConfig;
use crate::data::{Bbox, FeatureSources, GeoJsonFileLoader, SourceChannel};
use crate::layers::{LayerId, LayerRegistry};

pub const REGION_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Resource, Debug)]
pub struct RegionRefresh {
    layer: LayerId,
    debounce: Duration,
    /// Box waiting to be fetched, and when it becomes due.
    pending: Option<(Duration, Bbox)>,
    observed: Option<Bbox>,
    fetched: Option<Bbox>,
    issued: u64,
}

impl RegionRefresh {
    pub fn new(layer: LayerId) -> Self {
        Self {
            layer,
            debounce: REGION_DEBOUNCE,
            pending: None,
            observed: None,
            fetched: None,
            issued: 0,
        }
    }

    pub fn layer(&self) -> &LayerId {
        &self.layer
    }

    /// Refreshes issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Record the visible box at `now`. Each change restarts the debounce.
    pub fn on_view_changed(&mut self, now: Duration, bbox: Bbox) {
        if self.observed == Some(bbox) {
            return;
        }
        self.observed = Some(bbox);
        // First sight of the layer fetches right away.
        let due = if self.fetched.is_none() {
            now
        } else {
            now + self.debounce
        };
        self.pending = Some((due, bbox));
    }

    /// The box to fetch now, if the view has settled on one not yet fetched.
    pub fn poll(&mut self, now: Duration) -> Option<Bbox> {
        let (due, bbox) = self.pending?;
        if now < due {
            return None;
        }
        self.pending = None;
        if self.fetched == Some(bbox) {
            return None;
        }
        self.fetched = Some(bbox);
        self.issued += 1;
        Some(bbox)
    }

    /// Layer hidden: forget the view so showing it again refetches at once.
    pub fn reset(&mut self) {
        self.pending = None;
        self.observed = None;
        self.fetched = None;
    }
}

/// Map-space box covered by a window of `window_size` pixels.
pub fn view_bbox(view: ViewState, window_size: Vec2) -> Bbox {
    Bbox::around(view.center, window_size / 2.0 * view.resolution())
}

pub fn region_plugin(app: &mut App) {
    app.add_systems(Update, region_refresh_system);
}

#[allow(clippy::too_many_arguments)]
fn region_refresh_system(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    navigator: Res<CameraNavigator>,
    registry: Res<LayerRegistry>,
    config: Res<MapConfig>,
    channel: Res<SourceChannel>,
    mut sources: ResMut<FeatureSources>,
    mut refresh: ResMut<RegionRefresh>,
) {
    let Some(layer) = registry.get(refresh.layer()) else {
        return;
    };
    if !layer.requested_visible() {
        refresh.reset();
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let now = time.elapsed();
    let size = Vec2::new(window.width(), window.height());
    refresh.on_view_changed(now, view_bbox(navigator.view(), size));

    if let Some(bbox) = refresh.poll(now) {
        let generation = sources.request::<GeoJsonFileLoader>(&channel, layer, &config.data_dir, Some(bbox));
        debug!(
            "homelands: region refresh #{} (generation {generation}) for layer {}",
            refresh.issued(),
            layer.id()
        );
    }
}
