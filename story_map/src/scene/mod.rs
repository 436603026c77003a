mod draw;

use bevy::prelude::*;

use crate::camera::{CameraNavigator, MapCamera};
use crate::config::MapConfig;
use crate::data::{FeatureSources, GeoJsonFileLoader, SourceChannel};
use crate::layers::LayerRegistry;
use crate::region::RegionRefresh;

pub use draw::draw_layers_system;

pub fn setup_scene(mut commands: Commands, navigator: Res<CameraNavigator>) {
    let view = navigator.view();
    commands.spawn((
        Camera2d,
        MapCamera,
        Transform::from_xyz(view.center.x, view.center.y, 0.0),
    ));
}

/// Kick off the initial load of every layer. Region-bounded layers are
/// left to the region refresh when it is running.
pub fn request_sources(
    registry: Res<LayerRegistry>,
    config: Res<MapConfig>,
    channel: Res<SourceChannel>,
    region: Option<Res<RegionRefresh>>,
    mut sources: ResMut<FeatureSources>,
) {
    for layer in registry.iter() {
        let by_region = region.as_ref().is_some_and(|r| r.layer() == layer.id());
        if by_region {
            continue;
        }
        sources.request::<GeoJsonFileLoader>(&channel, layer, &config.data_dir, None);
    }
    info!(
        "homelands: requested {} layer sources from {}",
        registry.iter().count(),
        config.data_dir.display()
    );
}
