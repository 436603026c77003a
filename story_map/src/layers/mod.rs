pub mod catalog;
mod choropleth;
mod fade;
mod registry;

use bevy::prelude::*;

pub use choropleth::{ramp_color, ChoroplethMetric, ChoroplethState};
pub use fade::{fade_tick_system, FadeEngine, FadeState, FADE_DURATION};
pub use registry::{Layer, LayerId, LayerRegistry, RegistryError, SourceRef, StyleRule};

pub fn fade_plugin(app: &mut App) {
    app.init_resource::<FadeEngine>()
        .add_systems(Update, fade_tick_system);
}
