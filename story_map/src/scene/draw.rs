//! Layer drawing with gizmos: outlines for polygons, circles for points,
//! each tinted by its layer's current opacity. The story highlight is drawn
//! last, over everything.

use bevy::prelude::*;

use crate::camera::CameraNavigator;
use crate::data::{Feature, FeatureKind, FeatureSources, Geometry};
use crate::layers::{ramp_color, ChoroplethState, LayerRegistry};
use crate::story::StorySequencer;

const HIGHLIGHT_COLOR: Color = Color::srgb(0.0, 0.9, 1.0);
const HIGHLIGHT_POINT_RADIUS: f32 = 9.0;

pub fn draw_layers_system(
    mut gizmos: Gizmos,
    navigator: Res<CameraNavigator>,
    registry: Res<LayerRegistry>,
    sources: Res<FeatureSources>,
    choropleth: Res<ChoroplethState>,
    story: Option<Res<StorySequencer>>,
) {
    // Point radii are in pixels; geometry is in map units.
    let px = navigator.view().resolution();

    for layer in registry.by_z_order() {
        if !layer.is_visible() || layer.opacity() <= 0.0 {
            continue;
        }
        let style = layer.style();
        for feature in sources.features(layer.id()) {
            let color = match feature.kind {
                FeatureKind::County => ramp_color(choropleth.active.normalized(feature)),
                _ => style.stroke,
            };
            let alpha = color.alpha() * layer.opacity();
            draw_feature(&mut gizmos, feature, color.with_alpha(alpha), style.point_radius * px);
        }
    }

    if let Some(story) = story {
        for feature in story.highlight().features() {
            draw_feature(&mut gizmos, feature, HIGHLIGHT_COLOR, HIGHLIGHT_POINT_RADIUS * px);
        }
    }
}

fn draw_feature(gizmos: &mut Gizmos, feature: &Feature, color: Color, point_radius: f32) {
    match &feature.geometry {
        Geometry::Point(p) => {
            gizmos.circle_2d(Isometry2d::from_translation(*p), point_radius, color);
        }
        geometry => {
            for ring in geometry.rings() {
                gizmos.linestrip_2d(ring.iter().copied(), color);
            }
        }
    }
}
