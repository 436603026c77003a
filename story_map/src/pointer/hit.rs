//! Hit testing against loaded features in map space.

use bevy::prelude::*;

use crate::camera::ViewState;
use crate::data::{Feature, FeatureSources, Geometry};
use crate::layers::Layer;
use crate::pointer::dispatcher::HitTester;

/// Extra slop around point markers, in pixels.
const POINT_SLOP: f32 = 3.0;

/// Screen-to-map conversion for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenMapping {
    pub view: ViewState,
    pub window_size: Vec2,
}

impl ScreenMapping {
    /// Cursor pixel (origin top-left) to map units.
    pub fn to_map(&self, pixel: Vec2) -> Vec2 {
        let offset = pixel - self.window_size / 2.0;
        self.view.center + Vec2::new(offset.x, -offset.y) * self.view.resolution()
    }

    /// Map units to cursor pixel. Inverse of [`to_map`](Self::to_map).
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        let offset = (point - self.view.center) / self.view.resolution();
        self.window_size / 2.0 + Vec2::new(offset.x, -offset.y)
    }
}

/// Tests pixels against the features in [`FeatureSources`].
pub struct WorldHitTester<'a> {
    sources: &'a FeatureSources,
    mapping: ScreenMapping,
}

impl<'a> WorldHitTester<'a> {
    pub fn new(sources: &'a FeatureSources, mapping: ScreenMapping) -> Self {
        Self { sources, mapping }
    }

    fn hits(&self, feature: &Feature, pixel: Vec2, world: Vec2, radius: f32) -> bool {
        match &feature.geometry {
            Geometry::Point(p) => self.mapping.to_screen(*p).distance(pixel) <= radius + POINT_SLOP,
            geometry => geometry.contains(world),
        }
    }
}

impl HitTester for WorldHitTester<'_> {
    fn features_at(&self, pixel: Vec2, layer: &Layer) -> Vec<&Feature> {
        let world = self.mapping.to_map(pixel);
        let radius = layer.style().point_radius;
        // Later features draw over earlier ones, so they come first.
        self.sources
            .features(layer.id())
            .iter()
            .rev()
            .filter(|f| self.hits(f, pixel, world, radius))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureKind, SourcePayload};
    use crate::layers::{catalog, LayerRegistry};

    fn mapping() -> ScreenMapping {
        ScreenMapping {
            view: ViewState {
                center: Vec2::new(1000.0, 1000.0),
                zoom: 10.0,
            },
            window_size: Vec2::new(800.0, 600.0),
        }
    }

    #[test]
    fn screen_and_map_round_trip() {
        let m = mapping();
        assert_eq!(m.to_map(Vec2::new(400.0, 300.0)), Vec2::new(1000.0, 1000.0));
        let p = Vec2::new(120.0, 45.0);
        assert!(m.to_screen(m.to_map(p)).distance(p) < 1e-2);
        // Up on screen is north on the map.
        assert!(m.to_map(Vec2::new(400.0, 0.0)).y > 1000.0);
    }

    #[test]
    fn points_and_polygons_are_hit() {
        let m = mapping();
        let res = m.view.resolution();
        let square = Geometry::Polygon(vec![vec![
            Vec2::new(900.0, 900.0),
            Vec2::new(1100.0, 900.0),
            Vec2::new(1100.0, 1100.0),
            Vec2::new(900.0, 1100.0),
            Vec2::new(900.0, 900.0),
        ]]);
        let props = |name: &str| {
            let mut p = serde_json::Map::new();
            p.insert("name".into(), name.into());
            p
        };

        let mut registry = LayerRegistry::default();
        for layer in catalog::exhibit_layers() {
            registry.register(layer).unwrap();
        }
        let counties = registry.get(&catalog::COUNTIES.into()).unwrap();
        let markers = registry.get(&catalog::TRIBAL_MARKERS.into()).unwrap();

        let mut sources = FeatureSources::default();
        for (layer, features) in [
            (counties, vec![Feature::new(FeatureKind::County, square, props("Apache"))]),
            (
                markers,
                vec![Feature::new(
                    FeatureKind::TribalMarker,
                    Geometry::Point(Vec2::new(1000.0 + 50.0 * res, 1000.0)),
                    props("Hopi"),
                )],
            ),
        ] {
            let generation = sources.begin_load(layer.id());
            sources.apply(SourcePayload {
                layer: layer.id().clone(),
                generation,
                features,
                region: None,
            });
        }

        let tester = WorldHitTester::new(&sources, m);
        let center = Vec2::new(400.0, 300.0);
        assert_eq!(tester.features_at(center, counties).len(), 1);
        assert!(tester.features_at(center, markers).is_empty());
        let on_marker = tester.features_at(Vec2::new(452.0, 300.0), markers);
        assert_eq!(on_marker[0].display_name, "Hopi");
        assert!(tester.features_at(Vec2::new(0.0, 0.0), counties).is_empty());
    }
}
