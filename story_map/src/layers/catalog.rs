//! The exhibit's layers, declared once at startup. Declaration order is
//! draw order within equal z; ids are stable for the life of the map.

use bevy::prelude::*;

use crate::data::FeatureKind;
use crate::layers::registry::{Layer, StyleRule};

pub const COUNTIES: &str = "counties";
pub const RESERVATIONS: &str = "reservations";
pub const ANCESTRAL: &str = "ancestral";
pub const TRIBAL_MARKERS: &str = "tribalMarkers";

pub fn exhibit_layers() -> Vec<Layer> {
    vec![
        Layer::new(
            COUNTIES,
            "Demographics",
            FeatureKind::County,
            "counties.geojson",
            1,
        )
        .with_title("Counties")
        .with_style(StyleRule {
            stroke: Color::srgba(0.9, 0.9, 0.9, 0.35),
            point_radius: 0.0,
        })
        .clickable(0),
        Layer::new(
            RESERVATIONS,
            "Boundaries",
            FeatureKind::Reservation,
            "reservations-geocoded.geojson",
            2,
        )
        .with_title("Reservations")
        .with_style(StyleRule {
            stroke: Color::srgb(1.0, 0.76, 0.03),
            point_radius: 0.0,
        })
        .hoverable()
        .clickable(2),
        Layer::new(
            ANCESTRAL,
            "Boundaries",
            FeatureKind::AncestralTerritory,
            "native-lands.geojson",
            0,
        )
        .with_title("Ancestral lands")
        .with_style(StyleRule {
            stroke: Color::srgba(0.75, 0.52, 0.99, 0.5),
            point_radius: 0.0,
        })
        .hoverable()
        .clickable(3)
        .region_bounded(),
        Layer::new(
            TRIBAL_MARKERS,
            "Nations",
            FeatureKind::TribalMarker,
            "tribal-markers-geocoded.geojson",
            3,
        )
        .with_title("Tribal nations")
        .with_style(StyleRule {
            stroke: Color::srgb(1.0, 0.4, 0.0),
            point_radius: 5.0,
        })
        .clickable(1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::LayerRegistry;

    #[test]
    fn exhibit_layers_register_cleanly() {
        let mut registry = LayerRegistry::default();
        for layer in exhibit_layers() {
            registry.register(layer).unwrap();
        }
        assert_eq!(registry.iter().count(), 4);
        for kind in [
            FeatureKind::County,
            FeatureKind::Reservation,
            FeatureKind::AncestralTerritory,
            FeatureKind::TribalMarker,
        ] {
            assert!(registry.layer_for_kind(kind).is_some(), "{kind:?} has a layer");
        }
    }

    #[test]
    fn county_layer_is_consulted_before_markers() {
        let layers = exhibit_layers();
        let priority = |id: &str| {
            layers
                .iter()
                .find(|l| l.id().as_str() == id)
                .and_then(|l| l.click_priority())
        };
        assert!(priority(COUNTIES) < priority(TRIBAL_MARKERS));
    }
}
