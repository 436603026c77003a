//! Turns pointer positions into at most one tooltip and one popup.
//!
//! Hover considers hover-enabled layers and takes the topmost by z order.
//! Click walks click-enabled layers in declared priority order (county
//! before markers) and stops at the first layer with a hit, even if a
//! later layer also has one under the same pixel.

use std::time::Duration;

use bevy::prelude::*;

use crate::data::Feature;
use crate::layers::{Layer, LayerRegistry};
use crate::pointer::popup::{PopupContent, PopupState};

/// Two taps closer than this in time...
pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(400);
/// ...and space count as a double tap.
pub const DOUBLE_TAP_RADIUS: f32 = 8.0;

/// Capability supplied by the map canvas: features of `layer` under a
/// screen pixel, topmost first. An empty result is a miss, not an error.
pub trait HitTester {
    fn features_at(&self, pixel: Vec2, layer: &Layer) -> Vec<&Feature>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub name: String,
    pub pixel: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub enum HoverOutcome {
    Show(Tooltip),
    Clear,
    /// Same pixel or same feature as before; nothing to redraw.
    Unchanged,
    /// A newer hover was issued after this one; result dropped.
    Stale,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickOutcome {
    Opened(PopupState),
    Cleared,
}

/// Ticket for a hover lookup; only the newest ticket's result is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverTicket {
    seq: u64,
    pixel: Vec2,
}

#[derive(Resource, Debug)]
pub struct PointerDispatcher {
    media_prefix: String,
    hover_seq: u64,
    last_hover_pixel: Option<Vec2>,
    tooltip: Option<Tooltip>,
    popup: Option<PopupState>,
    last_tap: Option<(Duration, Vec2)>,
}

impl Default for PointerDispatcher {
    fn default() -> Self {
        Self::new("/media/")
    }
}

impl PointerDispatcher {
    pub fn new(media_prefix: impl Into<String>) -> Self {
        Self {
            media_prefix: media_prefix.into(),
            hover_seq: 0,
            last_hover_pixel: None,
            tooltip: None,
            popup: None,
            last_tap: None,
        }
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn popup(&self) -> Option<&PopupState> {
        self.popup.as_ref()
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    /// Hover in one step: look up and apply.
    pub fn on_hover(
        &mut self,
        pixel: Vec2,
        registry: &LayerRegistry,
        hits: &dyn HitTester,
    ) -> HoverOutcome {
        let Some(ticket) = self.begin_hover(pixel) else {
            return HoverOutcome::Unchanged;
        };
        let name = topmost_hover_name(pixel, registry, hits);
        self.resolve_hover(ticket, name)
    }

    /// Issue a ticket for a hover at `pixel`. `None` if the pointer hasn't
    /// moved since the last hover.
    pub fn begin_hover(&mut self, pixel: Vec2) -> Option<HoverTicket> {
        if self.last_hover_pixel == Some(pixel) {
            return None;
        }
        self.last_hover_pixel = Some(pixel);
        self.hover_seq += 1;
        Some(HoverTicket {
            seq: self.hover_seq,
            pixel,
        })
    }

    /// Apply the result of a hover lookup.
    pub fn resolve_hover(&mut self, ticket: HoverTicket, name: Option<String>) -> HoverOutcome {
        if ticket.seq < self.hover_seq {
            return HoverOutcome::Stale;
        }
        if let Some(tooltip) = self.tooltip.as_mut().filter(|t| Some(&t.name) == name.as_ref()) {
            // Same feature: follow the pointer without reporting a change.
            tooltip.pixel = ticket.pixel;
            return HoverOutcome::Unchanged;
        }
        if self.tooltip.is_none() && name.is_none() {
            return HoverOutcome::Unchanged;
        }
        match name {
            Some(name) => {
                let tooltip = Tooltip {
                    name,
                    pixel: ticket.pixel,
                };
                self.tooltip = Some(tooltip.clone());
                HoverOutcome::Show(tooltip)
            }
            None => {
                self.tooltip = None;
                HoverOutcome::Clear
            }
        }
    }

    /// Pointer left the map (e.g. onto a panel).
    pub fn clear_hover(&mut self) {
        self.last_hover_pixel = None;
        self.hover_seq += 1;
        self.tooltip = None;
    }

    /// Resolve a click into the single live popup. `anchor` is the clicked
    /// map coordinate the popup attaches to.
    pub fn on_click(
        &mut self,
        pixel: Vec2,
        anchor: Vec2,
        registry: &LayerRegistry,
        hits: &dyn HitTester,
    ) -> ClickOutcome {
        let mut candidates: Vec<(u8, &Layer)> = registry
            .iter()
            .filter(|l| l.is_visible())
            .filter_map(|l| l.click_priority().map(|p| (p, l)))
            .collect();
        candidates.sort_by_key(|(priority, _)| *priority);

        let hit = candidates
            .into_iter()
            .find_map(|(_, layer)| hits.features_at(pixel, layer).into_iter().next());

        match hit {
            Some(feature) => {
                let popup = PopupState {
                    anchor,
                    content: PopupContent::from_feature(feature, &self.media_prefix),
                };
                self.popup = Some(popup.clone());
                ClickOutcome::Opened(popup)
            }
            None => {
                self.popup = None;
                ClickOutcome::Cleared
            }
        }
    }

    /// Record a tap; true when it completes a double tap with the previous one.
    pub fn on_tap(&mut self, pixel: Vec2, now: Duration) -> bool {
        let double = self.last_tap.is_some_and(|(at, last)| {
            now.saturating_sub(at) < DOUBLE_TAP_WINDOW && last.distance(pixel) <= DOUBLE_TAP_RADIUS
        });
        // A double tap consumes both taps; a third starts over.
        self.last_tap = if double { None } else { Some((now, pixel)) };
        double
    }
}

fn topmost_hover_name(pixel: Vec2, registry: &LayerRegistry, hits: &dyn HitTester) -> Option<String> {
    let mut layers: Vec<&Layer> = registry
        .iter()
        .filter(|l| l.is_hoverable() && l.is_visible())
        .collect();
    layers.sort_by_key(|l| std::cmp::Reverse(l.z_order()));
    layers
        .into_iter()
        .find_map(|layer| hits.features_at(pixel, layer).into_iter().next())
        .map(|feature| feature.display_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureKind, Geometry};
    use crate::layers::{catalog, LayerId};
    use crate::pointer::popup::TerritoryTooltip;
    use std::collections::HashMap;

    /// Canned hits per layer, ignoring the pixel.
    #[derive(Default)]
    struct FixedHits(HashMap<LayerId, Vec<Feature>>);

    impl FixedHits {
        fn with(mut self, layer: &str, kind: FeatureKind, name: &str) -> Self {
            let mut props = serde_json::Map::new();
            props.insert("name".into(), name.into());
            self.0
                .entry(LayerId::from(layer))
                .or_default()
                .push(Feature::new(kind, Geometry::Point(Vec2::ZERO), props));
            self
        }
    }

    impl HitTester for FixedHits {
        fn features_at(&self, _pixel: Vec2, layer: &Layer) -> Vec<&Feature> {
            self.0
                .get(layer.id())
                .map(|features| features.iter().collect())
                .unwrap_or_default()
        }
    }

    fn registry() -> LayerRegistry {
        let mut registry = LayerRegistry::default();
        for layer in catalog::exhibit_layers() {
            registry.register(layer).unwrap();
        }
        registry
    }

    #[test]
    fn click_prefers_county_over_marker_at_same_pixel() {
        let registry = registry();
        let hits = FixedHits::default()
            .with(catalog::TRIBAL_MARKERS, FeatureKind::TribalMarker, "Navajo Nation")
            .with(catalog::COUNTIES, FeatureKind::County, "Apache");
        let mut dispatcher = PointerDispatcher::default();

        let outcome = dispatcher.on_click(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0), &registry, &hits);
        let ClickOutcome::Opened(popup) = outcome else {
            panic!("expected a popup");
        };
        assert!(matches!(popup.content, PopupContent::County(ref c) if c.name == "Apache"));
        assert_eq!(popup.anchor, Vec2::new(5.0, 5.0));
        assert_eq!(dispatcher.popup(), Some(&popup));
    }

    #[test]
    fn click_miss_clears_the_popup() {
        let registry = registry();
        let hits = FixedHits::default().with(catalog::TRIBAL_MARKERS, FeatureKind::TribalMarker, "Hopi");
        let mut dispatcher = PointerDispatcher::default();
        dispatcher.on_click(Vec2::ZERO, Vec2::ZERO, &registry, &hits);
        assert!(dispatcher.popup().is_some());

        let outcome = dispatcher.on_click(Vec2::ZERO, Vec2::ZERO, &registry, &FixedHits::default());
        assert_eq!(outcome, ClickOutcome::Cleared);
        assert!(dispatcher.popup().is_none());
    }

    #[test]
    fn new_click_replaces_previous_popup() {
        let registry = registry();
        let mut dispatcher = PointerDispatcher::default();
        let first = FixedHits::default().with(catalog::TRIBAL_MARKERS, FeatureKind::TribalMarker, "Hopi");
        let second = FixedHits::default().with(catalog::RESERVATIONS, FeatureKind::Reservation, "Hopi Reservation");
        dispatcher.on_click(Vec2::ZERO, Vec2::ZERO, &registry, &first);
        dispatcher.on_click(Vec2::ONE, Vec2::ONE, &registry, &second);
        assert_eq!(
            dispatcher.popup().map(|p| &p.content),
            Some(&PopupContent::Territory(TerritoryTooltip {
                name: "Hopi Reservation".into(),
                kind: FeatureKind::Reservation,
            }))
        );
    }

    #[test]
    fn hidden_layers_are_not_clickable() {
        let mut registry = LayerRegistry::default();
        for layer in catalog::exhibit_layers() {
            let layer = if layer.id().as_str() == catalog::COUNTIES {
                layer.hidden()
            } else {
                layer
            };
            registry.register(layer).unwrap();
        }
        let hits = FixedHits::default()
            .with(catalog::COUNTIES, FeatureKind::County, "Apache")
            .with(catalog::TRIBAL_MARKERS, FeatureKind::TribalMarker, "Navajo Nation");
        let mut dispatcher = PointerDispatcher::default();
        dispatcher.on_click(Vec2::ZERO, Vec2::ZERO, &registry, &hits);
        assert_eq!(dispatcher.popup().map(|p| p.content.title()), Some("Navajo Nation"));
    }

    #[test]
    fn hover_takes_topmost_hoverable_layer() {
        let registry = registry();
        // Reservations (z 2) sit above ancestral lands (z 0); counties are not hoverable.
        let hits = FixedHits::default()
            .with(catalog::ANCESTRAL, FeatureKind::AncestralTerritory, "Diné Bikéyah")
            .with(catalog::RESERVATIONS, FeatureKind::Reservation, "Navajo Nation Reservation")
            .with(catalog::COUNTIES, FeatureKind::County, "Apache");
        let mut dispatcher = PointerDispatcher::default();
        let outcome = dispatcher.on_hover(Vec2::new(3.0, 4.0), &registry, &hits);
        assert_eq!(
            outcome,
            HoverOutcome::Show(Tooltip {
                name: "Navajo Nation Reservation".into(),
                pixel: Vec2::new(3.0, 4.0),
            })
        );
    }

    #[test]
    fn repeated_hover_does_not_churn() {
        let registry = registry();
        let hits = FixedHits::default().with(catalog::ANCESTRAL, FeatureKind::AncestralTerritory, "Hopi");
        let mut dispatcher = PointerDispatcher::default();
        assert!(matches!(dispatcher.on_hover(Vec2::ONE, &registry, &hits), HoverOutcome::Show(_)));
        assert_eq!(dispatcher.on_hover(Vec2::ONE, &registry, &hits), HoverOutcome::Unchanged);
        // Moving within the same feature changes nothing either.
        assert_eq!(dispatcher.on_hover(Vec2::new(2.0, 1.0), &registry, &hits), HoverOutcome::Unchanged);
        assert_eq!(
            dispatcher.tooltip(),
            Some(&Tooltip {
                name: "Hopi".into(),
                pixel: Vec2::new(2.0, 1.0),
            }),
            "tooltip follows the pointer"
        );
        assert_eq!(
            dispatcher.on_hover(Vec2::new(9.0, 9.0), &registry, &FixedHits::default()),
            HoverOutcome::Clear
        );
    }

    #[test]
    fn stale_hover_results_are_discarded() {
        let mut dispatcher = PointerDispatcher::default();
        let older = dispatcher.begin_hover(Vec2::new(1.0, 1.0)).unwrap();
        let newer = dispatcher.begin_hover(Vec2::new(2.0, 2.0)).unwrap();

        assert!(matches!(
            dispatcher.resolve_hover(newer, Some("Zuni".into())),
            HoverOutcome::Show(_)
        ));
        assert_eq!(
            dispatcher.resolve_hover(older, Some("Acoma".into())),
            HoverOutcome::Stale
        );
        assert_eq!(dispatcher.tooltip().map(|t| t.name.as_str()), Some("Zuni"));
    }

    #[test]
    fn double_tap_needs_time_and_place() {
        let mut dispatcher = PointerDispatcher::default();
        let at = |ms| Duration::from_millis(ms);

        assert!(!dispatcher.on_tap(Vec2::new(100.0, 100.0), at(1_000)));
        assert!(dispatcher.on_tap(Vec2::new(103.0, 101.0), at(1_250)));

        // Third tap starts a new pair.
        assert!(!dispatcher.on_tap(Vec2::new(103.0, 101.0), at(1_300)));
        // Too slow.
        assert!(!dispatcher.on_tap(Vec2::new(103.0, 101.0), at(1_800)));
        // Too far.
        assert!(!dispatcher.on_tap(Vec2::new(160.0, 101.0), at(1_900)));
    }
}
