//! Typed popup payloads, chosen by the clicked feature's kind.

use bevy::math::Vec2;

use crate::data::{Feature, FeatureKind};
use crate::media::{checked_link, resolve, Media};

/// Labels for the county metrics array, in order.
pub const COUNTY_METRIC_LABELS: [&str; 4] = ["AI/AN %", "Poverty %", "Income", "HS Grad %"];
const COUNTY_METRIC_KEYS: [&str; 4] = ["ai_an_percent", "poverty", "income", "hs_grad"];

#[derive(Clone, Debug, PartialEq)]
pub struct CountyPopup {
    pub name: String,
    pub description: Option<String>,
    pub media: Media,
    /// Passed as-is to the chart renderer; missing values are 0.
    pub metrics: [f64; 4],
}

#[derive(Clone, Debug, PartialEq)]
pub struct TribalPopup {
    pub name: String,
    pub description: Option<String>,
    pub media: Media,
}

/// Name-only content for territories and reservations.
#[derive(Clone, Debug, PartialEq)]
pub struct TerritoryTooltip {
    pub name: String,
    pub kind: FeatureKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PopupContent {
    County(CountyPopup),
    Tribal(TribalPopup),
    Territory(TerritoryTooltip),
}

impl PopupContent {
    pub fn from_feature(feature: &Feature, media_prefix: &str) -> Self {
        let description = feature.property_str("description").map(str::to_string);
        match feature.kind {
            FeatureKind::County => PopupContent::County(CountyPopup {
                name: non_empty(&feature.display_name).unwrap_or("Unnamed County").to_string(),
                description,
                media: Media {
                    image: feature.property_str("image").map(str::to_string),
                    audio: feature.property_str("audio").map(str::to_string),
                    video: feature.property_str("video").map(str::to_string),
                    link: feature.property_str("website").and_then(checked_link),
                },
                metrics: COUNTY_METRIC_KEYS.map(|key| feature.property_f64(key).unwrap_or(0.0)),
            }),
            FeatureKind::TribalMarker => PopupContent::Tribal(TribalPopup {
                name: feature.display_name.clone(),
                description,
                media: Media {
                    image: feature.property_str("image").map(|m| resolve(media_prefix, m)),
                    audio: feature.property_str("audio").map(|m| resolve(media_prefix, m)),
                    video: feature.property_str("video").map(|m| resolve(media_prefix, m)),
                    link: feature.property_str("website").and_then(checked_link),
                },
            }),
            FeatureKind::AncestralTerritory | FeatureKind::Reservation => {
                PopupContent::Territory(TerritoryTooltip {
                    name: non_empty(&feature.display_name).unwrap_or("Unnamed").to_string(),
                    kind: feature.kind,
                })
            }
        }
    }

    pub fn title(&self) -> &str {
        match self {
            PopupContent::County(c) => &c.name,
            PopupContent::Tribal(t) => &t.name,
            PopupContent::Territory(t) => &t.name,
        }
    }
}

/// The one live popup: where it is anchored and what it shows.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupState {
    pub anchor: Vec2,
    pub content: PopupContent,
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
