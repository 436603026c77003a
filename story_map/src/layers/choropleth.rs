//! Demographic metric shown on the county layer, and its color ramp.

use bevy::prelude::*;

use crate::data::Feature;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ChoroplethMetric {
    #[default]
    AiAnPercent,
    Poverty,
    Income,
}

impl ChoroplethMetric {
    pub const ALL: [ChoroplethMetric; 3] = [
        ChoroplethMetric::AiAnPercent,
        ChoroplethMetric::Poverty,
        ChoroplethMetric::Income,
    ];

    /// Property key in the county GeoJSON.
    pub fn property(self) -> &'static str {
        match self {
            ChoroplethMetric::AiAnPercent => "ai_an_percent",
            ChoroplethMetric::Poverty => "poverty",
            ChoroplethMetric::Income => "income",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChoroplethMetric::AiAnPercent => "AI/AN %",
            ChoroplethMetric::Poverty => "Poverty %",
            ChoroplethMetric::Income => "Median income",
        }
    }

    // Value range mapped onto the ramp; outside values clamp.
    fn range(self) -> (f64, f64) {
        match self {
            ChoroplethMetric::AiAnPercent => (0.0, 50.0),
            ChoroplethMetric::Poverty => (0.0, 40.0),
            ChoroplethMetric::Income => (20_000.0, 100_000.0),
        }
    }

    /// Position of the feature's value on the ramp, `None` without data.
    pub fn normalized(self, feature: &Feature) -> Option<f32> {
        let value = feature.property_f64(self.property())?;
        let (lo, hi) = self.range();
        Some(((value - lo) / (hi - lo)).clamp(0.0, 1.0) as f32)
    }
}

#[derive(Resource, Default, Debug)]
pub struct ChoroplethState {
    pub active: ChoroplethMetric,
}

/// Pale sand → deep amber; grey when the county has no value.
pub fn ramp_color(t: Option<f32>) -> Color {
    let Some(t) = t else {
        return Color::srgb(0.35, 0.35, 0.38);
    };
    Color::srgb(0.98 - 0.25 * t, 0.9 - 0.5 * t, 0.7 - 0.6 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureKind, Geometry};
    use serde_json::json;

    fn county(props: serde_json::Value) -> Feature {
        Feature::new(
            FeatureKind::County,
            Geometry::Point(Vec2::ZERO),
            props.as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn normalized_clamps_to_ramp() {
        let feature = county(json!({ "ai_an_percent": 75.0, "income": 60000 }));
        assert_eq!(ChoroplethMetric::AiAnPercent.normalized(&feature), Some(1.0));
        assert_eq!(ChoroplethMetric::Income.normalized(&feature), Some(0.5));
        assert_eq!(ChoroplethMetric::Poverty.normalized(&feature), None);
    }
}
