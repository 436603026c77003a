// Map features as the engine sees them: projected geometry plus the GeoJSON property bag.
// Decoding from GeoJSON happens in geojson.rs.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tag that selects how a feature is presented (popup type, story lookup).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKind {
    County,
    TribalMarker,
    AncestralTerritory,
    Reservation,
}

impl FeatureKind {
    pub fn label(self) -> &'static str {
        match self {
            FeatureKind::County => "County",
            FeatureKind::TribalMarker => "Tribal nation",
            FeatureKind::AncestralTerritory => "Ancestral territory",
            FeatureKind::Reservation => "Reservation",
        }
    }
}

/// Axis-aligned box in map units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bbox {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bbox {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of `half_extent` around `center`.
    pub fn around(center: Vec2, half_extent: Vec2) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Bbox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Polygon rings are closed or open; the first ring is the outer boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Vec2),
    Polygon(Vec<Vec<Vec2>>),
    MultiPolygon(Vec<Vec<Vec<Vec2>>>),
}

impl Geometry {
    /// Every ring of every polygon, outer rings and holes alike.
    pub fn rings(&self) -> Vec<&[Vec2]> {
        match self {
            Geometry::Point(_) => Vec::new(),
            Geometry::Polygon(rings) => rings.iter().map(Vec::as_slice).collect(),
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter().map(Vec::as_slice))
                .collect(),
        }
    }

    /// Even-odd containment test. Points never contain anything.
    pub fn contains(&self, p: Vec2) -> bool {
        match self {
            Geometry::Point(_) => false,
            Geometry::Polygon(rings) => polygon_contains(rings, p),
            Geometry::MultiPolygon(polys) => polys.iter().any(|rings| polygon_contains(rings, p)),
        }
    }

    /// Vertex average of the first outer ring; the point itself for points.
    pub fn centroid(&self) -> Vec2 {
        let outer = match self {
            Geometry::Point(p) => return *p,
            Geometry::Polygon(rings) => rings.first(),
            Geometry::MultiPolygon(polys) => polys.first().and_then(|rings| rings.first()),
        };
        let Some(ring) = outer.filter(|ring| !ring.is_empty()) else {
            return Vec2::ZERO;
        };
        // A closed ring repeats its first vertex; don't count it twice.
        let open = if ring.len() > 1 && ring.first() == ring.last() {
            &ring[..ring.len() - 1]
        } else {
            &ring[..]
        };
        open.iter().copied().sum::<Vec2>() / open.len() as f32
    }

    pub fn bounds(&self) -> Bbox {
        match self {
            Geometry::Point(p) => Bbox::new(*p, *p),
            _ => {
                let mut min = Vec2::splat(f32::INFINITY);
                let mut max = Vec2::splat(f32::NEG_INFINITY);
                for ring in self.rings() {
                    for v in ring {
                        min = min.min(*v);
                        max = max.max(*v);
                    }
                }
                if min.x > max.x {
                    return Bbox::new(Vec2::ZERO, Vec2::ZERO);
                }
                Bbox { min, max }
            }
        }
    }
}

fn polygon_contains(rings: &[Vec<Vec2>], p: Vec2) -> bool {
    rings
        .iter()
        .filter(|ring| ring_crosses(ring, p))
        .count()
        % 2
        == 1
}

fn ring_crosses(ring: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A single map feature. Read-only once decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub display_name: String,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// Builds a feature, taking its display name from `name` or, for census
    /// county files, `NAME`.
    pub fn new(kind: FeatureKind, geometry: Geometry, properties: Map<String, Value>) -> Self {
        let display_name = ["name", "NAME"]
            .iter()
            .find_map(|key| properties.get(*key).and_then(Value::as_str))
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        Self {
            kind,
            display_name,
            geometry,
            properties,
        }
    }

    /// Where the camera should go for this feature.
    pub fn coordinate(&self) -> Vec2 {
        self.geometry.centroid()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Numeric property; census extracts often store numbers as strings.
    pub fn property_f64(&self, key: &str) -> Option<f64> {
        match self.properties.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Where a named feature sits, kept for a whole file when only part of it
/// is loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    pub name: String,
    pub coordinate: Vec2,
}

impl From<&Feature> for Place {
    fn from(feature: &Feature) -> Self {
        Self {
            name: feature.display_name.clone(),
            coordinate: feature.coordinate(),
        }
    }
}
