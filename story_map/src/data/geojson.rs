//! GeoJSON FeatureCollection decoding into projected [`Feature`]s.
//!
//! Only the geometry types the exhibit files contain are kept (Point,
//! Polygon, MultiPolygon); anything else is skipped rather than failing
//! the whole collection.

use std::path::PathBuf;

use bevy::math::{DVec2, Vec2};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::data::model::{Bbox, Feature, FeatureKind, Geometry, Place};
use crate::data::projection::project;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, found {0:?}")]
    NotACollection(String),
}

#[derive(Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

/// Decode a FeatureCollection, tagging every feature with `kind`.
pub fn decode_collection(kind: FeatureKind, json: &str) -> Result<Vec<Feature>, LoadError> {
    let raw: RawCollection = serde_json::from_str(json)?;
    if raw.kind != "FeatureCollection" {
        return Err(LoadError::NotACollection(raw.kind));
    }
    Ok(raw
        .features
        .into_iter()
        .filter_map(|f| {
            let geometry = decode_geometry(f.geometry?)?;
            Some(Feature::new(kind, geometry, f.properties.unwrap_or_default()))
        })
        .collect())
}

/// Features of a collection that touch a box, with the places of every
/// named feature in the collection.
#[derive(Clone, Debug)]
pub struct Region {
    pub features: Vec<Feature>,
    pub places: Vec<Place>,
}

/// Same as [`decode_collection`], keeping only features whose bounds touch
/// `bbox`. Places are listed for the whole collection.
pub fn decode_within(kind: FeatureKind, json: &str, bbox: &Bbox) -> Result<Region, LoadError> {
    let all = decode_collection(kind, json)?;
    let places = all
        .iter()
        .filter(|f| !f.display_name.is_empty())
        .map(Place::from)
        .collect();
    let features = all
        .into_iter()
        .filter(|f| f.geometry.bounds().intersects(bbox))
        .collect();
    Ok(Region { features, places })
}

fn decode_geometry(raw: RawGeometry) -> Option<Geometry> {
    match raw.kind.as_str() {
        "Point" => {
            let position: Vec<f64> = serde_json::from_value(raw.coordinates).ok()?;
            Some(Geometry::Point(position_to_map(&position)?))
        }
        "Polygon" => {
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(raw.coordinates).ok()?;
            Some(Geometry::Polygon(project_rings(&rings)?))
        }
        "MultiPolygon" => {
            let polys: Vec<Vec<Vec<Vec<f64>>>> = serde_json::from_value(raw.coordinates).ok()?;
            let polys = polys
                .iter()
                .map(|rings| project_rings(rings))
                .collect::<Option<Vec<_>>>()?;
            Some(Geometry::MultiPolygon(polys))
        }
        _ => None,
    }
}

fn project_rings(rings: &[Vec<Vec<f64>>]) -> Option<Vec<Vec<Vec2>>> {
    rings
        .iter()
        .map(|ring| {
            ring.iter()
                .map(|p| position_to_map(p))
                .collect::<Option<Vec<_>>>()
        })
        .collect()
}

// Positions may carry an altitude; only lon/lat matter here.
fn position_to_map(position: &[f64]) -> Option<Vec2> {
    match position {
        [lon, lat, ..] => Some(project(DVec2::new(*lon, *lat))),
        _ => None,
    }
}
