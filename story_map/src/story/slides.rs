//! Story slide records and the slide-file loader.
//!
//! The file is a JSON array. Records are decoded one by one so a single
//! bad entry is dropped with a diagnostic instead of taking the whole
//! story down with it.

use std::path::{Path, PathBuf};

use bevy::math::{DVec2, Vec2};
use serde::Deserialize;
use serde_json::Value;

use crate::data::projection::project;
use crate::data::FeatureKind;
use crate::media::{checked_link, embeddable_video, Media};

pub const DEFAULT_SLIDE_ZOOM: f32 = 6.0;

/// What a slide points at, as written in the story file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    /// A tribal nation marker.
    Tribe,
    /// An ancestral territory.
    Land,
    /// An event tied to a reservation.
    Event,
    County,
}

impl SlideKind {
    pub fn feature_kind(self) -> FeatureKind {
        match self {
            SlideKind::Tribe => FeatureKind::TribalMarker,
            SlideKind::Land => FeatureKind::AncestralTerritory,
            SlideKind::Event => FeatureKind::Reservation,
            SlideKind::County => FeatureKind::County,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StorySlide {
    pub order: i64,
    pub kind: SlideKind,
    pub feature_name: String,
    pub title: String,
    pub description: Option<String>,
    pub media: Media,
    pub zoom: f32,
    /// Projected camera target overriding the feature's own coordinate.
    pub camera_target: Option<Vec2>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("failed to read story file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("story file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("story file must be a JSON array of slides")]
    NotAnArray,
}

/// Why a single slide record was left out.
#[derive(Debug, thiserror::Error)]
pub enum SlideError {
    #[error("malformed slide: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("slide has an empty featureName")]
    EmptyFeatureName,
    #[error("zoom {0} is not a finite number")]
    InvalidZoom(f32),
    #[error("cameraTarget [{0}, {1}] is outside lon/lat range")]
    InvalidTarget(f64, f64),
}

#[derive(Debug)]
pub struct SlideDiagnostic {
    /// Index of the record in the file.
    pub position: usize,
    pub reason: SlideError,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSlide {
    order: Option<i64>,
    #[serde(rename = "type")]
    kind: SlideKind,
    feature_name: String,
    title: Option<String>,
    description: Option<String>,
    image: Option<String>,
    audio: Option<String>,
    video_url: Option<String>,
    link: Option<String>,
    zoom: Option<f32>,
    camera_target: Option<[f64; 2]>,
}

impl RawSlide {
    fn into_slide(self, position: usize) -> Result<StorySlide, SlideError> {
        let feature_name = self.feature_name.trim().to_string();
        if feature_name.is_empty() {
            return Err(SlideError::EmptyFeatureName);
        }
        let zoom = self.zoom.unwrap_or(DEFAULT_SLIDE_ZOOM);
        if !zoom.is_finite() {
            return Err(SlideError::InvalidZoom(zoom));
        }
        let camera_target = match self.camera_target {
            Some([lon, lat]) if (-180.0..=180.0).contains(&lon) && (-90.0..=90.0).contains(&lat) => {
                Some(project(DVec2::new(lon, lat)))
            }
            Some([lon, lat]) => return Err(SlideError::InvalidTarget(lon, lat)),
            None => None,
        };
        let title = non_blank(self.title).unwrap_or_else(|| feature_name.clone());
        Ok(StorySlide {
            order: self.order.unwrap_or(position as i64),
            kind: self.kind,
            feature_name,
            title,
            description: non_blank(self.description),
            media: Media {
                image: non_blank(self.image),
                audio: non_blank(self.audio),
                video: non_blank(self.video_url).map(|v| embeddable_video(&v)),
                link: self.link.as_deref().and_then(checked_link),
            },
            zoom,
            camera_target,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a story document. Bad records come back as diagnostics; the
/// remaining slides are sorted by `order` (ties keep file order).
pub fn parse_slides(json: &str) -> Result<(Vec<StorySlide>, Vec<SlideDiagnostic>), StoryError> {
    let Value::Array(records) = serde_json::from_str::<Value>(json)? else {
        return Err(StoryError::NotAnArray);
    };

    let mut slides = Vec::with_capacity(records.len());
    let mut diagnostics = Vec::new();
    for (position, record) in records.into_iter().enumerate() {
        let parsed = serde_json::from_value::<RawSlide>(record)
            .map_err(SlideError::Malformed)
            .and_then(|raw| raw.into_slide(position));
        match parsed {
            Ok(slide) => slides.push(slide),
            Err(reason) => diagnostics.push(SlideDiagnostic { position, reason }),
        }
    }
    slides.sort_by_key(|s| s.order);
    Ok((slides, diagnostics))
}

pub fn load_slides(path: &Path) -> Result<(Vec<StorySlide>, Vec<SlideDiagnostic>), StoryError> {
    let json = std::fs::read_to_string(path).map_err(|source| StoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_slides(&json)
}
