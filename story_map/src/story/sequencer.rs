//! Story sequencer: a linear run of slides kept in step with the camera
//! and a highlight of the slide's feature.
//!
//! Every slide change clears the highlight and bumps a generation before
//! resolving the new slide. Resolution that has to wait for a loading
//! source is tagged with that generation, so a late answer for a slide
//! the visitor already left is ignored. A region-loaded layer that lacks
//! the slide's feature sends the camera to it first and resolves once the
//! region around it arrives.

use std::str::FromStr;
use std::time::Duration;

use bevy::prelude::*;

use crate::camera::CameraNavigator;
use crate::data::{Feature, FeatureSources, LoadState};
use crate::layers::{LayerId, LayerRegistry};
use crate::story::slides::StorySlide;

pub const SLIDE_DURATION: Duration = Duration::from_millis(600);

/// What `next`/`previous` do at the ends of the story.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NavPolicy {
    /// Stay put at the first and last slide.
    #[default]
    Clamp,
    Wrap,
}

impl FromStr for NavPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(NavPolicy::Clamp),
            "wrap" => Ok(NavPolicy::Wrap),
            other => Err(format!("unknown story navigation policy {other:?}")),
        }
    }
}

/// Outcome of entering a slide.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Feature found, highlighted, camera moving.
    Resolved,
    /// Source still loading, or holding a region that misses the feature;
    /// retried when the next load lands.
    Deferred,
    /// Nothing to highlight. The slide shows anyway.
    Missing,
}

/// Features highlighted for the current slide.
#[derive(Clone, Debug, Default)]
pub struct HighlightSet(Vec<Feature>);

impl HighlightSet {
    pub fn features(&self) -> &[Feature] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn insert(&mut self, feature: Feature) {
        self.0.push(feature);
    }
}

/// The collaborators a slide resolves against.
pub struct StoryContext<'a> {
    pub registry: &'a LayerRegistry,
    pub sources: &'a FeatureSources,
    pub camera: &'a mut CameraNavigator,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Deferred {
    generation: u64,
    layer: LayerId,
}

#[derive(Resource, Debug)]
pub struct StorySequencer {
    slides: Vec<StorySlide>,
    current: usize,
    policy: NavPolicy,
    generation: u64,
    deferred: Option<Deferred>,
    highlight: HighlightSet,
    active: bool,
}

impl StorySequencer {
    pub fn new(slides: Vec<StorySlide>, policy: NavPolicy) -> Self {
        Self {
            slides,
            current: 0,
            policy,
            generation: 0,
            deferred: None,
            highlight: HighlightSet::default(),
            active: false,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn policy(&self) -> NavPolicy {
        self.policy
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&StorySlide> {
        self.slides.get(self.current)
    }

    pub fn highlight(&self) -> &HighlightSet {
        &self.highlight
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.policy == NavPolicy::Wrap && self.len() > 1 || self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.policy == NavPolicy::Wrap && self.len() > 1 || self.current + 1 < self.len()
    }

    /// Enter story mode at the first slide.
    pub fn enter(&mut self, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        if self.slides.is_empty() {
            return None;
        }
        self.active = true;
        info!("homelands: story mode started ({} slides)", self.len());
        Some(self.enter_slide(0, ctx))
    }

    /// Leave story mode. The highlight goes away and pending resolutions
    /// are abandoned.
    pub fn exit(&mut self) {
        self.active = false;
        self.generation += 1;
        self.deferred = None;
        self.highlight.clear();
    }

    pub fn restart(&mut self, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        self.go_to(0, ctx)
    }

    /// `None` when the sequencer did not move (inactive, or clamped at the end).
    pub fn next(&mut self, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        let len = self.len();
        if !self.active || len == 0 {
            return None;
        }
        let target = match self.policy {
            NavPolicy::Clamp if self.current + 1 >= len => return None,
            NavPolicy::Clamp => self.current + 1,
            NavPolicy::Wrap => (self.current + 1) % len,
        };
        Some(self.enter_slide(target, ctx))
    }

    pub fn previous(&mut self, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        let len = self.len();
        if !self.active || len == 0 {
            return None;
        }
        let target = match self.policy {
            NavPolicy::Clamp if self.current == 0 => return None,
            NavPolicy::Clamp => self.current - 1,
            NavPolicy::Wrap => (self.current + len - 1) % len,
        };
        Some(self.enter_slide(target, ctx))
    }

    /// Jump to slide `index`. Out-of-range indices are ignored.
    pub fn go_to(&mut self, index: usize, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        if !self.active || index >= self.len() {
            return None;
        }
        Some(self.enter_slide(index, ctx))
    }

    /// A source finished loading; finish a deferred resolution waiting on it.
    pub fn on_source_ready(&mut self, layer: &LayerId, ctx: &mut StoryContext<'_>) -> Option<Resolution> {
        let waiting = self.deferred.as_ref()?;
        if waiting.layer != *layer {
            return None;
        }
        if waiting.generation != self.generation {
            self.deferred = None;
            return None;
        }
        self.deferred = None;
        // One retry per load: a feature still missing from a load that
        // covers it is final.
        Some(self.resolve(ctx, false))
    }

    fn enter_slide(&mut self, index: usize, ctx: &mut StoryContext<'_>) -> Resolution {
        self.current = index;
        self.generation += 1;
        self.deferred = None;
        self.highlight.clear();
        self.resolve(ctx, true)
    }

    fn resolve(&mut self, ctx: &mut StoryContext<'_>, may_defer: bool) -> Resolution {
        let Some(slide) = self.slides.get(self.current) else {
            return Resolution::Missing;
        };
        let Some(layer) = ctx.registry.layer_for_kind(slide.kind.feature_kind()) else {
            debug!("homelands: no layer for slide {:?}", slide.feature_name);
            return fallback_to_target(slide, ctx);
        };

        if may_defer && ctx.sources.state(layer.id()) == Some(LoadState::Loading) {
            self.deferred = Some(Deferred {
                generation: self.generation,
                layer: layer.id().clone(),
            });
            return Resolution::Deferred;
        }

        let Some(feature) = ctx.sources.find_by_name(layer.id(), &slide.feature_name) else {
            if let Some(at) = ctx.sources.locate_unloaded(layer.id(), &slide.feature_name) {
                // Outside the loaded region: go there and wait for the region to follow.
                let center = slide.camera_target.unwrap_or(at);
                ctx.camera.animate_to(center, slide.zoom, SLIDE_DURATION);
                self.deferred = Some(Deferred {
                    generation: self.generation,
                    layer: layer.id().clone(),
                });
                return Resolution::Deferred;
            }
            debug!("homelands: slide feature {:?} not found", slide.feature_name);
            return fallback_to_target(slide, ctx);
        };

        let center = slide.camera_target.unwrap_or_else(|| feature.coordinate());
        ctx.camera.animate_to(center, slide.zoom, SLIDE_DURATION);
        self.highlight.insert(feature.clone());
        Resolution::Resolved
    }
}

// An explicit camera target still frames the slide when its feature can't be found.
fn fallback_to_target(slide: &StorySlide, ctx: &mut StoryContext<'_>) -> Resolution {
    if let Some(target) = slide.camera_target {
        ctx.camera.animate_to(target, slide.zoom, SLIDE_DURATION);
    }
    Resolution::Missing
}
