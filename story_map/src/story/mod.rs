//! Story mode: slide loading and the sequencer that keeps the map in step.

mod sequencer;
mod slides;

use bevy::prelude::*;

use crate::camera::CameraNavigator;
use crate::data::{FeatureSources, SourceReady};
use crate::layers::LayerRegistry;

pub use sequencer::{
    HighlightSet, NavPolicy, Resolution, StoryContext, StorySequencer, SLIDE_DURATION,
};
pub use slides::{
    load_slides, parse_slides, SlideDiagnostic, SlideError, SlideKind, StoryError, StorySlide,
    DEFAULT_SLIDE_ZOOM,
};

pub fn story_plugin(app: &mut App) {
    app.add_systems(Update, resume_deferred_slide);
}

/// Finish a slide whose source was still loading when it was entered.
fn resume_deferred_slide(
    mut ready: EventReader<SourceReady>,
    registry: Res<LayerRegistry>,
    sources: Res<FeatureSources>,
    mut camera: ResMut<CameraNavigator>,
    mut story: ResMut<StorySequencer>,
) {
    for SourceReady(layer) in ready.read() {
        if !story.is_deferred() {
            continue;
        }
        let mut ctx = StoryContext {
            registry: &registry,
            sources: &sources,
            camera: &mut camera,
        };
        if let Some(resolution) = story.on_source_ready(layer, &mut ctx) {
            debug!("homelands: deferred slide settled as {resolution:?}");
        }
    }
}
