//! Story panel: current slide text and media with previous/next controls.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::camera::CameraNavigator;
use crate::data::FeatureSources;
use crate::layers::LayerRegistry;
use crate::story::{StoryContext, StorySequencer};
use crate::ui::{apply_panel_style, panel_frame, ACCENT, MUTED};

#[derive(Clone, Copy, PartialEq, Eq)]
enum StoryAction {
    Previous,
    Next,
    Restart,
    Exit,
}

pub fn story_panel_plugin(app: &mut App) {
    app.add_systems(Update, story_panel_system);
}

fn story_panel_system(
    mut contexts: EguiContexts,
    registry: Res<LayerRegistry>,
    sources: Res<FeatureSources>,
    mut camera: ResMut<CameraNavigator>,
    mut story: ResMut<StorySequencer>,
) {
    if !story.is_active() {
        return;
    }
    let Some(slide) = story.current() else {
        return;
    };
    let mut action = None;

    egui::SidePanel::right("story")
        .default_width(320.0)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            ui.label(egui::RichText::new(slide.title.as_str()).size(18.0).color(ACCENT));
            ui.add_space(8.0);

            if let Some(description) = &slide.description {
                ui.label(description.as_str());
                ui.add_space(6.0);
            }
            for (label, url) in [
                ("Image", &slide.media.image),
                ("Audio", &slide.media.audio),
                ("Video", &slide.media.video),
                ("Learn more", &slide.media.link),
            ] {
                if let Some(url) = url {
                    ui.hyperlink_to(label, url);
                }
            }

            ui.add_space(12.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(story.has_previous(), egui::Button::new("< Previous"))
                    .clicked()
                {
                    action = Some(StoryAction::Previous);
                }
                ui.label(format!("{} / {}", story.current_index() + 1, story.len()));
                if ui
                    .add_enabled(story.has_next(), egui::Button::new("Next >"))
                    .clicked()
                {
                    action = Some(StoryAction::Next);
                }
            });
            ui.horizontal(|ui| {
                if ui.small_button("Restart").clicked() {
                    action = Some(StoryAction::Restart);
                }
                if ui.small_button("Exit").clicked() {
                    action = Some(StoryAction::Exit);
                }
            });
            if story.is_deferred() {
                ui.label(egui::RichText::new("Loading map data...").size(11.0).color(MUTED));
            }
        });

    let Some(action) = action else {
        return;
    };
    let mut ctx = StoryContext {
        registry: &registry,
        sources: &sources,
        camera: &mut camera,
    };
    match action {
        StoryAction::Previous => {
            story.previous(&mut ctx);
        }
        StoryAction::Next => {
            story.next(&mut ctx);
        }
        StoryAction::Restart => {
            story.restart(&mut ctx);
        }
        StoryAction::Exit => story.exit(),
    }
}
