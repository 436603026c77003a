//! Left sidebar: name search, grouped layer toggles, county metric switcher,
//! and the story mode button.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::camera::CameraNavigator;
use crate::data::FeatureSources;
use crate::layers::{ChoroplethMetric, ChoroplethState, LayerId, LayerRegistry};
use crate::search::SearchIndex;
use crate::story::{StoryContext, StorySequencer};
use crate::ui::{apply_panel_style, panel_frame, ACCENT};

/// Text typed into the search box.
#[derive(Resource, Default)]
pub struct SidebarState {
    pub query: String,
}

pub fn sidebar_plugin(app: &mut App) {
    app.init_resource::<SidebarState>()
        .add_systems(Update, sidebar_system);
}

#[allow(clippy::too_many_arguments)]
fn sidebar_system(
    mut contexts: EguiContexts,
    mut state: ResMut<SidebarState>,
    mut registry: ResMut<LayerRegistry>,
    mut choropleth: ResMut<ChoroplethState>,
    mut camera: ResMut<CameraNavigator>,
    sources: Res<FeatureSources>,
    search: Option<Res<SearchIndex>>,
    story: Option<ResMut<StorySequencer>>,
) {
    let mut picked: Option<String> = None;
    let mut toggled: Vec<LayerId> = Vec::new();
    let mut story_clicked = false;

    egui::SidePanel::left("sidebar")
        .default_width(240.0)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);

            if let Some(search) = search.as_deref() {
                ui.label(egui::RichText::new("Search nations").size(15.0).color(ACCENT));
                let response = ui.text_edit_singleline(&mut state.query);
                let mut results = search.search(&state.query).peekable();
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    picked = results.peek().map(|e| e.display_name.clone());
                }
                for entry in results {
                    if ui.selectable_label(false, entry.display_name.as_str()).clicked() {
                        picked = Some(entry.display_name.clone());
                    }
                }
                ui.add_space(10.0);
            }

            for group in registry.groups() {
                ui.label(egui::RichText::new(group).size(15.0).color(ACCENT));
                for layer in registry.list_by_group(group) {
                    let mut checked = layer.requested_visible();
                    let label = layer.title();
                    if ui.checkbox(&mut checked, label).changed() {
                        toggled.push(layer.id().clone());
                    }
                }
                ui.add_space(6.0);
            }

            ui.separator();
            ui.label("County metric");
            for metric in ChoroplethMetric::ALL {
                ui.radio_value(&mut choropleth.active, metric, metric.label());
            }

            if let Some(story) = story.as_deref() {
                if !story.is_empty() {
                    ui.separator();
                    let label = if story.is_active() {
                        "Exit story"
                    } else {
                        "Start story"
                    };
                    story_clicked = ui.button(label).clicked();
                }
            }
        });

    for id in toggled {
        if let Err(err) = registry.toggle(&id) {
            warn!("homelands: {err}");
        }
    }

    if let (Some(name), Some(search)) = (picked, search.as_deref()) {
        if search.zoom_to(&name, &mut camera) {
            state.query = name;
        }
    }

    if let (true, Some(mut story)) = (story_clicked, story) {
        if story.is_active() {
            story.exit();
        } else {
            story.enter(&mut StoryContext {
                registry: &registry,
                sources: &sources,
                camera: &mut camera,
            });
        }
    }
}
