//! Popup window pinned to the clicked map coordinate, plus the hover tooltip.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{egui, EguiContexts};

use crate::camera::CameraNavigator;
use crate::media::Media;
use crate::pointer::{
    CountyPopup, PointerDispatcher, PopupContent, ScreenMapping, COUNTY_METRIC_LABELS,
};
use crate::ui::{apply_panel_style, panel_frame, ACCENT, MUTED};

const POPUP_OFFSET: egui::Vec2 = egui::vec2(12.0, -12.0);

pub fn popup_plugin(app: &mut App) {
    app.add_systems(Update, (tooltip_system, popup_window_system, dismiss_popup_system));
}

fn tooltip_system(mut contexts: EguiContexts, dispatcher: Res<PointerDispatcher>) {
    let Some(tooltip) = dispatcher.tooltip() else {
        return;
    };
    egui::Area::new(egui::Id::new("hover_tooltip"))
        .fixed_pos(egui::pos2(tooltip.pixel.x + 14.0, tooltip.pixel.y + 14.0))
        .interactable(false)
        .show(contexts.ctx_mut(), |ui| {
            panel_frame().show(ui, |ui| {
                apply_panel_style(ui);
                ui.label(tooltip.name.as_str());
            });
        });
}

fn popup_window_system(
    mut contexts: EguiContexts,
    windows: Query<&Window, With<PrimaryWindow>>,
    navigator: Res<CameraNavigator>,
    mut dispatcher: ResMut<PointerDispatcher>,
) {
    let Some(popup) = dispatcher.popup() else {
        return;
    };
    let Ok(window) = windows.get_single() else {
        return;
    };
    let mapping = ScreenMapping {
        view: navigator.view(),
        window_size: Vec2::new(window.width(), window.height()),
    };
    let at = mapping.to_screen(popup.anchor);
    let mut open = true;

    egui::Window::new(popup.content.title())
        .id(egui::Id::new("feature_popup"))
        .fixed_pos(egui::pos2(at.x, at.y) + POPUP_OFFSET)
        .pivot(egui::Align2::LEFT_BOTTOM)
        .resizable(false)
        .collapsible(false)
        .open(&mut open)
        .frame(panel_frame())
        .show(contexts.ctx_mut(), |ui| {
            apply_panel_style(ui);
            ui.set_max_width(280.0);
            match &popup.content {
                PopupContent::County(county) => county_body(ui, county),
                PopupContent::Tribal(tribal) => {
                    if let Some(description) = &tribal.description {
                        ui.label(description.as_str());
                    }
                    media_links(ui, &tribal.media);
                }
                PopupContent::Territory(territory) => {
                    ui.label(egui::RichText::new(territory.kind.label()).color(MUTED));
                }
            }
        });

    if !open {
        dispatcher.close_popup();
    }
}

fn county_body(ui: &mut egui::Ui, county: &CountyPopup) {
    if let Some(description) = &county.description {
        ui.label(description.as_str());
        ui.add_space(4.0);
    }
    for (label, value) in COUNTY_METRIC_LABELS.iter().zip(county.metrics) {
        if *label == "Income" {
            ui.label(format!("{label:<10} ${value:.0}"));
            continue;
        }
        ui.label(*label);
        ui.add(
            egui::ProgressBar::new((value / 100.0).clamp(0.0, 1.0) as f32)
                .text(format!("{value:.1}%"))
                .fill(ACCENT),
        );
    }
    media_links(ui, &county.media);
}

fn media_links(ui: &mut egui::Ui, media: &Media) {
    if media.is_empty() {
        return;
    }
    ui.add_space(6.0);
    ui.horizontal_wrapped(|ui| {
        for (label, url) in [
            ("Image", &media.image),
            ("Audio", &media.audio),
            ("Video", &media.video),
            ("Website", &media.link),
        ] {
            if let Some(url) = url {
                ui.hyperlink_to(label, url);
            }
        }
    });
}

fn dismiss_popup_system(keys: Res<ButtonInput<KeyCode>>, mut dispatcher: ResMut<PointerDispatcher>) {
    if keys.just_pressed(KeyCode::Escape) {
        dispatcher.close_popup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_closes_the_popup() {
        use crate::data::{Feature, FeatureKind, Geometry};
        use crate::layers::{catalog, LayerRegistry};
        use crate::pointer::HitTester;

        struct Everywhere(Feature);
        impl HitTester for Everywhere {
            fn features_at(&self, _: Vec2, _: &crate::layers::Layer) -> Vec<&Feature> {
                vec![&self.0]
            }
        }

        let mut registry = LayerRegistry::default();
        for layer in catalog::exhibit_layers() {
            registry.register(layer).unwrap();
        }
        let mut dispatcher = PointerDispatcher::default();
        let feature = Feature::new(
            FeatureKind::County,
            Geometry::Point(Vec2::ZERO),
            serde_json::Map::new(),
        );
        dispatcher.on_click(Vec2::ZERO, Vec2::ZERO, &registry, &Everywhere(feature));
        assert!(dispatcher.popup().is_some());

        let mut keys = ButtonInput::<KeyCode>::default();
        keys.press(KeyCode::Escape);

        let mut app = App::new();
        app.insert_resource(dispatcher)
            .insert_resource(keys)
            .add_systems(Update, dismiss_popup_system);
        app.update();

        assert!(app.world().resource::<PointerDispatcher>().popup().is_none());
    }
}
