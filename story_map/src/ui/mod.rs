mod popup;
mod sidebar;
mod story;

use bevy_egui::egui;

pub use popup::popup_plugin;
pub use sidebar::{sidebar_plugin, SidebarState};
pub use story::story_panel_plugin;

pub(crate) const ACCENT: egui::Color32 = egui::Color32::from_rgb(232, 163, 61);
pub(crate) const MUTED: egui::Color32 = egui::Color32::from_rgb(150, 140, 130);

pub(crate) fn panel_frame() -> egui::Frame {
    egui::Frame::default()
        .fill(egui::Color32::from_rgba_premultiplied(28, 22, 18, 225))
        .inner_margin(egui::Margin::same(12))
        .corner_radius(egui::CornerRadius::same(6))
}

pub(crate) fn apply_panel_style(ui: &mut egui::Ui) {
    ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(236, 228, 214));
}
