//! Pointer input on the map: hover tooltips, click popups, double-tap zoom.

mod dispatcher;
mod hit;
mod popup;

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::camera::{CameraNavigator, DragState};
use crate::data::projection::unproject;
use crate::data::FeatureSources;
use crate::layers::LayerRegistry;

pub use dispatcher::{
    ClickOutcome, HitTester, HoverOutcome, HoverTicket, PointerDispatcher, Tooltip,
    DOUBLE_TAP_RADIUS, DOUBLE_TAP_WINDOW,
};
pub use hit::{ScreenMapping, WorldHitTester};
pub use popup::{
    CountyPopup, PopupContent, PopupState, TerritoryTooltip, TribalPopup, COUNTY_METRIC_LABELS,
};

const DOUBLE_TAP_ZOOM: f32 = 1.0;
const DOUBLE_TAP_DURATION: Duration = Duration::from_millis(250);

pub fn pointer_plugin(app: &mut App) {
    app.init_resource::<PointerDispatcher>()
        .add_systems(Update, (hover_system, click_system));
}

fn screen_mapping(window: &Window, navigator: &CameraNavigator) -> ScreenMapping {
    ScreenMapping {
        view: navigator.view(),
        window_size: Vec2::new(window.width(), window.height()),
    }
}

fn hover_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut contexts: EguiContexts,
    navigator: Res<CameraNavigator>,
    registry: Res<LayerRegistry>,
    sources: Res<FeatureSources>,
    mut dispatcher: ResMut<PointerDispatcher>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();
    let over_ui = contexts.ctx_mut().is_pointer_over_area();
    let Some(pixel) = cursor.filter(|_| !over_ui) else {
        if dispatcher.tooltip().is_some() {
            dispatcher.clear_hover();
        }
        return;
    };
    let tester = WorldHitTester::new(&sources, screen_mapping(window, &navigator));
    dispatcher.on_hover(pixel, &registry, &tester);
}

fn click_system(
    time: Res<Time>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut drag: ResMut<DragState>,
    mut navigator: ResMut<CameraNavigator>,
    registry: Res<LayerRegistry>,
    sources: Res<FeatureSources>,
    mut dispatcher: ResMut<PointerDispatcher>,
) {
    let Some(pixel) = drag.take_click() else {
        return;
    };
    let Ok(window) = windows.get_single() else {
        return;
    };
    let mapping = screen_mapping(window, &navigator);

    double_tap_zoom(&mut dispatcher, &mut navigator, pixel, time.elapsed());

    let tester = WorldHitTester::new(&sources, mapping);
    match dispatcher.on_click(pixel, mapping.to_map(pixel), &registry, &tester) {
        ClickOutcome::Opened(popup) => {
            let at = unproject(popup.anchor);
            debug!(
                "homelands: popup for {} at [{:.3}, {:.3}]",
                popup.content.title(),
                at.x,
                at.y
            );
        }
        ClickOutcome::Cleared => {}
    }
}

/// Zoom in one level when `pixel` completes a double tap.
fn double_tap_zoom(
    dispatcher: &mut PointerDispatcher,
    navigator: &mut CameraNavigator,
    pixel: Vec2,
    now: Duration,
) -> bool {
    let double = dispatcher.on_tap(pixel, now);
    if double {
        navigator.zoom_by(DOUBLE_TAP_ZOOM, DOUBLE_TAP_DURATION);
    }
    double
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewState;

    #[test]
    fn double_tap_zooms_in_one_level() {
        let mut dispatcher = PointerDispatcher::default();
        let mut navigator = CameraNavigator::new(ViewState {
            center: Vec2::ZERO,
            zoom: 5.0,
        });
        let at = |ms| Duration::from_millis(ms);

        assert!(!double_tap_zoom(&mut dispatcher, &mut navigator, Vec2::new(40.0, 40.0), at(100)));
        assert_eq!(navigator.request_count(), 0);

        assert!(double_tap_zoom(&mut dispatcher, &mut navigator, Vec2::new(42.0, 41.0), at(300)));
        assert_eq!(navigator.target().zoom, 6.0);
        assert_eq!(navigator.target().center, Vec2::ZERO);

        // A slow second tap is a plain click.
        double_tap_zoom(&mut dispatcher, &mut navigator, Vec2::new(42.0, 41.0), at(1_000));
        assert!(!double_tap_zoom(&mut dispatcher, &mut navigator, Vec2::new(42.0, 41.0), at(1_500)));
        assert_eq!(navigator.target().zoom, 6.0);
    }
}
