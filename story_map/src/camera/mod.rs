//! Map camera: the navigator resource plus the systems that apply it to
//! the Bevy 2D camera and turn wheel and drag input into view changes.

mod navigator;

use std::time::Duration;

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

pub use navigator::{CameraNavigator, ViewState, MAX_ZOOM, MIN_ZOOM};

const WHEEL_ZOOM_STEP: f32 = 0.5;
const WHEEL_ZOOM_DURATION: Duration = Duration::from_millis(150);
const PIXEL_LINES: f32 = 100.0;

/// Cursor travel, in pixels, below which a press/release is a click.
pub const DRAG_THRESHOLD: f32 = 4.0;

/// Marker for the camera the navigator drives.
#[derive(Component)]
pub struct MapCamera;

/// Left-button drag in progress.
#[derive(Resource, Default, Debug)]
pub struct DragState {
    pub pressed_at: Option<Vec2>,
    last: Option<Vec2>,
    pub dragging: bool,
    click: Option<Vec2>,
}

impl DragState {
    /// Cursor position of a press/release that never turned into a drag.
    pub fn take_click(&mut self) -> Option<Vec2> {
        self.click.take()
    }
}

pub fn camera_plugin(app: &mut App) {
    app.init_resource::<DragState>().add_systems(
        Update,
        (
            (wheel_zoom_system, drag_pan_system),
            camera_tick_system,
            apply_camera_system,
        )
            .chain(),
    );
}

fn camera_tick_system(time: Res<Time>, mut navigator: ResMut<CameraNavigator>) {
    navigator.tick(time.delta());
}

fn apply_camera_system(
    navigator: Res<CameraNavigator>,
    mut cameras: Query<(&mut Transform, &mut OrthographicProjection), With<MapCamera>>,
) {
    let view = navigator.view();
    for (mut transform, mut projection) in &mut cameras {
        transform.translation.x = view.center.x;
        transform.translation.y = view.center.y;
        projection.scale = view.resolution();
    }
}

fn wheel_zoom_system(
    mut wheel: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
    mut navigator: ResMut<CameraNavigator>,
) {
    let over_ui = contexts.ctx_mut().is_pointer_over_area();
    for event in wheel.read() {
        if over_ui {
            continue;
        }
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXEL_LINES,
        };
        if lines != 0.0 {
            navigator.zoom_by(lines.signum() * WHEEL_ZOOM_STEP, WHEEL_ZOOM_DURATION);
        }
    }
}

fn drag_pan_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window>,
    mut contexts: EguiContexts,
    mut drag: ResMut<DragState>,
    mut navigator: ResMut<CameraNavigator>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse.just_pressed(MouseButton::Left) && !contexts.ctx_mut().is_pointer_over_area() {
        drag.pressed_at = cursor;
        drag.last = cursor;
        drag.dragging = false;
    }

    if mouse.pressed(MouseButton::Left) {
        if let (Some(start), Some(last), Some(now)) = (drag.pressed_at, drag.last, cursor) {
            if !drag.dragging && now.distance(start) > DRAG_THRESHOLD {
                drag.dragging = true;
            }
            if drag.dragging {
                let mut view = navigator.view();
                // Screen y grows downward, map y grows north.
                let delta = now - last;
                view.center += Vec2::new(-delta.x, delta.y) * view.resolution();
                navigator.set_view(view);
            }
            drag.last = Some(now);
        }
    }

    if mouse.just_released(MouseButton::Left) {
        if let Some(start) = drag.pressed_at.take() {
            if !drag.dragging {
                drag.click = Some(cursor.unwrap_or(start));
            }
        }
        drag.last = None;
        drag.dragging = false;
    }
}
