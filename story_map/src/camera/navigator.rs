//! Camera navigator: animated moves of the shared map view.
//!
//! Single writer, many requesters. Search, story mode and double-tap zoom
//! all call [`CameraNavigator::animate_to`]; the newest request replaces
//! whatever animation is running, starting from the view as it is now.

use std::time::Duration;

use bevy::prelude::*;

use crate::data::projection::ZOOM0_RESOLUTION;

pub const MIN_ZOOM: f32 = 2.0;
pub const MAX_ZOOM: f32 = 18.0;

/// Center in map units plus a fractional zoom level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub center: Vec2,
    pub zoom: f32,
}

impl ViewState {
    /// Map units per screen pixel at this zoom.
    pub fn resolution(&self) -> f32 {
        (ZOOM0_RESOLUTION / 2f64.powf(self.zoom as f64)) as f32
    }
}

#[derive(Clone, Copy, Debug)]
struct Animation {
    from: ViewState,
    to: ViewState,
    elapsed: Duration,
    duration: Duration,
}

#[derive(Resource, Debug)]
pub struct CameraNavigator {
    view: ViewState,
    animation: Option<Animation>,
    requests: u64,
}

impl CameraNavigator {
    pub fn new(view: ViewState) -> Self {
        Self {
            view: clamp_view(view),
            animation: None,
            requests: 0,
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Where the current animation ends, or the view when idle.
    pub fn target(&self) -> ViewState {
        self.animation.map_or(self.view, |a| a.to)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Number of animation requests accepted so far.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Fire-and-forget move. Supersedes any running animation.
    pub fn animate_to(&mut self, center: Vec2, zoom: f32, duration: Duration) {
        self.requests += 1;
        let to = clamp_view(ViewState { center, zoom });
        if duration.is_zero() {
            self.view = to;
            self.animation = None;
            return;
        }
        self.animation = Some(Animation {
            from: self.view,
            to,
            elapsed: Duration::ZERO,
            duration,
        });
    }

    /// Zoom relative to where the camera is heading, keeping its center.
    pub fn zoom_by(&mut self, delta: f32, duration: Duration) {
        let target = self.target();
        self.animate_to(target.center, target.zoom + delta, duration);
    }

    /// Jump without animating, e.g. when the visitor drags the map.
    pub fn set_view(&mut self, view: ViewState) {
        self.view = clamp_view(view);
        self.animation = None;
    }

    pub fn tick(&mut self, delta: Duration) {
        let Some(mut animation) = self.animation else {
            return;
        };
        animation.elapsed += delta;
        let t = (animation.elapsed.as_secs_f32() / animation.duration.as_secs_f32()).min(1.0);
        let eased = ease_in_out(t);
        self.view = ViewState {
            center: animation.from.center.lerp(animation.to.center, eased),
            zoom: animation.from.zoom + (animation.to.zoom - animation.from.zoom) * eased,
        };
        self.animation = if t >= 1.0 {
            self.view = animation.to;
            None
        } else {
            Some(animation)
        };
    }
}

fn clamp_view(view: ViewState) -> ViewState {
    ViewState {
        center: view.center,
        zoom: view.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
    }
}

// Slow start, slow finish.
fn ease_in_out(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
