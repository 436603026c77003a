//! Visibility transitions: per-layer opacity fades driven by one shared tick.
//!
//! Each layer is either idle or fading toward shown/hidden. A new request
//! replaces an in-flight fade and continues from whatever opacity the layer
//! has reached, so rapid toggles never jump. Fading in turns rendering on
//! before opacity rises; fading out turns it off only once opacity hits 0.

use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::*;

use crate::layers::registry::{LayerId, LayerRegistry, RegistryError};

pub const FADE_DURATION: Duration = Duration::from_millis(600);

// Float accumulation over many frames must still land exactly on 0 or 1.
const SNAP: f32 = 1e-4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeState {
    Idle,
    Fading { target_visible: bool },
}

#[derive(Resource, Debug)]
pub struct FadeEngine {
    duration: Duration,
    fades: HashMap<LayerId, bool>,
}

impl Default for FadeEngine {
    fn default() -> Self {
        Self::new(FADE_DURATION)
    }
}

impl FadeEngine {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            fades: HashMap::new(),
        }
    }

    pub fn state(&self, id: &LayerId) -> FadeState {
        match self.fades.get(id) {
            Some(&target_visible) => FadeState::Fading { target_visible },
            None => FadeState::Idle,
        }
    }

    /// Start (or restart) a fade on `id` from its current opacity.
    pub fn fade_to(
        &mut self,
        registry: &mut LayerRegistry,
        id: &LayerId,
        target_visible: bool,
    ) -> Result<(), RegistryError> {
        let layer = registry.get_mut(id)?;
        if target_visible {
            layer.set_render_visible(true);
        }
        let settled = if target_visible {
            layer.opacity() >= 1.0
        } else {
            layer.opacity() <= 0.0
        };
        if settled {
            if !target_visible {
                layer.set_render_visible(false);
            }
            self.fades.remove(id);
        } else {
            self.fades.insert(id.clone(), target_visible);
        }
        Ok(())
    }

    /// Pick up pending visibility requests, then advance every fade by
    /// `delta / duration` of the full opacity range.
    pub fn tick(&mut self, registry: &mut LayerRegistry, delta: Duration) {
        for (id, visible) in registry.take_requests() {
            if let Err(err) = self.fade_to(registry, &id, visible) {
                warn!("homelands: dropped visibility request: {err}");
            }
        }

        let step = if self.duration.is_zero() {
            1.0
        } else {
            delta.as_secs_f32() / self.duration.as_secs_f32()
        };

        self.fades.retain(|id, &mut target_visible| {
            let Ok(layer) = registry.get_mut(id) else {
                return false;
            };
            let (next, done) = if target_visible {
                let next = layer.opacity() + step;
                if next >= 1.0 - SNAP {
                    (1.0, true)
                } else {
                    (next, false)
                }
            } else {
                let next = layer.opacity() - step;
                if next <= SNAP {
                    (0.0, true)
                } else {
                    (next, false)
                }
            };
            layer.set_opacity(next);
            if done && !target_visible {
                layer.set_render_visible(false);
            }
            !done
        });
    }
}

/// Shared scheduler tick for every fade.
pub fn fade_tick_system(
    time: Res<Time>,
    mut registry: ResMut<LayerRegistry>,
    mut engine: ResMut<FadeEngine>,
) {
    engine.tick(&mut registry, time.delta());
}
