//! Layer registry: which layers exist, how they group in the sidebar, and
//! their current visibility and opacity.

use std::collections::HashMap;
use std::fmt;

use bevy::prelude::*;

use crate::data::FeatureKind;

/// Stable layer identifier, e.g. `"reservations"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to the feature collection behind a layer: its file name
/// inside the data directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceRef(pub String);

/// Drawing rule for a layer's features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StyleRule {
    pub stroke: Color,
    pub point_radius: f32,
}

impl Default for StyleRule {
    fn default() -> Self {
        Self {
            stroke: Color::WHITE,
            point_radius: 5.0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("layer {0} is already registered")]
    DuplicateId(LayerId),
    #[error("no layer named {0}")]
    UnknownLayer(LayerId),
}

/// A togglable layer. `z_order` is fixed at construction.
#[derive(Clone, Debug)]
pub struct Layer {
    id: LayerId,
    title: String,
    group: String,
    kind: FeatureKind,
    source: SourceRef,
    style: StyleRule,
    z_order: i32,
    hover: bool,
    click_priority: Option<u8>,
    region_bounded: bool,
    visible: bool,
    opacity: f32,
    requested_visible: bool,
}

impl Layer {
    pub fn new(
        id: impl Into<String>,
        group: impl Into<String>,
        kind: FeatureKind,
        source: impl Into<String>,
        z_order: i32,
    ) -> Self {
        let id: String = id.into();
        Self {
            title: id.clone(),
            id: LayerId(id),
            group: group.into(),
            kind,
            source: SourceRef(source.into()),
            style: StyleRule::default(),
            z_order,
            hover: false,
            click_priority: None,
            region_bounded: false,
            visible: true,
            opacity: 1.0,
            requested_visible: true,
        }
    }

    /// Name shown next to the layer's checkbox.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_style(mut self, style: StyleRule) -> Self {
        self.style = style;
        self
    }

    /// Show tooltips for this layer's features on hover.
    pub fn hoverable(mut self) -> Self {
        self.hover = true;
        self
    }

    /// Open popups on click; lower priorities are consulted first.
    pub fn clickable(mut self, priority: u8) -> Self {
        self.click_priority = Some(priority);
        self
    }

    /// Features are fetched for the current viewport rather than all at once.
    pub fn region_bounded(mut self) -> Self {
        self.region_bounded = true;
        self
    }

    /// Start hidden at zero opacity.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self.opacity = 0.0;
        self.requested_visible = false;
        self
    }

    pub fn id(&self) -> &LayerId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn style(&self) -> &StyleRule {
        &self.style
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn is_hoverable(&self) -> bool {
        self.hover
    }

    pub fn click_priority(&self) -> Option<u8> {
        self.click_priority
    }

    pub fn is_region_bounded(&self) -> bool {
        self.region_bounded
    }

    /// Render-enabled. Stays true while fading out.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// The visibility the layer is heading toward, for checkbox state.
    pub fn requested_visible(&self) -> bool {
        self.requested_visible
    }

    pub(crate) fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub(crate) fn set_render_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// Single source of truth for the map's layers.
#[derive(Resource, Default, Debug)]
pub struct LayerRegistry {
    layers: Vec<Layer>,
    index: HashMap<LayerId, usize>,
    requests: Vec<(LayerId, bool)>,
}

impl LayerRegistry {
    pub fn register(&mut self, layer: Layer) -> Result<(), RegistryError> {
        if self.index.contains_key(&layer.id) {
            return Err(RegistryError::DuplicateId(layer.id));
        }
        self.index.insert(layer.id.clone(), self.layers.len());
        self.layers.push(layer);
        Ok(())
    }

    /// Request a visibility change. Opacity is left alone here; the fade
    /// engine picks the request up on its next tick.
    pub fn set_visible(&mut self, id: &LayerId, visible: bool) -> Result<(), RegistryError> {
        let layer = self.get_mut(id)?;
        layer.requested_visible = visible;
        self.requests.push((id.clone(), visible));
        Ok(())
    }

    pub fn toggle(&mut self, id: &LayerId) -> Result<(), RegistryError> {
        let visible = self.get(id).ok_or_else(|| unknown(id))?.requested_visible;
        self.set_visible(id, !visible)
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.index.get(id).map(|&i| &self.layers[i])
    }

    pub(crate) fn get_mut(&mut self, id: &LayerId) -> Result<&mut Layer, RegistryError> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.layers[i]),
            None => Err(unknown(id)),
        }
    }

    /// Layers of a group, bottom to top.
    pub fn list_by_group(&self, group: &str) -> Vec<&Layer> {
        let mut layers: Vec<_> = self.layers.iter().filter(|l| l.group == group).collect();
        layers.sort_by_key(|l| l.z_order);
        layers
    }

    /// Group names in declaration order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for layer in &self.layers {
            if !groups.contains(&layer.group.as_str()) {
                groups.push(&layer.group);
            }
        }
        groups
    }

    /// All layers in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    /// All layers, bottom to top.
    pub fn by_z_order(&self) -> Vec<&Layer> {
        let mut layers: Vec<_> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.z_order);
        layers
    }

    /// The first declared layer carrying features of `kind`.
    pub fn layer_for_kind(&self, kind: FeatureKind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    pub(crate) fn take_requests(&mut self) -> Vec<(LayerId, bool)> {
        std::mem::take(&mut self.requests)
    }
}

fn unknown(id: &LayerId) -> RegistryError {
    RegistryError::UnknownLayer(id.clone())
}
