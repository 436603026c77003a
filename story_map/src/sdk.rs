//! SDK entry points and builder for composing the story map app.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::camera::{camera_plugin, CameraNavigator, ViewState};
use crate::config::MapConfig;
use crate::data::{ingest_sources, FeatureSources, SourceChannel, SourceReady};
use crate::layers::{
    catalog, fade_plugin, ChoroplethState, Layer, LayerRegistry, RegistryError,
};
use crate::pointer::{pointer_plugin, PointerDispatcher};
use crate::region::{region_plugin, RegionRefresh};
use crate::scene::{draw_layers_system, request_sources, setup_scene};
use crate::search::{rebuild_search_index, SearchIndex};
use crate::story::{load_slides, story_plugin, NavPolicy, StorySequencer};
use crate::ui::{popup_plugin, sidebar_plugin, story_panel_plugin};

/// Opening view: the continental United States.
pub const INITIAL_VIEW: ViewState = ViewState {
    center: Vec2::new(-10_997_148.0, 4_814_500.0),
    zoom: 4.0,
};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid layer configuration: {0}")]
    Layers(#[from] RegistryError),
}

/// Builder for constructing the story map app with customizable plugins.
pub struct StoryMapBuilder {
    config: Option<MapConfig>,
    layers: Option<Vec<Layer>>,
    nav_policy: Option<NavPolicy>,
    initial_view: ViewState,
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    enable_sidebar: bool,
    enable_search: bool,
    enable_popups: bool,
    enable_story: bool,
    enable_region_refresh: bool,
}

impl Default for StoryMapBuilder {
    fn default() -> Self {
        Self {
            config: None,
            layers: None,
            nav_policy: None,
            initial_view: INITIAL_VIEW,
            window_title: "Homelands".to_string(),
            window_resolution: (1920.0, 1080.0),
            clear_color: Color::srgb(0.11, 0.1, 0.09),
            enable_sidebar: true,
            enable_search: true,
            enable_popups: true,
            enable_story: true,
            enable_region_refresh: false,
        }
    }
}

impl StoryMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration instead of reading the environment.
    pub fn config(mut self, config: MapConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the exhibit's layer set.
    pub fn layers(mut self, layers: Vec<Layer>) -> Self {
        self.layers = Some(layers);
        self
    }

    /// Override the configured story navigation policy.
    pub fn nav_policy(mut self, policy: NavPolicy) -> Self {
        self.nav_policy = Some(policy);
        self
    }

    pub fn initial_view(mut self, center: Vec2, zoom: f32) -> Self {
        self.initial_view = ViewState { center, zoom };
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Fetch region-bounded layers for the visible area only.
    pub fn region_refresh(mut self, enabled: bool) -> Self {
        self.enable_region_refresh = enabled;
        self
    }

    pub fn disable_sidebar(mut self) -> Self {
        self.enable_sidebar = false;
        self
    }

    pub fn disable_search(mut self) -> Self {
        self.enable_search = false;
        self
    }

    pub fn disable_popups(mut self) -> Self {
        self.enable_popups = false;
        self
    }

    pub fn disable_story(mut self) -> Self {
        self.enable_story = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> Result<App, BuildError> {
        let mut app = App::new();
        app.add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: self.window_title.clone(),
                resolution: self.window_resolution.into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(ClearColor(self.clear_color));

        self.install(&mut app)?;
        Ok(app)
    }

    /// Register the map's resources, systems and plugins on `app`. Expects
    /// windowing and egui to be provided by the caller.
    pub fn install(self, app: &mut App) -> Result<(), BuildError> {
        let mut config = self.config.unwrap_or_else(MapConfig::from_env);
        if let Some(policy) = self.nav_policy {
            config.nav_policy = policy;
        }

        let mut registry = LayerRegistry::default();
        for layer in self.layers.unwrap_or_else(catalog::exhibit_layers) {
            registry.register(layer)?;
        }
        let region_layer = registry
            .iter()
            .find(|l| l.is_region_bounded())
            .map(|l| l.id().clone());

        app.add_event::<SourceReady>()
            .insert_resource(SourceChannel::new())
            .init_resource::<FeatureSources>()
            .insert_resource(CameraNavigator::new(self.initial_view))
            .insert_resource(PointerDispatcher::new(config.media_prefix.clone()))
            .add_plugins((camera_plugin, fade_plugin))
            .init_resource::<ChoroplethState>()
            .add_systems(Startup, (setup_scene, request_sources))
            .add_systems(Update, (ingest_sources, draw_layers_system));

        if self.enable_region_refresh {
            if let Some(layer) = region_layer {
                app.insert_resource(RegionRefresh::new(layer))
                    .add_plugins(region_plugin);
            }
        }
        if self.enable_search {
            app.insert_resource(SearchIndex::new(catalog::TRIBAL_MARKERS.into()))
                .add_systems(Update, rebuild_search_index.after(ingest_sources));
        }
        if self.enable_popups {
            app.add_plugins((pointer_plugin, popup_plugin));
        }
        if self.enable_story {
            match load_slides(&config.story_path) {
                Ok((slides, diagnostics)) => {
                    for diagnostic in &diagnostics {
                        warn!(
                            "homelands: skipped story slide {}: {}",
                            diagnostic.position, diagnostic.reason
                        );
                    }
                    info!("homelands: story loaded with {} slides", slides.len());
                    app.insert_resource(StorySequencer::new(slides, config.nav_policy))
                        .add_plugins((story_plugin, story_panel_plugin));
                }
                Err(err) => warn!("homelands: story mode disabled: {err}"),
            }
        }
        if self.enable_sidebar {
            app.add_plugins(sidebar_plugin);
        }

        app.insert_resource(registry).insert_resource(config);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureKind;
    use crate::layers::LayerId;
    use std::io::Write;

    fn config_in(dir: &std::path::Path) -> MapConfig {
        MapConfig {
            data_dir: dir.to_path_buf(),
            story_path: dir.join("storyData.json"),
            ..MapConfig::default()
        }
    }

    #[test]
    fn duplicate_layers_fail_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let layers = vec![
            Layer::new("reservations", "Boundaries", FeatureKind::Reservation, "r.geojson", 0),
            Layer::new("reservations", "Boundaries", FeatureKind::Reservation, "r2.geojson", 1),
        ];
        let mut app = App::new();
        let err = StoryMapBuilder::new()
            .config(config_in(dir.path()))
            .layers(layers)
            .install(&mut app)
            .unwrap_err();
        assert!(matches!(
            err,
            BuildError::Layers(RegistryError::DuplicateId(ref id)) if *id == LayerId::from("reservations")
        ));
    }

    #[test]
    fn missing_story_file_leaves_map_running_without_story() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new();
        StoryMapBuilder::new()
            .config(config_in(dir.path()))
            .install(&mut app)
            .unwrap();

        let world = app.world();
        assert!(world.contains_resource::<LayerRegistry>());
        assert!(world.contains_resource::<ChoroplethState>());
        assert!(world.contains_resource::<SearchIndex>());
        assert!(!world.contains_resource::<StorySequencer>());
        assert!(!world.contains_resource::<RegionRefresh>());
    }

    #[test]
    fn story_and_region_refresh_are_installed_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("storyData.json")).unwrap();
        write!(
            file,
            r#"[{{ "order": 1, "type": "tribe", "featureName": "Navajo Nation" }}, {{ "order": 2 }}]"#
        )
        .unwrap();

        let mut app = App::new();
        StoryMapBuilder::new()
            .config(config_in(dir.path()))
            .nav_policy(NavPolicy::Wrap)
            .region_refresh(true)
            .disable_search()
            .install(&mut app)
            .unwrap();

        let world = app.world();
        let story = world.resource::<StorySequencer>();
        assert_eq!(story.len(), 1);
        assert_eq!(story.policy(), NavPolicy::Wrap);
        assert_eq!(
            world.resource::<RegionRefresh>().layer(),
            &LayerId::from(catalog::ANCESTRAL)
        );
        assert!(!world.contains_resource::<SearchIndex>());
    }
}
