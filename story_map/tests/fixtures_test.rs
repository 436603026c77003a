use std::fs;
use std::thread;
use std::time::{Duration, Instant};

use bevy::prelude::*;

use story_map::data::{
    ingest_sources, FeatureSources, GeoJsonFileLoader, LoadState, SourceChannel, SourceReady,
};
use story_map::layers::{catalog, LayerId, LayerRegistry};
use story_map::search::{rebuild_search_index, SearchIndex};
use story_map::story::{load_slides, NavPolicy, Resolution, StoryContext, StorySequencer};
use story_map::{CameraNavigator, ViewState};

const MARKERS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature", "properties": { "name": "Cherokee Nation" },
      "geometry": { "type": "Point", "coordinates": [-94.97, 35.91] } },
    { "type": "Feature", "properties": { "name": "Navajo Nation" },
      "geometry": { "type": "Point", "coordinates": [-109.05, 35.67] } },
    { "type": "Feature", "properties": { "name": "Broken" }, "geometry": null }
  ]
}"#;

const STORY: &str = r#"[
  { "order": 2, "type": "tribe", "featureName": "Navajo Nation", "zoom": 7 },
  { "order": 1, "type": "tribe", "featureName": "Cherokee Nation",
    "title": "Trail of Tears", "link": "https://www.cherokee.org" },
  { "order": 3, "type": "tribe" }
]"#;

fn registry() -> LayerRegistry {
    let mut registry = LayerRegistry::default();
    for layer in catalog::exhibit_layers() {
        registry.register(layer).unwrap();
    }
    registry
}

/// Run `app` until `done` holds or a few seconds pass.
fn update_until(app: &mut App, done: impl Fn(&World) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(app.world()) {
        assert!(Instant::now() < deadline, "timed out waiting on loader");
        app.update();
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn geojson_file_loads_into_sources_and_search() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tribal-markers-geocoded.geojson"), MARKERS).unwrap();

    let registry = registry();
    let layer = registry.get(&LayerId::from(catalog::TRIBAL_MARKERS)).unwrap();
    let channel = SourceChannel::new();
    let mut sources = FeatureSources::default();
    sources.request::<GeoJsonFileLoader>(&channel, layer, dir.path(), None);

    let mut app = App::new();
    app.add_event::<SourceReady>()
        .insert_resource(channel)
        .insert_resource(sources)
        .insert_resource(SearchIndex::new(catalog::TRIBAL_MARKERS.into()))
        .add_systems(Update, (ingest_sources, rebuild_search_index).chain());

    let id = LayerId::from(catalog::TRIBAL_MARKERS);
    update_until(&mut app, |world| {
        world.resource::<FeatureSources>().state(&id) == Some(LoadState::Ready)
    });

    let sources = app.world().resource::<FeatureSources>();
    assert_eq!(sources.features(&id).len(), 2, "null geometry is skipped");

    let index = app.world().resource::<SearchIndex>();
    let hits: Vec<_> = index.search("nav").map(|e| e.display_name.as_str()).collect();
    assert_eq!(hits, ["Navajo Nation"]);
}

#[test]
fn story_file_drives_highlight_after_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tribal-markers-geocoded.geojson"), MARKERS).unwrap();
    let story_path = dir.path().join("storyData.json");
    fs::write(&story_path, STORY).unwrap();

    let (slides, diagnostics) = load_slides(&story_path).unwrap();
    assert_eq!(slides.len(), 2);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].position, 2);
    assert_eq!(slides[0].title, "Trail of Tears");
    assert_eq!(slides[0].media.link.as_deref(), Some("https://www.cherokee.org/"));

    let registry = registry();
    let channel = SourceChannel::new();
    let mut sources = FeatureSources::default();
    let layer = registry.get(&LayerId::from(catalog::TRIBAL_MARKERS)).unwrap();
    sources.request::<GeoJsonFileLoader>(&channel, layer, dir.path(), None);

    let mut camera = CameraNavigator::new(ViewState {
        center: Vec2::ZERO,
        zoom: 4.0,
    });
    let mut story = StorySequencer::new(slides, NavPolicy::Clamp);
    let entered = story.enter(&mut StoryContext {
        registry: &registry,
        sources: &sources,
        camera: &mut camera,
    });
    assert_eq!(entered, Some(Resolution::Deferred));

    let id = LayerId::from(catalog::TRIBAL_MARKERS);
    let deadline = Instant::now() + Duration::from_secs(5);
    let payload = loop {
        if let Some(payload) = channel.try_recv() {
            break payload;
        }
        assert!(Instant::now() < deadline, "timed out waiting on loader");
        thread::sleep(Duration::from_millis(5));
    };
    assert!(sources.apply(payload));

    let resolved = story.on_source_ready(
        &id,
        &mut StoryContext {
            registry: &registry,
            sources: &sources,
            camera: &mut camera,
        },
    );
    assert_eq!(resolved, Some(Resolution::Resolved));
    assert_eq!(story.highlight().features()[0].display_name, "Cherokee Nation");
    assert_eq!(camera.target().zoom, 6.0);
}

#[test]
fn missing_story_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_slides(&dir.path().join("nope.json")).is_err());
}
