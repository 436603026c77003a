//! Homelands exhibit map. Runs the story_map app.

use bevy::prelude::*;
use story_map::prelude::*;

fn main() -> AppExit {
    let _ = dotenvy::dotenv();

    StoryMapBuilder::new()
        .config(MapConfig::from_env())
        .build()
        .unwrap_or_else(|err| panic!("homelands: {err}"))
        .run()
}
