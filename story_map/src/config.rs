//! Env parsing and defaults.

use std::path::PathBuf;

use bevy::prelude::Resource;

use crate::story::NavPolicy;

const DEFAULT_DATA_DIR: &str = "assets/data";
const DEFAULT_STORY_FILE: &str = "storyData.json";
const DEFAULT_MEDIA_PREFIX: &str = "/media/";

/// Where the exhibit's data lives and how story mode behaves.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub data_dir: PathBuf,
    pub story_path: PathBuf,
    pub nav_policy: NavPolicy,
    pub media_prefix: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            story_path: data_dir.join(DEFAULT_STORY_FILE),
            data_dir,
            nav_policy: NavPolicy::default(),
            media_prefix: DEFAULT_MEDIA_PREFIX.to_string(),
        }
    }
}

impl MapConfig {
    /// Reads `HOMELANDS_DATA_DIR`, `HOMELANDS_STORY_PATH`,
    /// `HOMELANDS_STORY_NAV` and `HOMELANDS_MEDIA_PREFIX`. Unset or invalid
    /// values fall back to the defaults. The story file defaults to
    /// `storyData.json` inside the data directory.
    pub fn from_env() -> Self {
        let data_dir = non_empty_var("HOMELANDS_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let story_path = non_empty_var("HOMELANDS_STORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join(DEFAULT_STORY_FILE));
        let nav_policy = match non_empty_var("HOMELANDS_STORY_NAV") {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                eprintln!("homelands: {err} in HOMELANDS_STORY_NAV, using clamp");
                NavPolicy::Clamp
            }),
            None => NavPolicy::default(),
        };
        let media_prefix =
            non_empty_var("HOMELANDS_MEDIA_PREFIX").unwrap_or_else(|| DEFAULT_MEDIA_PREFIX.to_string());

        Self {
            data_dir,
            story_path,
            nav_policy,
            media_prefix,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    struct EnvGuard {
        snapshot: Vec<(&'static str, Option<String>)>,
    }

    impl EnvGuard {
        fn capture(keys: &[&'static str]) -> Self {
            let snapshot = keys
                .iter()
                .map(|&key| (key, std::env::var(key).ok()))
                .collect();
            Self { snapshot }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in &self.snapshot {
                match value {
                    Some(val) => std::env::set_var(key, val),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    const ENV_KEYS: [&str; 4] = [
        "HOMELANDS_DATA_DIR",
        "HOMELANDS_STORY_PATH",
        "HOMELANDS_STORY_NAV",
        "HOMELANDS_MEDIA_PREFIX",
    ];

    fn clear_env() {
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);
        clear_env();

        assert_eq!(MapConfig::from_env(), MapConfig::default());
    }

    #[test]
    fn story_file_follows_data_dir() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);
        clear_env();

        std::env::set_var("HOMELANDS_DATA_DIR", "/srv/exhibit");

        let config = MapConfig::from_env();

        assert_eq!(config.data_dir, PathBuf::from("/srv/exhibit"));
        assert_eq!(config.story_path, PathBuf::from("/srv/exhibit/storyData.json"));
    }

    #[test]
    fn explicit_values_are_used() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);
        clear_env();

        std::env::set_var("HOMELANDS_STORY_PATH", "/tmp/story.json");
        std::env::set_var("HOMELANDS_STORY_NAV", "wrap");
        std::env::set_var("HOMELANDS_MEDIA_PREFIX", "https://cdn.example.org/media");

        let config = MapConfig::from_env();

        assert_eq!(config.story_path, PathBuf::from("/tmp/story.json"));
        assert_eq!(config.nav_policy, NavPolicy::Wrap);
        assert_eq!(config.media_prefix, "https://cdn.example.org/media");
    }

    #[test]
    fn invalid_nav_policy_falls_back_to_clamp() {
        let _lock = lock_env();
        let _guard = EnvGuard::capture(&ENV_KEYS);
        clear_env();

        std::env::set_var("HOMELANDS_STORY_NAV", "bounce");

        assert_eq!(MapConfig::from_env().nav_policy, NavPolicy::Clamp);
    }
}
