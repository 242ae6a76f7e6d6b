use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::dataset::PopulationFilter;

const CACHE_DIR: &str = "proscout_terminal";
const CACHE_FILE: &str = "session.json";
const CACHE_VERSION: u32 = 1;

/// Last session's parameters: dataset path, filter bounds and selections.
/// Derived values (percentiles, scores, similarities) are never persisted;
/// every query recomputes them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionCache {
    version: u32,
    #[serde(default)]
    pub saved_at: String,
    #[serde(default)]
    pub dataset_path: Option<String>,
    #[serde(default)]
    pub filter: Option<PopulationFilter>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub archetypes: Vec<String>,
}

pub fn load_session() -> Option<SessionCache> {
    let path = cache_path()?;
    let raw = fs::read_to_string(&path).ok()?;
    let cache = serde_json::from_str::<SessionCache>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

pub fn save_session(mut cache: SessionCache) {
    let Some(path) = cache_path() else {
        return;
    };
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    cache.version = CACHE_VERSION;
    cache.saved_at = Utc::now().to_rfc3339();
    if let Ok(json) = serde_json::to_string(&cache) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, &path);
        }
    }
}

fn cache_path() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    // Fallback to ~/.cache on linux-like systems.
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips_through_json() {
        let cache = SessionCache {
            version: CACHE_VERSION,
            saved_at: String::new(),
            dataset_path: Some("players.csv".to_string()),
            filter: Some(PopulationFilter {
                age_min: 18,
                age_max: 29,
                minutes_min: 900,
                minutes_max: 3400,
            }),
            position: Some("Extremo".to_string()),
            archetypes: vec!["Driblador".to_string()],
        };
        let raw = serde_json::to_string(&cache).unwrap();
        let back: SessionCache = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.position.as_deref(), Some("Extremo"));
        assert_eq!(back.filter.unwrap().minutes_max, 3400);
    }

    #[test]
    fn stale_versions_are_ignored() {
        let raw = r#"{"version":0,"archetypes":[]}"#;
        let cache = serde_json::from_str::<SessionCache>(raw).unwrap();
        assert_ne!(cache.version, CACHE_VERSION);
    }
}
