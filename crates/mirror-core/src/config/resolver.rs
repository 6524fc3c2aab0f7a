//! Configuration resolution with layered merge

use std::path::PathBuf;

use mirror_fs::{ConfigStore, NormalizedPath};
use serde_json::Value;

use super::MirrorConfig;
use crate::{Error, Result};

const APP_DIR: &str = "repo-mirror";
const CONFIG_FILE: &str = "config.toml";

/// Resolves the effective [`MirrorConfig`].
///
/// Layers, later overriding earlier:
/// 1. Global file (`<config_dir>/repo-mirror/config.toml`), skipped when absent
/// 2. Explicit file given by the caller, which must exist
///
/// Objects merge key by key; scalars and arrays are replaced.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit: Option<PathBuf>,
    /// Override for the global config directory (used for testing).
    config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Use `dir` instead of the platform config directory.
    ///
    /// `dir` replaces `<config_dir>/repo-mirror` entirely.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir_override = Some(dir.into());
        self
    }

    /// Directory holding the global config and other per-user state.
    pub fn config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.config_dir().map(|dir| dir.join(CONFIG_FILE))
    }

    pub fn resolve(&self) -> Result<MirrorConfig> {
        let store = ConfigStore::new();
        let mut merged = Value::Object(Default::default());

        if let Some(global) = self.global_config_path() {
            let layer: Option<Value> = store.load_or_default(&NormalizedPath::new(&global))?;
            match layer {
                Some(layer) => {
                    tracing::debug!(path = %global.display(), "Loaded global config");
                    deep_merge_value(&mut merged, &layer);
                }
                None => tracing::debug!(path = %global.display(), "No global config, skipping"),
            }
        }

        if let Some(ref explicit) = self.explicit {
            let layer: Value = store.load(&NormalizedPath::new(explicit))?;
            tracing::debug!(path = %explicit.display(), "Loaded explicit config");
            deep_merge_value(&mut merged, &layer);
        }

        serde_json::from_value(merged).map_err(|e| Error::Configuration {
            message: e.to_string(),
        })
    }
}

fn deep_merge_value(base: &mut Value, other: &Value) {
    match (base, other) {
        (Value::Object(base_map), Value::Object(other_map)) => {
            for (key, other_val) in other_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge_value(base_val, other_val);
                } else {
                    base_map.insert(key.clone(), other_val.clone());
                }
            }
        }
        (base, other) => {
            *base = other.clone();
        }
    }
}
