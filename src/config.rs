//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/winzo/config.json`.
//! Every key is optional; a missing file or a minimal `{}` yields the
//! compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "release_policy": "move_resize",
//!   "presets": {
//!     "almost_maximize": { "kind": "padded", "padding": 100 },
//!     "hd": { "kind": "fixed", "width": 1280, "height": 720 }
//!   },
//!   "desktop_classes": ["xfdesktop"]
//! }
//! ```

use crate::geometry::Preset;
use crate::registry::ReleasePolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How managed windows are released when the user moves them.
    pub release_policy: ReleasePolicy,

    /// Named target geometries, invoked with `{"Toggle":"<name>"}`.
    ///
    /// Setting this key replaces the default presets entirely.
    pub presets: BTreeMap<String, Preset>,

    /// Window classes treated as desktop surfaces and never managed.
    pub desktop_classes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert(
            "almost_maximize".to_string(),
            Preset::Padded {
                padding: 100.0,
                dock_offset: 0.0,
            },
        );
        presets.insert(
            "hd".to_string(),
            Preset::Fixed {
                width: 1280.0,
                height: 720.0,
            },
        );
        Self {
            release_policy: ReleasePolicy::default(),
            presets,
            desktop_classes: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "release_policy": "geometry_from_managed",
            "presets": {
                "wide": { "kind": "padded", "padding": 40, "dock_offset": 32 },
                "small": { "kind": "fixed", "width": 800, "height": 600 }
            },
            "desktop_classes": ["xfdesktop", "plasmashell"]
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.release_policy, ReleasePolicy::GeometryFromManaged);
        assert_eq!(cfg.presets.len(), 2);
        assert_eq!(
            cfg.presets["wide"],
            Preset::Padded {
                padding: 40.0,
                dock_offset: 32.0
            }
        );
        assert_eq!(
            cfg.presets["small"],
            Preset::Fixed {
                width: 800.0,
                height: 600.0
            }
        );
        assert_eq!(cfg.desktop_classes, vec!["xfdesktop", "plasmashell"]);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let d = Config::default();
        assert_eq!(cfg.release_policy, d.release_policy);
        assert_eq!(cfg.presets, d.presets);
        assert!(cfg.desktop_classes.is_empty());
    }

    #[test]
    fn default_presets() {
        let d = Config::default();
        assert_eq!(
            d.presets["almost_maximize"],
            Preset::Padded {
                padding: 100.0,
                dock_offset: 0.0
            }
        );
        assert!(d.presets.contains_key("hd"));
        assert_eq!(d.release_policy, ReleasePolicy::MoveResize);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let json = r#"{ "release_policy": "geometry_from_original" }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.release_policy, ReleasePolicy::GeometryFromOriginal);
        assert_eq!(cfg.presets, Config::default().presets);
    }

    #[test]
    fn invalid_preset_kind_is_rejected() {
        let json = r#"{ "presets": { "x": { "kind": "spiral" } } }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "future_section": { "key": 42 } }"#;
        // Unknown keys are silently ignored.
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("winzo-test-does-not-exist.json");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
