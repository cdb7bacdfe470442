//! Configuration for saving and regenerating nested prefab trees.

use std::path::{Path, PathBuf};

use bevy_ecs::system::Resource;
use serde::Deserialize;

use crate::prefab::{PrefabError, PrefabResult};

/// Separator inserted between ancestor names in hierarchy breadcrumbs.
pub const DEFAULT_PATH_SEPARATOR: &str = "//Nested//";

/// Settings shared by the flattener, the reconstructor and the default
/// template resolver.
///
/// Can be loaded from a TOML file; missing keys fall back to [`Default`].
/// Insert it as a world resource to apply it to [`NestedPrefab`](crate::prefab::NestedPrefab)
/// operations.
///
/// ```toml
/// path_separator = "/"
/// template_root = "assets/templates"
/// template_extension = "ron"
/// max_nesting_depth = 16
/// ```
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PrefabConfig {
    /// Token placed before every name appended to a hierarchy breadcrumb.
    pub path_separator: String,
    /// Directory the packaged resolver loads templates from.
    pub template_root: PathBuf,
    /// File extension of packaged templates, without the dot.
    pub template_extension: String,
    /// Maximum depth of template-within-template reconstruction.
    pub max_nesting_depth: usize,
}

impl Default for PrefabConfig {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            template_root: PathBuf::from("templates"),
            template_extension: "ron".to_string(),
            max_nesting_depth: 32,
        }
    }
}

impl PrefabConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str) -> PrefabResult<Self> {
        toml::from_str(content).map_err(|e| PrefabError::Config(e.to_string()))
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> PrefabResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PrefabError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded prefab config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let config = PrefabConfig::from_toml_str("").unwrap();
        assert_eq!(config, PrefabConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = PrefabConfig::from_toml_str(
            r#"
            path_separator = "/"
            max_nesting_depth = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.path_separator, "/");
        assert_eq!(config.max_nesting_depth, 4);
        assert_eq!(config.template_extension, "ron");
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = PrefabConfig::from_toml_str("max_nesting_depth = \"deep\"").unwrap_err();
        assert!(matches!(err, PrefabError::Config(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = PrefabConfig::load(Path::new("/nonexistent/prefab.toml")).unwrap_err();
        assert!(matches!(err, PrefabError::Io { .. }));
    }
}
