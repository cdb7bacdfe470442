//! RON encoding and decoding of persisted prefab state.
//!
//! Container records and template assets are plain serde types; these
//! helpers pin the text format and map failures to [`PrefabError`].

use std::path::Path;

use super::error::{PrefabError, PrefabResult};

/// Encode a serde-serializable value as pretty-printed RON.
pub fn encode<T: serde::Serialize>(value: &T) -> PrefabResult<String> {
    ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|e| PrefabError::Format(e.to_string()))
}

/// Decode RON text into a serde-deserializable type.
pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> PrefabResult<T> {
    ron::from_str(text).map_err(|e| PrefabError::Format(e.to_string()))
}

/// Read and decode a RON file.
pub fn load_file<T: serde::de::DeserializeOwned>(path: &Path) -> PrefabResult<T> {
    let text = std::fs::read_to_string(path).map_err(|e| PrefabError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    decode(&text).map_err(|e| match e {
        PrefabError::Format(message) => {
            PrefabError::Format(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}

/// Encode a value and write it to a file.
pub fn save_file<T: serde::Serialize>(value: &T, path: &Path) -> PrefabResult<()> {
    let text = encode(value)?;
    std::fs::write(path, text).map_err(|e| PrefabError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
