//! Keys excluded from file lists

use crate::error::{KeyflowError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

const COMMENT_MARKER: char = '#';

/// Key names that must not be processed
///
/// `removed` keys are dropped from every tier after `raw`; `unprocessable`
/// keys are dropped everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreKeys {
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub unprocessable: Vec<String>,
}

impl IgnoreKeys {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.unprocessable.is_empty()
    }

    /// The keys ignored when building inputs for `tier`, sorted
    pub fn for_tier(&self, tier: &str) -> Vec<String> {
        let keys: BTreeSet<&String> = if tier == "raw" {
            self.unprocessable.iter().collect()
        } else {
            self.removed.iter().chain(&self.unprocessable).collect()
        };
        keys.into_iter().cloned().collect()
    }

    /// Parse a key list, one key name per line with `#` comments
    pub fn from_keylist(content: &str) -> Self {
        let unprocessable = content
            .lines()
            .map(|line| match line.split_once(COMMENT_MARKER) {
                Some((key, _)) => key.trim(),
                None => line.trim(),
            })
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            removed: Vec::new(),
            unprocessable,
        }
    }
}

/// Load an ignore-keys file; no file means nothing is ignored
pub fn load_ignore_keys(path: Option<&Path>) -> Result<IgnoreKeys> {
    let Some(path) = path else {
        return Ok(IgnoreKeys::default());
    };

    let format = path.extension().and_then(|ext| ext.to_str());
    if !matches!(format, Some("json" | "yaml" | "yml" | "keylist")) {
        return Err(KeyflowError::InvalidIgnoreFormat {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(KeyflowError::MissingIgnoreFile {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| KeyflowError::io(path, e))?;
    let keys: IgnoreKeys = match format {
        Some("json") => serde_json::from_str(&content)?,
        Some("keylist") => IgnoreKeys::from_keylist(&content),
        _ if content.trim().is_empty() => IgnoreKeys::default(),
        _ => serde_yaml::from_str(&content)?,
    };

    debug!(
        "Loaded {} removed and {} unprocessable keys from {}",
        keys.removed.len(),
        keys.unprocessable.len(),
        path.display()
    );
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn keys() -> IgnoreKeys {
        IgnoreKeys {
            removed: vec!["b".to_string(), "a".to_string()],
            unprocessable: vec!["c".to_string(), "a".to_string()],
        }
    }

    #[test]
    fn test_raw_tier_uses_unprocessable_only() {
        assert_eq!(keys().for_tier("raw"), ["a", "c"]);
    }

    #[test]
    fn test_other_tiers_use_union() {
        assert_eq!(keys().for_tier("dsp"), ["a", "b", "c"]);
        assert_eq!(keys().for_tier("hit"), ["a", "b", "c"]);
    }

    #[test]
    fn test_keylist_parsing() {
        let content = "# header\nl200-p01-r000-cal-20230101T000000Z  # bad baseline\n\n   \n  l200-p01-r001-cal-20230102T000000Z\n";
        let keys = IgnoreKeys::from_keylist(content);
        assert!(keys.removed.is_empty());
        assert_eq!(
            keys.unprocessable,
            [
                "l200-p01-r000-cal-20230101T000000Z",
                "l200-p01-r001-cal-20230102T000000Z"
            ]
        );
    }

    #[test]
    fn test_no_file_is_empty() {
        assert!(load_ignore_keys(None).unwrap().is_empty());
    }

    #[test]
    fn test_load_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        let yaml = dir.path().join("ignore.yaml");
        std::fs::write(&yaml, "removed:\n  - k1\nunprocessable:\n  - k2\n").unwrap();
        let loaded = load_ignore_keys(Some(yaml.as_path())).unwrap();
        assert_eq!(loaded.removed, ["k1"]);
        assert_eq!(loaded.unprocessable, ["k2"]);

        let json = dir.path().join("ignore.json");
        std::fs::write(&json, r#"{"unprocessable": ["k3"]}"#).unwrap();
        let loaded = load_ignore_keys(Some(json.as_path())).unwrap();
        assert!(loaded.removed.is_empty());
        assert_eq!(loaded.unprocessable, ["k3"]);
    }

    #[test]
    fn test_load_keylist() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ignore.keylist");
        std::fs::write(&file, "k1\n#k2\nk3 # note\n").unwrap();
        let loaded = load_ignore_keys(Some(file.as_path())).unwrap();
        assert_eq!(loaded.unprocessable, ["k1", "k3"]);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("ignore.txt");
        std::fs::write(&file, "k1\n").unwrap();
        let err = load_ignore_keys(Some(file.as_path())).unwrap_err();
        assert!(matches!(err, KeyflowError::InvalidIgnoreFormat { .. }));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("absent.yaml");
        let err = load_ignore_keys(Some(file.as_path())).unwrap_err();
        assert!(matches!(err, KeyflowError::MissingIgnoreFile { .. }));
    }
}
