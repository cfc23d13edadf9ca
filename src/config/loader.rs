//! Loading of setup configuration files

use super::SetupConfig;
use crate::error::{ErrorCode, KeyflowError, Result};
use std::path::Path;
use tracing::debug;

/// Load a setup file, choosing the format by its suffix
///
/// `.yaml`/`.yml` are read as YAML, `.json` as JSON. Path variables are
/// expanded relative to the directory holding the file.
pub fn load_setup(path: &Path) -> Result<SetupConfig> {
    if !path.is_file() {
        return Err(KeyflowError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("setup file not found: {}", path.display()),
        ));
    }

    let content = std::fs::read_to_string(path).map_err(|e| KeyflowError::io(path, e))?;
    let setup: SetupConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => {
            return Err(KeyflowError::config(format!(
                "setup file {} is not in yaml or json format",
                path.display()
            )))
        }
    };

    let config_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    debug!("Loaded setup from {}", path.display());
    Ok(setup.resolve_variables(&config_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_yaml_setup() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("setup.yaml");
        std::fs::write(
            &file,
            "paths:\n  tier: $_/gen/tier\n  tier_daq: /data/daq\n  par: $_/gen/par\n  plt: $_/gen/plt\nexecenv: {}\n",
        )
        .unwrap();

        let setup = load_setup(&file).unwrap();
        assert_eq!(setup.paths.tier, dir.path().join("gen/tier"));
        assert_eq!(setup.paths.tier_daq, Some(PathBuf::from("/data/daq")));
        assert_eq!(setup.tier_path("dsp").unwrap(), dir.path().join("gen/tier/dsp"));
    }

    #[test]
    fn test_load_json_setup() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("setup.json");
        std::fs::write(
            &file,
            r#"{"paths": {"tier": "/t", "par": "/p", "plt": "/q", "tmp_log": "/l"}}"#,
        )
        .unwrap();

        let setup = load_setup(&file).unwrap();
        assert_eq!(setup.tmp_log_path(), PathBuf::from("/l"));
    }

    #[test]
    fn test_missing_setup_file() {
        let err = load_setup(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_unsupported_setup_format() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("setup.toml");
        std::fs::write(&file, "paths = {}").unwrap();
        let err = load_setup(&file).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);
    }

    #[test]
    fn test_malformed_yaml_setup() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("setup.yml");
        std::fs::write(&file, "paths: [unclosed").unwrap();
        let err = load_setup(&file).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_YAML);
    }
}
