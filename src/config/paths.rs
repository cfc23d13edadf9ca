//! Variable expansion for configured paths
//!
//! Path values in a setup file may reference the directory holding the setup
//! file as `$_`, the home directory as `~`, and environment variables as
//! `$VAR` or `${VAR}`. Unknown variables are left untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("Valid regex pattern")
});

/// Expand `$_`, `~` and environment variables in a configured path
pub fn expand_path_variables(path: &Path, config_dir: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = expand_config_dir(&raw, config_dir);
    let expanded = expand_home_dir(expanded);
    PathBuf::from(expand_env_vars(&expanded))
}

fn expand_config_dir(path: &str, config_dir: &Path) -> String {
    // `$_` must go first, `_` would otherwise read as a variable name
    match path.strip_prefix("$_") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            format!("{}{}", config_dir.display(), rest)
        }
        _ => path.to_string(),
    }
}

fn expand_home_dir(path: String) -> String {
    if path.starts_with("~/") || path == "~" {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return path.replacen('~', &home, 1);
        }
    }
    path
}

fn expand_env_vars(path: &str) -> String {
    ENV_VAR_REGEX
        .replace_all(path, |caps: &regex::Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}
