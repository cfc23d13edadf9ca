//! Setup configuration for a processing cycle
//!
//! The setup describes where every data tier lives on disk. Only the `paths`
//! section is interpreted here; everything else a production setup carries is
//! ignored by serde.
//!
//! ```yaml
//! paths:
//!   tier: $_/generated/tier
//!   tier_daq: /data/daq
//!   par: $_/generated/par
//!   plt: $_/generated/plt
//!   tmp: $_/generated/tmp
//! ```

use crate::error::{KeyflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod loader;
pub mod paths;

pub use loader::load_setup;
pub use paths::expand_path_variables;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetupConfig {
    pub paths: PathsConfig,
}

/// Storage roots of one processing cycle
///
/// Tier and parameter roots that are not given fall back to a sub-directory of
/// the cycle root named after the tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Root of all generated tier data of the cycle
    pub tier: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_daq: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_raw: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_dsp: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_hit: Option<PathBuf>,
    /// Root of all parameter files of the cycle
    pub par: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_dsp: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub par_hit: Option<PathBuf>,
    pub plt: PathBuf,
    /// Scratch root; the OS temp directory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_par: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_plt: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_log: Option<PathBuf>,
}

impl PathsConfig {
    /// Minimal paths section with every optional root defaulted
    pub fn new(tier: impl Into<PathBuf>, par: impl Into<PathBuf>, plt: impl Into<PathBuf>) -> Self {
        Self {
            tier: tier.into(),
            tier_daq: None,
            tier_raw: None,
            tier_dsp: None,
            tier_hit: None,
            par: par.into(),
            par_dsp: None,
            par_hit: None,
            plt: plt.into(),
            tmp: None,
            tmp_par: None,
            tmp_plt: None,
            tmp_log: None,
        }
    }

    fn for_each_path_mut(&mut self, mut f: impl FnMut(&mut PathBuf)) {
        f(&mut self.tier);
        f(&mut self.par);
        f(&mut self.plt);
        for path in [
            &mut self.tier_daq,
            &mut self.tier_raw,
            &mut self.tier_dsp,
            &mut self.tier_hit,
            &mut self.par_dsp,
            &mut self.par_hit,
            &mut self.tmp,
            &mut self.tmp_par,
            &mut self.tmp_plt,
            &mut self.tmp_log,
        ]
        .into_iter()
        .flatten()
        {
            f(path);
        }
    }
}

impl SetupConfig {
    pub fn new(paths: PathsConfig) -> Self {
        Self { paths }
    }

    /// Setup whose every root lives below `base`
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let mut paths = PathsConfig::new(base.join("tier"), base.join("par"), base.join("plt"));
        paths.tmp = Some(base.join("tmp"));
        Self { paths }
    }

    /// Expand `$_`, `~` and environment variables in every configured path
    pub fn resolve_variables(mut self, config_dir: &Path) -> Self {
        self.paths
            .for_each_path_mut(|path| *path = expand_path_variables(path, config_dir));
        self
    }

    /// Root of the processing cycle's tier tree
    pub fn tier_root(&self) -> &Path {
        &self.paths.tier
    }

    /// Storage root of one data tier
    pub fn tier_path(&self, tier: &str) -> Result<PathBuf> {
        let configured = match tier {
            "daq" => &self.paths.tier_daq,
            "raw" => &self.paths.tier_raw,
            "dsp" => &self.paths.tier_dsp,
            "hit" => &self.paths.tier_hit,
            other => return Err(KeyflowError::invalid_tier(other)),
        };
        Ok(configured
            .clone()
            .unwrap_or_else(|| self.paths.tier.join(tier)))
    }

    /// Root of the processing cycle's parameter tree
    pub fn par_root(&self) -> &Path {
        &self.paths.par
    }

    /// Storage root of the parameter files of one tier
    pub fn par_path(&self, tier: &str) -> Result<PathBuf> {
        let configured = match tier {
            "dsp" => &self.paths.par_dsp,
            "hit" => &self.paths.par_hit,
            other => return Err(KeyflowError::invalid_tier(other)),
        };
        Ok(configured.clone().unwrap_or_else(|| self.paths.par.join(tier)))
    }

    pub fn plt_root(&self) -> &Path {
        &self.paths.plt
    }

    pub fn tmp_root(&self) -> PathBuf {
        self.paths.tmp.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn tmp_par_path(&self) -> PathBuf {
        self.paths
            .tmp_par
            .clone()
            .unwrap_or_else(|| self.tmp_root().join("par"))
    }

    pub fn tmp_plt_path(&self) -> PathBuf {
        self.paths
            .tmp_plt
            .clone()
            .unwrap_or_else(|| self.tmp_root().join("plt"))
    }

    pub fn tmp_log_path(&self) -> PathBuf {
        self.paths
            .tmp_log
            .clone()
            .unwrap_or_else(|| self.tmp_root().join("log"))
    }
}
