//! File list construction for one processing tier
//!
//! A partial key is expanded into concrete keys, every search pattern is
//! globbed for every key, the matches are parsed back into keys and, unless
//! ignored, rendered into the destination tier's naming scheme:
//!
//! ```text
//! keypart -> keys -> globs -> matched files -> keys -> ignore filter -> paths
//! ```

pub mod ignore;

pub use ignore::{load_ignore_keys, IgnoreKeys};

use crate::config::SetupConfig;
use crate::error::{KeyflowError, Result};
use crate::key::convert::to_daq_run;
use crate::key::template::EXT_PLACEHOLDER;
use crate::key::{FileKey, Substitution, WILDCARD};
use crate::patterns::{tier_daq_pattern, tier_pattern};
use glob::glob;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, trace};

const ORCA_SUFFIX: &str = ".orca";
/// Suffix a compressed copy of an `.orca` file gets
const ORCA_COMPRESSED_SUFFIX: &str = ".orca.bz2";

/// Explicit field values selecting the input files of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWildcards {
    pub experiment: String,
    pub detector: String,
    pub campaign: String,
    pub measurement: String,
    pub run: String,
}

impl FileWildcards {
    pub fn keypart(&self) -> String {
        format!(
            "-{}-{}-{}-{}-{}",
            self.experiment, self.detector, self.campaign, self.measurement, self.run
        )
    }
}

/// Expand a key part into concrete search keys
///
/// A concrete run is searched both under its own label and under the
/// acquisition-style label, so `r003` also finds `run0003` files. Keys come
/// out in field order, experiment first.
pub fn expand_keys(keypart: &str) -> Result<Vec<FileKey>> {
    let key = FileKey::from_keypart(keypart)?;

    let mut runs = vec![key.run().to_string()];
    let daq_run = to_daq_run(key.run());
    if key.run() != WILDCARD && daq_run != key.run() {
        runs.push(daq_run);
    }

    let keys: Vec<FileKey> = runs.iter().map(|run| key.with_run(run.as_str())).collect();
    trace!("Expanded {} into {} keys", keypart, keys.len());
    Ok(keys)
}

/// Make a search pattern ending in `.*` capture its extension
pub fn search_template(pattern: &str) -> String {
    match pattern.strip_suffix(".*") {
        Some(base) if !base.ends_with('/') && !base.is_empty() => {
            format!("{base}.{{{EXT_PLACEHOLDER}}}")
        }
        _ => pattern.to_string(),
    }
}

/// Pattern that names the files of `tier` in the output list
pub fn destination_pattern(setup: &SetupConfig, tier: &str) -> Result<String> {
    match tier {
        "daq" | "daq_compress" => tier_daq_pattern(setup, &format!("{{{EXT_PLACEHOLDER}}}"), false),
        _ => tier_pattern(setup, tier, false),
    }
}

/// Every suffix of a file name, `.orca.gz` for `run.orca.gz`
fn full_suffix(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| {
            let stem = name.trim_start_matches('.');
            stem.find('.').map(|idx| stem[idx..].to_string())
        })
        .unwrap_or_default()
}

/// The last suffix of a file name
fn last_suffix(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

/// Replace the last suffix of the final component of `template`
fn with_suffix(template: &str, suffix: &str) -> String {
    let name_start = template.rfind('/').map_or(0, |idx| idx + 1);
    let base = match template[name_start..].rfind('.') {
        Some(idx) if idx > 0 => &template[..name_start + idx],
        _ => template,
    };
    format!("{base}{suffix}")
}

/// The destination template for one matched file
fn output_template(destination: &str, tier: &str, matched: &Path) -> String {
    match tier {
        "daq" => with_suffix(destination, &full_suffix(matched)),
        "daq_compress" if last_suffix(matched) == ORCA_SUFFIX => {
            with_suffix(destination, ORCA_COMPRESSED_SUFFIX)
        }
        "daq_compress" => with_suffix(destination, &full_suffix(matched)),
        _ => destination.to_string(),
    }
}

fn glob_files(pattern: &str) -> Result<Vec<std::path::PathBuf>> {
    let entries = glob(pattern).map_err(|source| KeyflowError::Glob {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable glob entry: {}", e),
        }
    }
    Ok(files)
}

/// Find the files of `keys` and name them as files of `tier`
///
/// Each search pattern is globbed for every key with `ext` as a wildcard. A
/// match is parsed back with the same search pattern, dropped when its key
/// name is ignored for `tier` and otherwise rendered into the destination
/// pattern. Globs without matches contribute nothing. The result is sorted.
pub fn build_filelist<S: AsRef<str>>(
    setup: &SetupConfig,
    keys: &[FileKey],
    search_patterns: &[S],
    tier: &str,
    ignore: &IgnoreKeys,
) -> Result<Vec<String>> {
    let ignored: BTreeSet<String> = ignore.for_tier(tier).into_iter().collect();
    let destination = destination_pattern(setup, tier)?;

    let mut glob_extra = BTreeMap::new();
    glob_extra.insert(EXT_PLACEHOLDER.to_string(), Substitution::from(WILDCARD));

    let mut filenames = Vec::new();
    for key in keys {
        for pattern in search_patterns {
            let search = search_template(pattern.as_ref());
            let glob_pattern = key.path_from_pattern(&search, &glob_extra)?;
            let matches = glob_files(&glob_pattern)?;
            debug!("Glob {} matched {} files", glob_pattern, matches.len());

            for matched in matches {
                let found = FileKey::from_pattern(&matched.to_string_lossy(), &search)?;
                if ignored.contains(&found.name()) {
                    debug!("Ignoring {}", found.name());
                    continue;
                }
                let filename = found.render(&output_template(&destination, tier, &matched));
                trace!("{} -> {}", matched.display(), filename);
                filenames.push(filename);
            }
        }
    }

    filenames.sort();
    info!("Found {} files for tier {}", filenames.len(), tier);
    Ok(filenames)
}

/// File list for a job label such as `all-l200-p01-*-cal`
///
/// The first component names the file selection and is not part of the key.
pub fn get_filelist<S: AsRef<str>>(
    setup: &SetupConfig,
    label: &str,
    search_patterns: &[S],
    tier: &str,
    ignore_file: Option<&Path>,
) -> Result<Vec<String>> {
    let keypart = match label.split_once('-') {
        Some((_, keypart)) => format!("-{keypart}"),
        None => {
            return Err(KeyflowError::InvalidKeyPart {
                keypart: label.to_string(),
            })
        }
    };
    let ignore = load_ignore_keys(ignore_file)?;
    let keys = expand_keys(&keypart)?;
    build_filelist(setup, &keys, search_patterns, tier, &ignore)
}

/// File list for explicitly given field values
pub fn get_filelist_full_wildcards<S: AsRef<str>>(
    setup: &SetupConfig,
    wildcards: &FileWildcards,
    search_patterns: &[S],
    tier: &str,
    ignore_file: Option<&Path>,
) -> Result<Vec<String>> {
    let ignore = load_ignore_keys(ignore_file)?;
    let keys = expand_keys(&wildcards.keypart())?;
    build_filelist(setup, &keys, search_patterns, tier, &ignore)
}
