use super::{convert, parse_from_pattern, render, KeyRecord, FILE_KEY_FIELDS, WILDCARD};
use crate::config::SetupConfig;
use crate::error::{KeyflowError, Result};
use crate::patterns::{key_pattern, processing_pattern, tier_pattern};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Grammar of a key part: every field is optional, but only when all fields
/// to its right are absent too
static KEYPART_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^-(?P<experiment>[^-]+)",
        r"(?:-(?P<detector>[^-]+)",
        r"(?:-(?P<campaign>[^-]+)",
        r"(?:-(?P<measurement>[^-]+)",
        r"(?:-(?P<run>[^-]+)",
        r"(?:-(?P<timestamp>[^-]+))?)?)?)?)?$",
    ))
    .expect("Valid regex pattern")
});

/// Identifier of one detector data unit
///
/// Fields are never empty; [`WILDCARD`] stands for "any value". A key is
/// immutable, every derived string is computed on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    experiment: String,
    detector: String,
    campaign: String,
    measurement: String,
    run: String,
    timestamp: String,
}

fn non_empty(value: impl Into<String>) -> String {
    let value = value.into();
    if value.is_empty() {
        WILDCARD.to_string()
    } else {
        value
    }
}

impl FileKey {
    /// Build a key from its fields; empty values become [`WILDCARD`]
    pub fn new(
        experiment: impl Into<String>,
        detector: impl Into<String>,
        campaign: impl Into<String>,
        measurement: impl Into<String>,
        run: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            experiment: non_empty(experiment),
            detector: non_empty(detector),
            campaign: non_empty(campaign),
            measurement: non_empty(measurement),
            run: non_empty(run),
            timestamp: non_empty(timestamp),
        }
    }

    /// A key matching every data unit
    pub fn any() -> Self {
        Self::new(WILDCARD, WILDCARD, WILDCARD, WILDCARD, WILDCARD, WILDCARD)
    }

    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    pub fn detector(&self) -> &str {
        &self.detector
    }

    pub fn campaign(&self) -> &str {
        &self.campaign
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn run(&self) -> &str {
        &self.run
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// `experiment-detector-campaign-measurement-run-timestamp`
    pub fn name(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}",
            self.experiment, self.detector, self.campaign, self.measurement, self.run, self.timestamp
        )
    }

    /// The key-part form of [`Self::name`], accepted by [`Self::from_keypart`]
    pub fn key(&self) -> String {
        format!("-{}", self.name())
    }

    /// Whether no field is a wildcard
    pub fn is_concrete(&self) -> bool {
        self.fields().iter().all(|(_, value)| value != WILDCARD)
    }

    /// Copy of this key with another run label
    pub fn with_run(&self, run: impl Into<String>) -> Self {
        Self {
            run: non_empty(run),
            ..self.clone()
        }
    }

    /// Parse a partial key such as `-l200-p01-*-cal`
    ///
    /// Missing trailing fields become [`WILDCARD`]. Values are taken as
    /// written, no run or timestamp normalization happens here.
    pub fn from_keypart(keypart: &str) -> Result<Self> {
        let caps = KEYPART_REGEX
            .captures(keypart)
            .ok_or_else(|| KeyflowError::InvalidKeyPart {
                keypart: keypart.to_string(),
            })?;
        let field = |name: &str| {
            caps.name(name)
                .map_or_else(|| WILDCARD.to_string(), |m| m.as_str().to_string())
        };
        Ok(Self::new(
            field("experiment"),
            field("detector"),
            field("campaign"),
            field("measurement"),
            field("run"),
            field("timestamp"),
        ))
    }

    /// Parse a processing output filename, ignoring its processing step
    pub fn from_filename(filename: &str) -> Result<Self> {
        Self::from_pattern(filename, &processing_pattern())
    }

    pub fn from_pattern(filename: &str, pattern: &str) -> Result<Self> {
        parse_from_pattern(filename, pattern)
    }

    /// Render this key into `pattern` with extra substitutions
    pub fn path_from_pattern(
        &self,
        pattern: impl Into<render::TemplateSource>,
        extra: &BTreeMap<String, render::Substitution>,
    ) -> Result<String> {
        render::render_path(self, pattern, extra)
    }

    /// Render this key into a literal pattern
    pub fn render(&self, pattern: &str) -> String {
        render::render_literal(self, pattern, &BTreeMap::new())
    }

    /// Re-render `filename`, parsed with `pattern`, into `path_pattern`
    pub fn full_path_from_filename(
        filename: &str,
        pattern: &str,
        path_pattern: &str,
    ) -> Result<String> {
        Ok(Self::from_pattern(filename, pattern)?.render(path_pattern))
    }

    /// Map key names to the files of `tier` that hold them
    pub fn tier_files<S: AsRef<str>>(
        setup: &SetupConfig,
        keys: &[S],
        tier: &str,
    ) -> Result<Vec<String>> {
        let path_pattern = tier_pattern(setup, tier, true)?;
        keys.iter()
            .map(|line| Self::full_path_from_filename(line.as_ref(), &key_pattern(), &path_pattern))
            .collect()
    }

    /// Seconds since the epoch of this key's timestamp
    pub fn unix_timestamp(&self) -> Result<i64> {
        convert::unix_time(&self.timestamp)
    }

    /// Seconds since the epoch of the timestamp in a key name such as
    /// `l200-det1-cal-r000-20230101T000000Z`
    pub fn unix_time_from_string(name: &str) -> Result<i64> {
        Self::from_pattern(name, &key_pattern())?.unix_timestamp()
    }
}

impl Default for FileKey {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl KeyRecord for FileKey {
    const FIELDS: &'static [&'static str] = &FILE_KEY_FIELDS;

    fn from_fields(mut fields: BTreeMap<&'static str, String>) -> Self {
        let mut take = |name: &str| fields.remove(name).unwrap_or_else(|| WILDCARD.to_string());
        Self::new(
            take("experiment"),
            take("detector"),
            take("campaign"),
            take("measurement"),
            take("run"),
            take("timestamp"),
        )
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("experiment", self.experiment.clone()),
            ("detector", self.detector.clone()),
            ("campaign", self.campaign.clone()),
            ("measurement", self.measurement.clone()),
            ("run", self.run.clone()),
            ("timestamp", self.timestamp.clone()),
        ]
    }
}
