//! Keys of detector data units and their mapping to filenames
//!
//! A [`FileKey`] identifies one data unit by experiment, detector, campaign,
//! measurement, run and timestamp; a [`ProcessingKey`] adds the processing
//! step that produced a file. Both can be parsed out of a filename with a
//! template from [`crate::patterns`] and rendered back into one.
//!
//! ```
//! use keyflow::key::FileKey;
//! use keyflow::patterns::key_pattern;
//!
//! let key = FileKey::from_pattern("l200-det1-cal-run0003-230101T000000", &key_pattern())?;
//! assert_eq!(key.run(), "r003");
//! assert_eq!(key.timestamp(), "20230101T000000Z");
//! assert_eq!(key.name(), "l200-det1-*-cal-r003-20230101T000000Z");
//! # Ok::<(), keyflow::error::KeyflowError>(())
//! ```

pub mod convert;
pub mod file_key;
pub mod processing_key;
pub mod render;
pub mod template;

pub use file_key::FileKey;
pub use processing_key::{ProcessingKey, ProcessingStep};
pub use render::{render_path, PatternResolver, Substitution, TemplateSource};
pub use template::{compile_template, TemplateRegex};

use crate::error::{KeyflowError, Result};
use std::collections::BTreeMap;
use tracing::trace;

/// Value of a field that matches anything
pub const WILDCARD: &str = "*";

/// Fields of [`FileKey`], in canonical order
pub const FILE_KEY_FIELDS: [&str; 6] = [
    "experiment",
    "detector",
    "campaign",
    "measurement",
    "run",
    "timestamp",
];

/// A record of named key fields that templates can be parsed into and
/// rendered from
pub trait KeyRecord: Sized {
    /// Field names in canonical order
    const FIELDS: &'static [&'static str];

    /// Build the record from a value for every name in [`Self::FIELDS`]
    fn from_fields(fields: BTreeMap<&'static str, String>) -> Self;

    /// Field values in canonical order
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Arguments handed to a [`TemplateSource::Resolver`]
    fn resolver_args(&self) -> (Option<&str>, Option<&str>) {
        (None, None)
    }
}

/// Parse `filename` against `pattern` into a key
///
/// Placeholders that are not fields of `K` are ignored and fields that the
/// pattern does not mention become [`WILDCARD`]. Timestamps and
/// acquisition-style run labels are normalized.
pub fn parse_from_pattern<K: KeyRecord>(filename: &str, pattern: &str) -> Result<K> {
    let compiled = compile_template(pattern)?;
    let mut captured = compiled
        .captures(filename)
        .ok_or_else(|| KeyflowError::TemplateMismatch {
            filename: filename.to_string(),
            template: pattern.to_string(),
        })?;

    let mut fields: BTreeMap<&'static str, String> = K::FIELDS
        .iter()
        .map(|&name| {
            let value = captured
                .remove(name)
                .unwrap_or_else(|| WILDCARD.to_string());
            (name, value)
        })
        .collect();

    if let Some(timestamp) = fields.get_mut("timestamp") {
        *timestamp = convert::to_canonical_timestamp(timestamp)?;
    }
    if let Some(run) = fields.get_mut("run") {
        if convert::needs_run_conversion(run) {
            *run = convert::to_canonical_run(run);
        }
    }

    trace!("Parsed {} with {}", filename, pattern);
    Ok(K::from_fields(fields))
}
