use super::{parse_from_pattern, render, FileKey, KeyRecord, FILE_KEY_FIELDS, WILDCARD};
use crate::error::Result;
use crate::patterns::processing_pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const STEP_SEPARATOR: char = '_';

/// A processing step such as `tier_dsp` or `par_hit_aoe`
///
/// Parsed by splitting on `_` at most twice, so an identifier may contain
/// further underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingStep {
    processing_type: String,
    tier: Option<String>,
    identifier: Option<String>,
}

impl ProcessingStep {
    pub fn new(processing_type: impl Into<String>) -> Self {
        let processing_type = processing_type.into();
        Self {
            processing_type: if processing_type.is_empty() {
                WILDCARD.to_string()
            } else {
                processing_type
            },
            tier: None,
            identifier: None,
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    /// Attach an identifier; only meaningful once a tier is set
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        if self.tier.is_some() {
            self.identifier = Some(identifier.into());
        }
        self
    }

    pub fn parse(step: &str) -> Self {
        let mut parts = step.splitn(3, STEP_SEPARATOR);
        let mut parsed = Self::new(parts.next().unwrap_or_default());
        if let Some(tier) = parts.next() {
            parsed = parsed.with_tier(tier);
        }
        if let Some(identifier) = parts.next() {
            parsed = parsed.with_identifier(identifier);
        }
        parsed
    }

    pub fn processing_type(&self) -> &str {
        &self.processing_type
    }

    pub fn tier(&self) -> Option<&str> {
        self.tier.as_deref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }
}

impl FromStr for ProcessingStep {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ProcessingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.processing_type)?;
        if let Some(tier) = &self.tier {
            write!(f, "{STEP_SEPARATOR}{tier}")?;
        }
        if let Some(identifier) = &self.identifier {
            write!(f, "{STEP_SEPARATOR}{identifier}")?;
        }
        Ok(())
    }
}

/// A [`FileKey`] together with the processing step that produced the file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingKey {
    key: FileKey,
    step: ProcessingStep,
}

impl ProcessingKey {
    pub fn new(key: FileKey, step: ProcessingStep) -> Self {
        Self { key, step }
    }

    pub fn file_key(&self) -> &FileKey {
        &self.key
    }

    pub fn step(&self) -> &ProcessingStep {
        &self.step
    }

    pub fn processing_step(&self) -> String {
        self.step.to_string()
    }

    pub fn processing_type(&self) -> &str {
        self.step.processing_type()
    }

    pub fn tier(&self) -> Option<&str> {
        self.step.tier()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.step.identifier()
    }

    /// The file key name followed by the processing step
    pub fn name(&self) -> String {
        format!("{}-{}", self.key.name(), self.step)
    }

    pub fn from_filename(filename: &str) -> Result<Self> {
        Self::from_pattern(filename, &processing_pattern())
    }

    pub fn from_pattern(filename: &str, pattern: &str) -> Result<Self> {
        parse_from_pattern(filename, pattern)
    }

    /// Render into a literal pattern, or into the pattern a resolver picks
    /// for this key's tier and identifier
    pub fn path_from_pattern(
        &self,
        pattern: impl Into<render::TemplateSource>,
        extra: &BTreeMap<String, render::Substitution>,
    ) -> Result<String> {
        render::render_path(self, pattern, extra)
    }
}

impl AsRef<FileKey> for ProcessingKey {
    fn as_ref(&self) -> &FileKey {
        &self.key
    }
}

impl fmt::Display for ProcessingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

const PROCESSING_KEY_FIELDS: [&str; 7] = [
    FILE_KEY_FIELDS[0],
    FILE_KEY_FIELDS[1],
    FILE_KEY_FIELDS[2],
    FILE_KEY_FIELDS[3],
    FILE_KEY_FIELDS[4],
    FILE_KEY_FIELDS[5],
    "processing_step",
];

impl KeyRecord for ProcessingKey {
    const FIELDS: &'static [&'static str] = &PROCESSING_KEY_FIELDS;

    fn from_fields(mut fields: BTreeMap<&'static str, String>) -> Self {
        let step = fields
            .remove("processing_step")
            .unwrap_or_else(|| WILDCARD.to_string());
        Self {
            key: FileKey::from_fields(fields),
            step: ProcessingStep::parse(&step),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = self.key.fields();
        fields.push(("processing_step", self.processing_step()));
        fields
    }

    fn resolver_args(&self) -> (Option<&str>, Option<&str>) {
        (self.tier(), self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_round_trip_all_arities() {
        for step in ["tier", "tier_dsp", "par_hit_aoe", "par_hit_aoe_low_e"] {
            assert_eq!(ProcessingStep::parse(step).to_string(), step);
        }
    }

    #[test]
    fn test_step_decomposition() {
        let step = ProcessingStep::parse("par_hit_aoe_low_e");
        assert_eq!(step.processing_type(), "par");
        assert_eq!(step.tier(), Some("hit"));
        assert_eq!(step.identifier(), Some("aoe_low_e"));

        let step: ProcessingStep = "tier".parse().unwrap();
        assert_eq!(step.tier(), None);
        assert_eq!(step.identifier(), None);
    }

    #[test]
    fn test_identifier_requires_tier() {
        let step = ProcessingStep::new("par").with_identifier("x");
        assert_eq!(step.identifier(), None);
        assert_eq!(step.to_string(), "par");
    }

    #[test]
    fn test_processing_key_name() {
        let key = ProcessingKey::new(
            FileKey::new("l200", "det1", "p01", "cal", "r000", "20230101T000000Z"),
            ProcessingStep::new("tier").with_tier("dsp"),
        );
        assert_eq!(key.name(), "l200-det1-p01-cal-r000-20230101T000000Z-tier_dsp");
        assert_eq!(key.file_key().name(), "l200-det1-p01-cal-r000-20230101T000000Z");
    }

    #[test]
    fn test_from_filename() {
        let key = ProcessingKey::from_filename("/logs/l200-det1-cal-r000-20230101T000000Z-tier_hit").unwrap();
        assert_eq!(key.processing_step(), "tier_hit");
        assert_eq!(key.tier(), Some("hit"));
        assert_eq!(key.file_key().campaign(), WILDCARD);
    }
}
