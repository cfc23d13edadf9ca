//! Rendering keys into path patterns

use super::{template, KeyRecord};
use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::trace;

/// Chooses a pattern from a key's tier and identifier
pub type PatternResolver = Arc<dyn Fn(Option<&str>, Option<&str>) -> Result<String> + Send + Sync>;

/// Where the pattern for a render comes from
#[derive(Clone)]
pub enum TemplateSource {
    Literal(String),
    Resolver(PatternResolver),
}

impl TemplateSource {
    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(Option<&str>, Option<&str>) -> Result<String> + Send + Sync + 'static,
    {
        Self::Resolver(Arc::new(resolve))
    }

    /// The concrete pattern for a key with this tier and identifier
    pub fn resolve(&self, tier: Option<&str>, identifier: Option<&str>) -> Result<String> {
        match self {
            Self::Literal(pattern) => Ok(pattern.clone()),
            Self::Resolver(resolve) => (**resolve)(tier, identifier),
        }
    }
}

impl fmt::Debug for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(pattern) => f.debug_tuple("Literal").field(pattern).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for TemplateSource {
    fn from(pattern: &str) -> Self {
        Self::Literal(pattern.to_string())
    }
}

impl From<String> for TemplateSource {
    fn from(pattern: String) -> Self {
        Self::Literal(pattern)
    }
}

impl From<&String> for TemplateSource {
    fn from(pattern: &String) -> Self {
        Self::Literal(pattern.clone())
    }
}

impl From<&Path> for TemplateSource {
    fn from(pattern: &Path) -> Self {
        Self::Literal(pattern.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for TemplateSource {
    fn from(pattern: PathBuf) -> Self {
        Self::from(pattern.as_path())
    }
}

/// An extra value substituted next to the key's own fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    Value(String),
    /// Looked up by the value of the key's fields, first field with an entry wins
    ByField(BTreeMap<String, String>),
}

impl Substitution {
    fn resolve(&self, fields: &[(&'static str, String)]) -> Option<String> {
        match self {
            Self::Value(value) => Some(value.clone()),
            Self::ByField(map) => fields
                .iter()
                .find_map(|(_, value)| map.get(value).cloned()),
        }
    }
}

impl From<&str> for Substitution {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Substitution {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<BTreeMap<String, String>> for Substitution {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self::ByField(map)
    }
}

/// Substitute a key's fields and the extra values into a literal pattern
///
/// Extra values take precedence over key fields of the same name. A
/// [`Substitution::ByField`] without a matching entry is left out, so its
/// placeholder stays in the output.
pub fn render_literal<K: KeyRecord>(
    key: &K,
    pattern: &str,
    extra: &BTreeMap<String, Substitution>,
) -> String {
    let fields = key.fields();
    let mut values: BTreeMap<String, String> = fields
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    for (name, substitution) in extra {
        if let Some(value) = substitution.resolve(&fields) {
            values.insert(name.clone(), value);
        }
    }
    template::substitute(pattern, &values)
}

/// Render `key` into the pattern given by `source`
pub fn render_path<K, S>(key: &K, source: S, extra: &BTreeMap<String, Substitution>) -> Result<String>
where
    K: KeyRecord,
    S: Into<TemplateSource>,
{
    let (tier, identifier) = key.resolver_args();
    let pattern = source.into().resolve(tier, identifier)?;
    let rendered = render_literal(key, &pattern, extra);
    trace!("Rendered {} into {}", pattern, rendered);
    Ok(rendered)
}
