//! Template to regex compilation and placeholder substitution
//!
//! A template such as `{detector}/{measurement}/{experiment}-{detector}.{ext}`
//! compiles to a regex that captures every named placeholder:
//!
//! - the first occurrence of a name becomes a named capture of `[^./]+`
//! - `ext` captures everything up to the end of the input
//! - a repeated name must capture the same text as its first occurrence
//! - the regex is anchored at the end only, so any directory prefix in front
//!   of the template's first literal is tolerated
//!
//! The `regex` crate has no back-references. Templates without a repeated
//! name are matched by the compiled regex alone. For the others the regex
//! only rejects inputs early and a backtracking walk over the template's parts
//! finds the same match a back-reference would.

use crate::error::{KeyflowError, Result};
use lru::LruCache;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// The placeholder that swallows the rest of the input
pub const EXT_PLACEHOLDER: &str = "ext";

static PLACEHOLDER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("Valid regex pattern"));

static TEMPLATE_CACHE: Lazy<Mutex<LruCache<String, Arc<TemplateRegex>>>> = Lazy::new(|| {
    let capacity = NonZeroUsize::new(64).expect("Cache size must be non-zero");
    Mutex::new(LruCache::new(capacity))
});

#[derive(Debug)]
enum Part {
    Literal(String),
    /// First occurrence of a placeholder; `to_end` for [`EXT_PLACEHOLDER`]
    Field { name: String, to_end: bool },
    /// Later occurrence, must repeat the text captured first
    Repeat(String),
}

/// A compiled template
#[derive(Debug)]
pub struct TemplateRegex {
    template: String,
    regex: Regex,
    /// Distinct placeholder names in order of first appearance
    names: Vec<String>,
    parts: Vec<Part>,
    has_repeats: bool,
}

impl TemplateRegex {
    /// Compile a template without going through the cache
    pub fn new(template: &str) -> Result<Self> {
        let mut pattern = String::with_capacity(template.len() * 2);
        let mut names: Vec<String> = Vec::new();
        let mut parts = Vec::new();
        let mut repeats = 0;
        let mut last = 0;

        for caps in PLACEHOLDER_REGEX.captures_iter(template) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let literal = &template[last..whole.start()];
            pattern.push_str(&regex::escape(literal));
            if !literal.is_empty() {
                parts.push(Part::Literal(literal.to_string()));
            }

            let name = name.as_str();
            let to_end = name == EXT_PLACEHOLDER;
            let body = if to_end { ".*" } else { r"[^\./]+" };
            if names.iter().any(|seen| seen == name) {
                pattern.push_str(&format!("(?P<__repeat{repeats}>{body})"));
                parts.push(Part::Repeat(name.to_string()));
                repeats += 1;
            } else {
                pattern.push_str(&format!("(?P<{name}>{body})"));
                parts.push(Part::Field {
                    name: name.to_string(),
                    to_end,
                });
                names.push(name.to_string());
            }
            last = whole.end();
        }
        let literal = &template[last..];
        pattern.push_str(&regex::escape(literal));
        if !literal.is_empty() {
            parts.push(Part::Literal(literal.to_string()));
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|source| KeyflowError::InvalidTemplate {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            names,
            parts,
            has_repeats: repeats > 0,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The generated regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Placeholder names in order of first appearance
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match `text` and return the value of every placeholder
    ///
    /// The leftmost match wins; at one start position longer field values are
    /// tried before shorter ones.
    pub fn captures(&self, text: &str) -> Option<BTreeMap<String, String>> {
        if !self.has_repeats {
            let caps = self.regex.captures(text)?;
            return Some(
                self.names
                    .iter()
                    .filter_map(|name| {
                        caps.name(name)
                            .map(|m| (name.clone(), m.as_str().to_string()))
                    })
                    .collect(),
            );
        }

        if !self.regex.is_match(text) {
            return None;
        }
        let mut found = Vec::with_capacity(self.names.len());
        text.char_indices()
            .map(|(at, _)| at)
            .chain(std::iter::once(text.len()))
            .find(|&start| {
                found.clear();
                match_parts(&self.parts, text, start, &mut found)
            })?;
        Some(
            found
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        )
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.captures(text).is_some()
    }
}

/// Match `parts` against `text` from `pos` to the end, pushing first-occurrence
/// captures onto `found`
fn match_parts<'a>(
    parts: &'a [Part],
    text: &'a str,
    pos: usize,
    found: &mut Vec<(&'a str, &'a str)>,
) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return pos == text.len();
    };
    let tail = &text[pos..];

    match part {
        Part::Literal(literal) => {
            tail.starts_with(literal.as_str())
                && match_parts(rest, text, pos + literal.len(), found)
        }
        Part::Repeat(name) => {
            let Some(&(_, value)) = found.iter().find(|(n, _)| *n == name.as_str()) else {
                return false;
            };
            tail.starts_with(value) && match_parts(rest, text, pos + value.len(), found)
        }
        Part::Field { name, to_end } => {
            let limit = if *to_end {
                tail.len()
            } else {
                tail.find(|c: char| c == '.' || c == '/').unwrap_or(tail.len())
            };
            let mut ends: Vec<usize> = tail[..limit]
                .char_indices()
                .map(|(at, c)| at + c.len_utf8())
                .collect();
            if *to_end {
                ends.insert(0, 0);
            }
            for end in ends.into_iter().rev() {
                found.push((name.as_str(), &tail[..end]));
                if match_parts(rest, text, pos + end, found) {
                    return true;
                }
                found.pop();
            }
            false
        }
    }
}

/// Compile a template, reusing a previous compilation of the same string
pub fn compile_template(template: &str) -> Result<Arc<TemplateRegex>> {
    let mut cache = TEMPLATE_CACHE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(compiled) = cache.get(template) {
        return Ok(Arc::clone(compiled));
    }
    let compiled = Arc::new(TemplateRegex::new(template)?);
    cache.put(template.to_string(), Arc::clone(&compiled));
    Ok(compiled)
}

/// Replace every `{name}` that has a value; others are kept verbatim
pub fn substitute(template: &str, values: &BTreeMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
