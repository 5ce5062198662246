// src/deck/mod.rs

//! Deck model and source-format classifiers
//!
//! A deck file is a set of named text-roll tables ("decks") plus some
//! metadata. Two source dialects exist, each with its own rules for which
//! fields are metadata and which decks are exported or visible:
//!
//! - [`json`] - JSON with comments, metadata fields prefixed with `_`
//! - [`yaml`] - YAML, plain metadata names and a `command`/`default` pair
//!
//! Both produce the same [`OutputDocument`], which [`render`] writes as TOML:
//!
//! ```toml
//! [meta]
//! title = "Tavern"
//! author = "someone"
//!
//! [decks]
//! drinks = [
//!     "ale",
//!     "mead",
//! ]
//!
//! [_secret]
//! export = true
//! visible = true
//! options = [
//!     "...",
//! ]
//! ```
//!
//! Deck names keep their `_`/`__` prefixes in the output; the prefix only
//! decides which bucket a deck lands in.

pub mod json;
pub mod render;
pub mod yaml;

pub use json::{JsonDeck, JsonDefaults};
pub use render::render_toml;
pub use yaml::YamlDeck;

use chrono::{DateTime, FixedOffset};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::document::GenericDocument;
use crate::error::{Error, Result};
use crate::logging::FileLog;

/// Table holding the metadata in the TOML output
pub const META_SECTION: &str = "meta";
/// Table holding the plain decks in the TOML output
pub const DECKS_SECTION: &str = "decks";

/// Metadata section of a converted deck file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    /// Set when exactly one author was given
    pub author: Option<String>,
    /// Set when two or more authors were given
    pub authors: Vec<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub update_date: Option<DateTime<FixedOffset>>,
    pub desc: Option<String>,
    pub update_urls: Vec<String>,
    pub etag: Option<String>,
}

impl Metadata {
    /// Apply a list of author tokens: one becomes `author`, more become `authors`
    pub fn set_authors(&mut self, tokens: &[String]) {
        match tokens {
            [] => {}
            [single] => {
                self.author = Some(single.clone());
                self.authors.clear();
            }
            many => {
                self.author = None;
                self.authors = many.to_vec();
            }
        }
    }
}

/// A deck carrying explicit export/visible flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialDeck {
    pub export: bool,
    pub visible: bool,
    pub options: Vec<String>,
}

/// Which output bucket a deck was placed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Plain,
    Special,
}

/// The canonical converted deck file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    pub meta: Metadata,
    /// Plain decks: name to options
    pub decks: BTreeMap<String, Vec<String>>,
    /// Special decks: name to flagged options
    pub special_decks: BTreeMap<String, SpecialDeck>,
}

impl OutputDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a deck in the plain bucket, copying its options
    pub fn insert_plain(&mut self, name: &str, options: &[String]) {
        self.special_decks.remove(name);
        self.decks.insert(name.to_string(), options.to_vec());
    }

    /// Place a deck in the special bucket, copying its options
    pub fn insert_special(&mut self, name: &str, export: bool, visible: bool, options: &[String]) {
        self.decks.remove(name);
        self.special_decks.insert(
            name.to_string(),
            SpecialDeck {
                export,
                visible,
                options: options.to_vec(),
            },
        );
    }

    /// Bucket holding `name`, if the deck exists
    pub fn bucket_of(&self, name: &str) -> Option<Bucket> {
        if self.decks.contains_key(name) {
            Some(Bucket::Plain)
        } else if self.special_decks.contains_key(name) {
            Some(Bucket::Special)
        } else {
            None
        }
    }

    /// Total number of decks across both buckets
    pub fn deck_count(&self) -> usize {
        self.decks.len() + self.special_decks.len()
    }

    /// Drop special decks whose name is taken by an output section
    ///
    /// A special deck renders as a top-level table, so one named `meta` or
    /// `decks` would redefine that section.
    pub fn drop_section_clashes(&mut self, log: &FileLog) {
        for section in [META_SECTION, DECKS_SECTION] {
            if self.special_decks.remove(section).is_some() {
                log.warn(format!(
                    "special deck {:?} clashes with the [{}] section, skipped",
                    section, section
                ));
            }
        }
    }
}

/// A set of deck names with one flag (export or visible) turned on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet(BTreeSet<String>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing the names accepted by `keep`
    pub fn from_names<'a, I, F>(names: I, keep: F) -> Self
    where
        I: IntoIterator<Item = &'a str>,
        F: Fn(&str) -> bool,
    {
        Self(
            names
                .into_iter()
                .filter(|name| keep(name))
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Add every name from `other`
    pub fn extend_from(&mut self, other: &FlagSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FlagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Names starting with `_` are hidden by default
pub(crate) fn has_single_prefix(name: &str) -> bool {
    name.starts_with('_')
}

/// Names starting with `__` are internal
pub(crate) fn has_double_prefix(name: &str) -> bool {
    name.starts_with("__")
}

/// Turns a generic document into the canonical output
///
/// Implementations are pure: the same document always classifies to the
/// same output, and recoverable problems go to `log` instead of failing.
pub trait DeckClassifier {
    fn classify(&self, doc: &GenericDocument, log: &FileLog) -> OutputDocument;
}

/// Decodes source bytes into a generic document
pub trait DeckReader {
    fn read(&self, bytes: &[u8], log: &FileLog) -> Result<GenericDocument>;
}

/// Source dialect of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Pick the dialect from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        match ext {
            "json" | "jsonc" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ if ext.is_empty() => Err(Error::UnsupportedExtension(String::new())),
            _ => Err(Error::UnsupportedExtension(format!(".{}", ext))),
        }
    }

    /// Read, then classify, one file's bytes
    pub fn convert(
        self,
        bytes: &[u8],
        json_defaults: JsonDefaults,
        log: &FileLog,
    ) -> Result<OutputDocument> {
        let mut out = match self {
            Self::Json => {
                let deck = JsonDeck::new(json_defaults);
                let doc = deck.read(bytes, log)?;
                deck.classify(&doc, log)
            }
            Self::Yaml => {
                let deck = YamlDeck;
                let doc = deck.read(bytes, log)?;
                deck.classify(&doc, log)
            }
        };
        out.drop_section_clashes(log);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_author_collapse() {
        let mut meta = Metadata::default();
        meta.set_authors(&[]);
        assert_eq!(meta.author, None);
        assert!(meta.authors.is_empty());

        let mut meta = Metadata::default();
        meta.set_authors(&tokens(&["solo"]));
        assert_eq!(meta.author.as_deref(), Some("solo"));
        assert!(meta.authors.is_empty());

        let mut meta = Metadata::default();
        meta.set_authors(&tokens(&["b", "a", "c"]));
        assert_eq!(meta.author, None);
        assert_eq!(meta.authors, tokens(&["b", "a", "c"]));
    }

    #[test]
    fn test_buckets_are_exclusive() {
        let mut out = OutputDocument::new();
        out.insert_plain("x", &tokens(&["1"]));
        out.insert_special("x", false, false, &tokens(&["2"]));

        assert_eq!(out.bucket_of("x"), Some(Bucket::Special));
        assert_eq!(out.deck_count(), 1);
        assert_eq!(out.bucket_of("y"), None);
    }

    #[test]
    fn test_section_named_special_deck_is_dropped() {
        let yaml = b"command: roll\ndefault: [a]\ndecks: [x]\nmeta: [y]\n__meta: [z]\n";
        let log = FileLog::new("clash.yaml");
        let out = SourceFormat::Yaml
            .convert(yaml, JsonDefaults::default(), &log)
            .unwrap();

        assert_eq!(out.bucket_of("decks"), None);
        assert_eq!(out.bucket_of("meta"), None);
        assert_eq!(out.bucket_of("roll"), Some(Bucket::Plain));
        assert_eq!(out.bucket_of("__meta"), Some(Bucket::Plain));
        let warnings = log.messages_at(crate::logging::Level::Warn);
        assert!(warnings.iter().any(|w| w.contains("[decks] section")));
        assert!(warnings.iter().any(|w| w.contains("[meta] section")));

        let rendered = render_toml(&out).unwrap();
        let parsed: toml::Table = rendered.parse().unwrap();
        assert!(parsed["meta"].get("export").is_none());
        assert_eq!(parsed["decks"]["roll"][0].as_str(), Some("a"));
        assert_eq!(parsed["decks"]["__meta"][0].as_str(), Some("z"));
    }

    #[test]
    fn test_source_format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a/b.json")).unwrap(), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("b.jsonc")).unwrap(), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path(Path::new("b.yaml")).unwrap(), SourceFormat::Yaml);
        assert_eq!(SourceFormat::from_path(Path::new("b.yml")).unwrap(), SourceFormat::Yaml);

        let err = SourceFormat::from_path(Path::new("notes.txt")).unwrap_err();
        assert_eq!(err.to_string(), "unsupported file extension: \".txt\"");
        assert!(SourceFormat::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_flag_set_from_names() {
        let names = tokens(&["a", "_b", "__c"]);
        let set = FlagSet::from_names(names.iter().map(String::as_str), |n| !has_single_prefix(n));
        assert!(set.contains("a"));
        assert!(!set.contains("_b"));
        assert_eq!(set.len(), 1);

        let mut merged: FlagSet = ["x"].into_iter().collect();
        merged.extend_from(&set);
        assert_eq!(merged.len(), 2);
    }
}
