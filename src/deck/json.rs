// src/deck/json.rs

//! JSON deck files
//!
//! Metadata lives in reserved fields prefixed with `_`, each holding a list
//! of string tokens. Two more reserved lists override the deck flags:
//! `_keys` names the visible decks and `_export`/`_exports` names the
//! exported ones. Every other field (except `$schema`) is a deck.
//!
//! Each deck then lands in exactly one bucket by a three-tier cascade:
//!
//! | tier | condition        | plain when              | otherwise special as  |
//! |------|------------------|-------------------------|-----------------------|
//! | 1    | visible          | no `_` prefix           | export, visible       |
//! | 2    | exported         | `_` but not `__` prefix | export, not visible   |
//! | 3    | neither          | `__` prefix             | not export/visible    |

use std::collections::BTreeMap;

use super::{
    DeckClassifier, DeckReader, FlagSet, OutputDocument, has_double_prefix, has_single_prefix,
};
use crate::date::parse_loose_date;
use crate::document::{GenericDocument, json_kind};
use crate::error::{Error, Result};
use crate::logging::FileLog;

const META_TITLE: &str = "_title";
const META_AUTHOR: &str = "_author";
const META_DATE: &str = "_date";
const META_UPDATE_DATE: &str = "_updateDate";
const META_BRIEF: &str = "_brief";
const META_VERSION: &str = "_version";
const META_LICENSE: &str = "_license";
const META_UPDATE_URLS: &str = "_updateUrls";
const META_ETAG: &str = "_etag";
const META_KEYS: &str = "_keys";
const META_EXPORT: &str = "_export";
const META_EXPORTS: &str = "_exports";
const META_SCHEMA: &str = "$schema";

/// Default flag rule used when a file does not name its exported decks
///
/// Deck collections were written against two revisions of the JSON schema,
/// which disagree on what an unlisted deck means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum JsonDefaults {
    /// Decks whose name starts with `_` are not exported
    #[default]
    UnderscoreHidden,
    /// Every deck is exported
    ExportAll,
}

impl JsonDefaults {
    fn default_export(self, names: &[&str]) -> FlagSet {
        match self {
            Self::UnderscoreHidden => {
                FlagSet::from_names(names.iter().copied(), |n| !has_single_prefix(n))
            }
            Self::ExportAll => FlagSet::from_names(names.iter().copied(), |_| true),
        }
    }
}

/// Reader and classifier for JSON deck files
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDeck {
    defaults: JsonDefaults,
}

impl JsonDeck {
    pub fn new(defaults: JsonDefaults) -> Self {
        Self { defaults }
    }
}

impl DeckReader for JsonDeck {
    /// Decode JSON, tolerating comments and trailing commas
    fn read(&self, bytes: &[u8], _log: &FileLog) -> Result<GenericDocument> {
        let text = String::from_utf8_lossy(bytes);
        let value: serde_json::Value = json5::from_str(&text)?;

        match value {
            serde_json::Value::Object(object) => Ok(GenericDocument::from_json_object(&object)),
            other => Err(Error::NotAMapping {
                format: "JSON",
                found: json_kind(&other),
            }),
        }
    }
}

impl DeckClassifier for JsonDeck {
    fn classify(&self, doc: &GenericDocument, log: &FileLog) -> OutputDocument {
        let mut out = OutputDocument::new();
        let mut decks: BTreeMap<&str, &[String]> = BTreeMap::new();
        let mut visible: Option<FlagSet> = None;
        let mut export: Option<FlagSet> = None;

        for (key, value) in doc.iter() {
            if key == META_SCHEMA {
                continue;
            }
            let Some(tokens) = value.as_list() else {
                log.warn(format!(
                    "JSON field {:?} has invalid type {}",
                    key,
                    value.kind()
                ));
                continue;
            };

            match key {
                META_TITLE => out.meta.title = tokens.join(" / "),
                META_AUTHOR => out.meta.set_authors(tokens),
                META_DATE => out.meta.date = parse_date_tokens(key, tokens, log),
                META_UPDATE_DATE => out.meta.update_date = parse_date_tokens(key, tokens, log),
                META_BRIEF => out.meta.desc = Some(tokens.join("\n")),
                META_VERSION => out.meta.version = Some(tokens.join(" / ")),
                META_LICENSE => out.meta.license = Some(tokens.join(" / ")),
                META_UPDATE_URLS => out.meta.update_urls = tokens.to_vec(),
                META_ETAG => {
                    if let Some(first) = tokens.first() {
                        out.meta.etag = Some(first.clone());
                    }
                }
                META_KEYS => visible = Some(tokens.iter().collect()),
                // Keys arrive sorted, so `_exports` replaces `_export`
                META_EXPORT | META_EXPORTS => export = Some(tokens.iter().collect()),
                _ => {
                    decks.insert(key, tokens);
                }
            }
        }

        let names: Vec<&str> = decks.keys().copied().collect();
        let (export, visible) = resolve_flags(export, visible, || {
            self.defaults.default_export(&names)
        });

        for (name, options) in decks {
            if visible.contains(name) {
                if !has_single_prefix(name) {
                    out.insert_plain(name, options);
                } else {
                    out.insert_special(name, true, true, options);
                }
            } else if export.contains(name) {
                if has_single_prefix(name) && !has_double_prefix(name) {
                    out.insert_plain(name, options);
                } else {
                    out.insert_special(name, true, false, options);
                }
            } else if has_double_prefix(name) {
                out.insert_plain(name, options);
            } else {
                out.insert_special(name, false, false, options);
            }
        }

        out
    }
}

/// Settle the export and visible sets from whichever overrides were given
///
/// Both given: the export set absorbs the visible names and both flags use
/// that merged set. Otherwise a missing export set comes from `default_export`
/// and a missing visible set copies the export set.
fn resolve_flags(
    export: Option<FlagSet>,
    visible: Option<FlagSet>,
    default_export: impl FnOnce() -> FlagSet,
) -> (FlagSet, FlagSet) {
    match (export, visible) {
        (Some(mut export), Some(visible)) => {
            export.extend_from(&visible);
            (export.clone(), export)
        }
        (Some(export), None) => (export.clone(), export),
        (None, Some(visible)) => (default_export(), visible),
        (None, None) => {
            let export = default_export();
            (export.clone(), export)
        }
    }
}

fn parse_date_tokens(
    key: &str,
    tokens: &[String],
    log: &FileLog,
) -> Option<chrono::DateTime<chrono::FixedOffset>> {
    let joined = tokens.join("/");
    let parsed = parse_loose_date(&joined);
    if parsed.is_none() {
        log.warn(format!(
            "JSON meta field {:?} is not a valid datetime: {:?}",
            key, joined
        ));
    }
    parsed
}
