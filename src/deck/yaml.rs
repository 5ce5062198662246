// src/deck/yaml.rs

//! YAML deck files
//!
//! Metadata uses plain field names (`name`, `author`, `version`, `license`,
//! `desc`). A `command` string together with a `default` list defines the
//! one exported deck, named after the command; when that pair is absent every
//! deck is exported. `info` and `include` are recognised and ignored.
//!
//! There is no separate visibility rule here: a deck is plain when it is
//! exported and has no `__` prefix, or is unexported and has one. Anything
//! else becomes a special deck whose `export` and `visible` flags are equal.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::{DeckClassifier, DeckReader, FlagSet, OutputDocument, has_double_prefix};
use crate::document::{GenericDocument, GenericValue, yaml_kind};
use crate::error::{Error, Result};
use crate::logging::FileLog;

const META_TITLE: &str = "name";
const META_AUTHOR: &str = "author";
const META_VERSION: &str = "version";
const META_COMMAND: &str = "command";
const META_LICENSE: &str = "license";
const META_DESC: &str = "desc";
const META_INFO: &str = "info";
const META_INCLUDE: &str = "include";
const META_DEFAULT: &str = "default";

/// Reader and classifier for YAML deck files
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDeck;

impl DeckReader for YamlDeck {
    fn read(&self, bytes: &[u8], log: &FileLog) -> Result<GenericDocument> {
        // Only the first document of a multi-document stream is read
        let mut documents = serde_yaml::Deserializer::from_slice(bytes);
        let value = match documents.next() {
            Some(document) => serde_yaml::Value::deserialize(document)?,
            None => serde_yaml::Value::Null,
        };
        if documents.next().is_some() {
            log.warn("YAML stream has more than one document, only the first is read");
        }

        match value {
            serde_yaml::Value::Mapping(mapping) => {
                Ok(GenericDocument::from_yaml_mapping(&mapping, log))
            }
            other => Err(Error::NotAMapping {
                format: "YAML",
                found: yaml_kind(&other),
            }),
        }
    }
}

impl DeckClassifier for YamlDeck {
    fn classify(&self, doc: &GenericDocument, log: &FileLog) -> OutputDocument {
        let mut out = OutputDocument::new();
        let mut decks: BTreeMap<&str, &[String]> = BTreeMap::new();
        let mut command_deck: Option<(&str, &[String])> = None;

        for (key, value) in doc.iter() {
            match key {
                META_TITLE => {
                    if let Some(s) = expect_string(key, value, log) {
                        out.meta.title = s.to_string();
                    }
                }
                META_AUTHOR => {
                    if let Some(s) = expect_string(key, value, log) {
                        out.meta.author = Some(s.to_string());
                    }
                }
                META_VERSION => match value.as_integer() {
                    Some(v) => out.meta.version = Some(v.to_string()),
                    None => warn_invalid(key, value, log),
                },
                META_LICENSE => {
                    if let Some(s) = expect_string(key, value, log) {
                        out.meta.license = Some(s.to_string());
                    }
                }
                META_DESC => {
                    if let Some(s) = expect_string(key, value, log) {
                        out.meta.desc = Some(s.to_string());
                    }
                }
                // `command` is only read alongside `default`
                META_COMMAND | META_INFO | META_INCLUDE => {}
                META_DEFAULT => command_deck = command_deck_of(doc, value, log),
                _ => {
                    if let Some(options) = expect_options(key, value, log) {
                        decks.insert(key, options);
                    }
                }
            }
        }

        let export = match command_deck {
            Some((command, options)) => {
                decks.insert(command, options);
                let mut export = FlagSet::new();
                export.insert(command);
                export
            }
            None => FlagSet::from_names(decks.keys().copied(), |_| true),
        };

        for (name, options) in decks {
            let exported = export.contains(name);
            if exported == !has_double_prefix(name) {
                out.insert_plain(name, options);
            } else {
                out.insert_special(name, exported, exported, options);
            }
        }

        out
    }
}

/// The deck synthesised from `default`, named by `command`
fn command_deck_of<'a>(
    doc: &'a GenericDocument,
    default: &'a GenericValue,
    log: &FileLog,
) -> Option<(&'a str, &'a [String])> {
    let Some(command) = doc.get(META_COMMAND) else {
        log.warn(format!(
            "YAML field {:?} is defined but {:?} is missing",
            META_DEFAULT, META_COMMAND
        ));
        return None;
    };

    let name = expect_string(META_COMMAND, command, log)?;
    if name.is_empty() {
        return None;
    }
    let options = expect_options(META_DEFAULT, default, log)?;
    Some((name, options))
}

fn expect_string<'a>(key: &str, value: &'a GenericValue, log: &FileLog) -> Option<&'a str> {
    let s = value.as_str();
    if s.is_none() {
        warn_invalid(key, value, log);
    }
    s
}

/// Options of a deck field; empty lists are not decks
fn expect_options<'a>(key: &str, value: &'a GenericValue, log: &FileLog) -> Option<&'a [String]> {
    match value.as_list() {
        Some([]) => None,
        Some(options) => Some(options),
        None => {
            warn_invalid(key, value, log);
            None
        }
    }
}

fn warn_invalid(key: &str, value: &GenericValue, log: &FileLog) {
    log.warn(format!(
        "YAML field {:?} has invalid type {}",
        key,
        value.kind()
    ));
}
