// src/lib.rs

//! Deck Converter
//!
//! Converts dice-roll deck files from the JSON and YAML dialects into the
//! canonical TOML deck format.
//!
//! # Architecture
//!
//! - Readers decode each dialect into a flat [`GenericDocument`]
//! - Classifiers split metadata from decks and decide each deck's
//!   export/visible flags, producing an [`OutputDocument`]
//! - [`deck::render_toml`] writes the output document as TOML
//! - [`batch`] runs one independent conversion per input file in parallel

pub mod batch;
pub mod cli;
pub mod date;
pub mod deck;
pub mod document;
mod error;
pub mod logging;

pub use batch::{BatchOptions, BatchPlan, BatchReport, FileJob, FileOutcome};
pub use deck::{
    Bucket, DeckClassifier, DeckReader, FlagSet, JsonDeck, JsonDefaults, Metadata,
    OutputDocument, SourceFormat, SpecialDeck, YamlDeck,
};
pub use document::{GenericDocument, GenericValue};
pub use error::{Error, Result};
pub use logging::{FileLog, LogRegistry};
