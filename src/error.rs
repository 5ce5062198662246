// src/error.rs

//! Error types for deck conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type for deck conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while converting deck files
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the input or writing the output failed
    #[error("failed to {action} file {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON source could not be decoded
    #[error("failed to parse JSON data: {0}")]
    Json(#[from] json5::Error),

    /// YAML source could not be decoded
    #[error("failed to unmarshal YAML data: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Source decoded, but the top level is not a key/value mapping
    #[error("{format} document is not a mapping (found {found})")]
    NotAMapping {
        format: &'static str,
        found: &'static str,
    },

    /// TOML output could not be encoded
    #[error("failed to encode TOML data: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Input extension has no reader
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    /// Output path is the input path
    #[error("output file {0:?} is the same as input file")]
    SameInputOutput(PathBuf),

    /// `-o` given with the wrong number of files
    #[error(
        "number of output files ({outputs}) is different from number of input files ({inputs})"
    )]
    OutputCountMismatch { outputs: usize, inputs: usize },

    /// Two inputs resolve to the same absolute path
    #[error("detected duplication in input files: {0:?}")]
    DuplicateInput(PathBuf),

    /// Two inputs would be written to the same output
    #[error("detected duplication in output files: {0:?}")]
    DuplicateOutput(PathBuf),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
