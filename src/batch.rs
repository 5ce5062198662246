// src/batch.rs

//! Batch conversion of deck files
//!
//! A batch is planned up front: output paths are derived or matched to the
//! inputs and checked for duplicates. Any problem there aborts the whole run
//! before a single file is touched.
//!
//! Once planned, every file is converted as an independent task on the rayon
//! pool. A failing file is logged to its own sink and recorded in the report;
//! it never stops the other files.

use rayon::prelude::*;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::deck::{JsonDefaults, SourceFormat, render_toml};
use crate::error::{Error, Result};
use crate::logging::{FileLog, LogRegistry};

/// Extension of every converted file
pub const OUTPUT_EXTENSION: &str = "toml";

/// Options shared by every file in a batch
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Explicit output paths, one per input; derived when empty
    pub outputs: Vec<PathBuf>,
    /// Directory for derived outputs; ignored when `outputs` is given
    pub parent: Option<PathBuf>,
    /// Replace output files that already exist
    pub overwrite: bool,
    /// Default flag rule for JSON decks
    pub json_defaults: JsonDefaults,
}

/// One input and where its conversion goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// What a successful conversion produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub format: SourceFormat,
    pub plain_decks: usize,
    pub special_decks: usize,
}

/// Result of converting one file
#[derive(Debug)]
pub struct FileOutcome {
    pub job: FileJob,
    pub result: Result<ConvertSummary>,
}

/// Per-file results of a finished batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

/// A validated set of conversions, ready to run
#[derive(Debug, Clone)]
pub struct BatchPlan {
    jobs: Vec<FileJob>,
    overwrite: bool,
    json_defaults: JsonDefaults,
}

impl BatchPlan {
    /// Pair inputs with outputs and validate the pairing
    pub fn new(inputs: &[PathBuf], options: &BatchOptions) -> Result<Self> {
        if let Some(parent) = &options.parent {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io("create directory", parent, e))?;
        }

        let outputs: Vec<PathBuf> = if options.outputs.is_empty() {
            inputs
                .iter()
                .map(|input| derive_output(input, options.parent.as_deref()))
                .collect()
        } else {
            options.outputs.clone()
        };

        if outputs.len() != inputs.len() {
            return Err(Error::OutputCountMismatch {
                outputs: outputs.len(),
                inputs: inputs.len(),
            });
        }

        let mut seen_inputs = HashSet::new();
        for input in inputs {
            if !seen_inputs.insert(absolute(input)) {
                return Err(Error::DuplicateInput(input.clone()));
            }
        }

        let mut seen_outputs = HashSet::new();
        for output in &outputs {
            if !seen_outputs.insert(absolute(output)) {
                return Err(Error::DuplicateOutput(output.clone()));
            }
        }

        let jobs = inputs
            .iter()
            .cloned()
            .zip(outputs)
            .map(|(input, output)| FileJob { input, output })
            .collect();

        Ok(Self {
            jobs,
            overwrite: options.overwrite,
            json_defaults: options.json_defaults,
        })
    }

    pub fn jobs(&self) -> &[FileJob] {
        &self.jobs
    }

    /// Convert every file concurrently and wait for all of them
    pub fn run(&self, registry: &LogRegistry) -> BatchReport {
        let outcomes = self
            .jobs
            .par_iter()
            .map(|job| {
                let log = registry.get_or_create(&job.input.display().to_string());
                let result = convert_file(job, self.overwrite, self.json_defaults, &log);
                match &result {
                    Ok(_) => log.info(format!("finished converting into {:?}", job.output)),
                    Err(e) => log.error(e.to_string()),
                }
                FileOutcome {
                    job: job.clone(),
                    result,
                }
            })
            .collect();

        BatchReport { outcomes }
    }
}

/// Output path for an input: same stem with a `.toml` extension, placed
/// in `parent` if given, next to the input otherwise
pub fn derive_output(input: &Path, parent: Option<&Path>) -> PathBuf {
    let mut file_name = input.file_stem().map(OsString::from).unwrap_or_default();
    file_name.push(".");
    file_name.push(OUTPUT_EXTENSION);

    match parent {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Run the read, classify, render and write pipeline for one file
///
/// The output file is created only once rendering has succeeded.
pub fn convert_file(
    job: &FileJob,
    overwrite: bool,
    json_defaults: JsonDefaults,
    log: &FileLog,
) -> Result<ConvertSummary> {
    if absolute(&job.input) == absolute(&job.output) {
        return Err(Error::SameInputOutput(job.output.clone()));
    }

    let format = SourceFormat::from_path(&job.input)?;
    debug!("Converting {} as {:?}", job.input.display(), format);

    let bytes = fs::read(&job.input).map_err(|e| Error::io("open input", &job.input, e))?;
    let doc = format.convert(&bytes, json_defaults, log)?;
    let rendered = render_toml(&doc)?;

    let mut open = OpenOptions::new();
    open.write(true);
    if overwrite {
        open.create(true).truncate(true);
    } else {
        open.create_new(true);
    }
    let mut file = open
        .open(&job.output)
        .map_err(|e| Error::io("open output", &job.output, e))?;
    file.write_all(rendered.as_bytes())
        .map_err(|e| Error::io("write output", &job.output, e))?;

    Ok(ConvertSummary {
        format,
        plain_decks: doc.decks.len(),
        special_decks: doc.special_decks.len(),
    })
}

/// Resolve a path for duplicate checks; falls back to a lexical absolute
/// path when the file does not exist yet
fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_derive_output() {
        assert_eq!(
            derive_output(Path::new("decks/tavern.json"), None),
            PathBuf::from("decks/tavern.toml")
        );
        assert_eq!(
            derive_output(Path::new("decks/tavern.v2.yaml"), Some(Path::new("out"))),
            PathBuf::from("out/tavern.v2.toml")
        );
        assert_eq!(
            derive_output(Path::new("plain"), None),
            PathBuf::from("plain.toml")
        );
    }

    #[test]
    fn test_plan_rejects_count_mismatch() {
        let options = BatchOptions {
            outputs: vec![PathBuf::from("a.toml")],
            ..Default::default()
        };
        let err = BatchPlan::new(&[PathBuf::from("a.json"), PathBuf::from("b.json")], &options)
            .unwrap_err();
        assert!(matches!(err, Error::OutputCountMismatch { outputs: 1, inputs: 2 }));
    }

    #[test]
    fn test_plan_rejects_duplicate_inputs() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "deck.json", "{}");
        let again = dir.path().join(".").join("deck.json");

        let err = BatchPlan::new(&[input, again], &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateInput(_)));
    }

    #[test]
    fn test_plan_rejects_duplicate_outputs() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "deck.json", "{}");
        let b = write(&dir, "deck.yaml", "{}");

        let err = BatchPlan::new(&[a, b], &BatchOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DuplicateOutput(_)));
    }

    #[test]
    fn test_plan_creates_parent() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "deck.json", "{}");
        let parent = dir.path().join("nested").join("out");
        let options = BatchOptions {
            parent: Some(parent.clone()),
            ..Default::default()
        };

        let plan = BatchPlan::new(&[input], &options).unwrap();
        assert!(parent.is_dir());
        assert_eq!(plan.jobs()[0].output, parent.join("deck.toml"));
    }

    #[test]
    fn test_convert_refuses_existing_output() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "deck.json", r#"{"a": ["x"]}"#);
        let output = write(&dir, "deck.toml", "keep me");
        let job = FileJob { input, output: output.clone() };
        let log = FileLog::new("deck.json");

        let err = convert_file(&job, false, JsonDefaults::default(), &log).unwrap_err();
        assert!(matches!(err, Error::Io { action: "open output", .. }));
        assert_eq!(fs::read_to_string(&output).unwrap(), "keep me");

        let summary = convert_file(&job, true, JsonDefaults::default(), &log).unwrap();
        assert_eq!(summary.plain_decks, 1);
        assert!(fs::read_to_string(&output).unwrap().contains("[decks]"));
    }

    #[test]
    fn test_convert_same_input_output() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "deck.json", "{}");
        let job = FileJob {
            input: input.clone(),
            output: input,
        };

        let err = convert_file(&job, true, JsonDefaults::default(), &FileLog::new("x")).unwrap_err();
        assert!(matches!(err, Error::SameInputOutput(_)));
    }

    #[test]
    fn test_parse_failure_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let input = write(&dir, "broken.yaml", "a: [b\n");
        let output = dir.path().join("broken.toml");
        let job = FileJob {
            input,
            output: output.clone(),
        };

        assert!(convert_file(&job, false, JsonDefaults::default(), &FileLog::new("x")).is_err());
        assert!(!output.exists());
    }
}
