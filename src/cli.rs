// src/cli.rs
//! CLI definitions for the deck converter

use clap::Parser;
use std::path::PathBuf;

use crate::batch::BatchOptions;
use crate::deck::JsonDefaults;

#[derive(Parser, Debug)]
#[command(name = "deck-converter")]
#[command(author = "Deck Converter Contributors")]
#[command(version)]
#[command(about = "Convert JSON and YAML deck files into TOML deck files", long_about = None)]
pub struct Cli {
    /// Deck files to convert (.json, .jsonc, .yaml, .yml)
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output files. Must be empty or of the same number as the inputs.
    /// If empty, <input>.toml is used for each input file.
    #[arg(short, long = "output", value_name = "OUTPUT")]
    pub outputs: Vec<PathBuf>,

    /// Output parent directory, ignored if -o is given. If unset, each
    /// output is written next to its input.
    #[arg(short, long, value_name = "DIR")]
    pub parent: Option<PathBuf>,

    /// Overwrite output files that already exist
    #[arg(short = 'O', long)]
    pub overwrite: bool,

    /// Flag rule for JSON decks that list neither `_keys` nor `_export`
    #[arg(long, value_enum, default_value_t = JsonDefaults::UnderscoreHidden)]
    pub json_defaults: JsonDefaults,
}

impl Cli {
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            outputs: self.outputs.clone(),
            parent: self.parent.clone(),
            overwrite: self.overwrite,
            json_defaults: self.json_defaults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "deck-converter",
            "-O",
            "-o",
            "a.toml",
            "--output",
            "b.toml",
            "--json-defaults",
            "export-all",
            "a.json",
            "b.yaml",
        ])
        .unwrap();

        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.outputs, vec![PathBuf::from("a.toml"), PathBuf::from("b.toml")]);
        assert!(cli.overwrite);
        assert_eq!(cli.json_defaults, JsonDefaults::ExportAll);
        assert_eq!(cli.batch_options().outputs.len(), 2);
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["deck-converter"]).is_err());
        let cli = Cli::try_parse_from(["deck-converter", "-p", "out", "x.yml"]).unwrap();
        assert_eq!(cli.parent, Some(PathBuf::from("out")));
        assert_eq!(cli.json_defaults, JsonDefaults::UnderscoreHidden);
    }
}
