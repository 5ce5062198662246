// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("deck-converter")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Deck Converter Contributors")
        .about("Convert JSON and YAML deck files into TOML deck files")
        .arg(
            Arg::new("inputs")
                .value_name("INPUT")
                .required(true)
                .num_args(1..)
                .help("Deck files to convert (.json, .jsonc, .yaml, .yml)"),
        )
        .arg(
            Arg::new("outputs")
                .short('o')
                .long("output")
                .value_name("OUTPUT")
                .action(ArgAction::Append)
                .help("Output files, one per input; defaults to <input>.toml"),
        )
        .arg(
            Arg::new("parent")
                .short('p')
                .long("parent")
                .value_name("DIR")
                .help("Output parent directory, ignored if -o is given"),
        )
        .arg(
            Arg::new("overwrite")
                .short('O')
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Overwrite output files that already exist"),
        )
        .arg(
            Arg::new("json_defaults")
                .long("json-defaults")
                .value_parser(["underscore-hidden", "export-all"])
                .default_value("underscore-hidden")
                .help("Flag rule for JSON decks that list neither `_keys` nor `_export`"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Man page goes to OUT_DIR
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("deck-converter.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
