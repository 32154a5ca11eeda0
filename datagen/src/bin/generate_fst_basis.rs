//! Generates an input file for generate_fst based on a spaCy model
use std::path::PathBuf;

use clap::Parser;
use datagen::basis::generate_basis;
use morph::logger::init_cli_logger;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input file path
    input: PathBuf,

    /// spaCy model name
    spacy_model: String,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), morph::Error> {
    let args = Args::parse();
    init_cli_logger(args.verbose);

    generate_basis(&args.input, &args.spacy_model)
}
