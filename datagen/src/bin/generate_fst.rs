//! Compiles a lexicon of `lemma: form1+CAT1+CAT2, form2+CAT1` lines into an FST
use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use morph::logger::init_cli_logger;
use tracing::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Lexicon to compile
    input_file: PathBuf,

    /// Where to write the FST, in OpenFst binary format
    output_fst_file: PathBuf,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_cli_logger(args.verbose);

    match morph::generate_fst(&args.input_file, &args.output_fst_file) {
        Ok(fst) => {
            info!("{} states, {} arcs", fst.num_states(), fst.num_arcs());
            println!("FST saved to {}", args.output_fst_file.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
