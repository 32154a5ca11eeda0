//! Realizes the morphology of a lemma, or analyzes an existing word.
//!
//! Reads `morph.fst`, generating it from a `morph.txt` lexicon first if needed:
//!
//! ```text
//! srt_realize estar+PLU+IND+PRES+1P
//! Output: estamos
//! ```
use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use morph::{Error, Query, Transducer, logger::init_cli_logger};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// WORD+CAT1+CAT2+...+CATN, or a surface form with --analyze
    query: String,

    /// The transducer to query
    #[arg(short, long, default_value = "morph.fst")]
    fst: PathBuf,

    /// Lexicon used to generate the transducer when it does not exist yet
    #[arg(short, long, default_value = "morph.txt")]
    lexicon: PathBuf,

    /// Treat the query as a surface form and print its analyses
    #[arg(short, long)]
    analyze: bool,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Args) -> Result<Vec<String>, Error> {
    let fst = if args.fst.is_file() {
        Transducer::load(&args.fst)?
    } else {
        println!("FST file not found. Generating from input file...");
        morph::generate_fst(&args.lexicon, &args.fst)?
    };

    if args.analyze {
        let analyses = fst.analyze(&args.query)?;
        debug!("{} analyses for {}", analyses.len(), args.query);
        return Ok(analyses
            .iter()
            .map(|q| format!("Analysis: {q}"))
            .collect());
    }

    let query = Query::parse(&args.query)?;
    Ok(fst
        .realize(&query)?
        .into_iter()
        .map(|form| format!("Output: {form}"))
        .collect())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_cli_logger(args.verbose);

    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
