use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Missing lemma in entry on line {line}")]
    MissingLemma { line: usize },

    #[error("Missing forms in entry on line {line}")]
    MissingForms { line: usize },

    #[error("Unable to {action} FST {path:?}: {message}")]
    FstFile {
        action: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Malformed FST: {message}")]
    MalformedFst { message: String },

    /// rustfst reports failures through `anyhow`
    #[error(transparent)]
    Fst(#[from] anyhow::Error),

    #[error("Query is empty or malformed.")]
    EmptyQuery,

    #[error("No valid path for symbol: {symbol}")]
    NoPath { symbol: String },

    #[error("No valid path to a final state.")]
    NoFinalState,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn fst_file(action: &'static str, path: impl Into<PathBuf>, e: anyhow::Error) -> Self {
        Error::FstFile {
            action,
            path: path.into(),
            message: format!("{e:#}"),
        }
    }
}
