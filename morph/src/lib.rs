//! Morphological surface realization over a finite-state transducer

pub(crate) mod error;
pub mod lexicon;
pub mod logger;
pub mod query;
pub mod symbol;
pub mod transducer;

use std::path::Path;

use tracing::debug;

pub use crate::error::Error;
pub use crate::query::Query;
pub use crate::transducer::Transducer;

/// Compiles the lexicon at `input` and saves the transducer to `output`.
pub fn generate_fst(input: &Path, output: &Path) -> Result<Transducer, Error> {
    let entries = lexicon::read_lexicon(input)?;
    let fst = Transducer::from_entries(&entries)?;
    fst.save(output)?;
    debug!("Saved {} states to {output:?}", fst.num_states());
    Ok(fst)
}

/// Realizes a `lemma+CAT1+CAT2` query against the transducer saved at `fst_path`.
pub fn realize_query(fst_path: &Path, query: &str) -> Result<Vec<String>, Error> {
    let query = Query::parse(query)?;
    Transducer::load(fst_path)?.realize(&query)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn generate_then_realize() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = dir.path().join("morph.txt");
        let fst = dir.path().join("morph.fst");
        fs::write(&lexicon, "estar: estoy+SG+1P, estamos+PLU+1P\n").unwrap();

        generate_fst(&lexicon, &fst).unwrap();

        assert_eq!(
            vec!["estamos".to_string()],
            realize_query(&fst, "estar+PLU+1P").unwrap()
        );
    }

    #[test]
    fn realize_empty_query() {
        let dir = tempfile::tempdir().unwrap();
        // The query is checked before the FST is opened
        let fst = dir.path().join("morph.fst");
        assert!(matches!(realize_query(&fst, ""), Err(Error::EmptyQuery)));
    }

    #[test]
    fn generate_from_missing_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("morph.fst");
        assert!(matches!(
            generate_fst(&dir.path().join("morph.txt"), &output),
            Err(Error::Io { .. })
        ));
        assert!(!output.exists());
    }
}
