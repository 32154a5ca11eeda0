//! Morphology transducer over a rustfst `VectorFst`.
//!
//! The input side reads lemma characters followed by category tags, the output
//! side writes the surface form. Lexicon entries share input prefixes so the
//! input side is a trie; each surface form hangs off the state reached after the
//! last tag as a chain of epsilon-input arcs ending in a final state.
//!
//! Characters and tags share one symbol table, attached to both sides of the
//! FST when it is written so a saved file is self-describing.

use std::{cmp::max, fs, path::Path, sync::Arc};

use itertools::Itertools;
use rustfst::prelude::*;
use rustfst::{EPS_LABEL, Label, StateId, Trs};
use tracing::debug;

use crate::{Error, lexicon::Entry, query::Query, symbol::Symbol};

#[derive(Debug, Clone)]
pub struct Transducer {
    fst: VectorFst<TropicalWeight>,
    symbols: SymbolTable,
}

impl Default for Transducer {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    /// Read input labels, write output labels
    Down,
    /// Read output labels, write input labels
    Up,
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    state: StateId,
    pos: usize,
    // Consecutive arcs that consumed nothing
    eps_run: usize,
    // Last link of this path's output in the trail
    out: Option<usize>,
}

struct Paths {
    outputs: Vec<Vec<Label>>,
    furthest: usize,
}

fn unwind(trail: &[(Option<usize>, Label)], mut at: Option<usize>) -> Vec<Label> {
    let mut labels = Vec::new();
    while let Some(idx) = at {
        let (prev, label) = trail[idx];
        labels.push(label);
        at = prev;
    }
    labels.reverse();
    labels
}

/// Every path from the start state that consumes `input` exactly and ends final.
///
/// Depth-first with an explicit stack so long forms cannot exhaust the call
/// stack. A run of epsilon reads longer than the state count must revisit a
/// state, so such runs are cut there.
fn search(
    fst: &VectorFst<TropicalWeight>,
    input: &[Option<Label>],
    direction: Direction,
) -> Result<Paths, Error> {
    let mut paths = Paths {
        outputs: Vec::new(),
        furthest: 0,
    };
    let Some(start) = fst.start() else {
        return Ok(paths);
    };
    let eps_limit = fst.num_states();

    let mut trail: Vec<(Option<usize>, Label)> = Vec::new();
    let mut stack = vec![Frame {
        state: start,
        pos: 0,
        eps_run: 0,
        out: None,
    }];
    while let Some(frame) = stack.pop() {
        paths.furthest = max(paths.furthest, frame.pos);
        if frame.pos == input.len() && fst.is_final(frame.state)? {
            paths.outputs.push(unwind(&trail, frame.out));
        }

        let trs = fst.get_trs(frame.state)?;
        for tr in trs.trs() {
            let (read, write) = match direction {
                Direction::Down => (tr.ilabel, tr.olabel),
                Direction::Up => (tr.olabel, tr.ilabel),
            };
            let (pos, eps_run) = if read == EPS_LABEL {
                if frame.eps_run >= eps_limit {
                    continue;
                }
                (frame.pos, frame.eps_run + 1)
            } else if input.get(frame.pos) == Some(&Some(read)) {
                (frame.pos + 1, 0)
            } else {
                continue;
            };
            let out = if write == EPS_LABEL {
                frame.out
            } else {
                trail.push((frame.out, write));
                Some(trail.len() - 1)
            };
            stack.push(Frame {
                state: tr.nextstate,
                pos,
                eps_run,
                out,
            });
        }
    }
    Ok(paths)
}

impl Transducer {
    pub fn new() -> Self {
        Transducer {
            fst: VectorFst::new(),
            symbols: SymbolTable::new(),
        }
    }

    pub fn from_entries(entries: &[Entry]) -> Result<Self, Error> {
        let mut fst = Transducer::new();
        for entry in entries {
            for form in entry.forms.iter() {
                let query = Query {
                    lemma: entry.lemma.clone(),
                    tags: form.tags.clone(),
                };
                if !fst.insert(&query, &form.surface)? {
                    debug!("Duplicate transduction {query} => {}", form.surface);
                }
            }
        }
        debug!(
            "Built FST with {} states and {} arcs from {} entries",
            fst.num_states(),
            fst.num_arcs(),
            entries.len()
        );
        Ok(fst)
    }

    pub fn num_states(&self) -> usize {
        self.fst.num_states()
    }

    pub fn num_arcs(&self) -> usize {
        (0..self.fst.num_states())
            .map(|s| self.fst.num_trs(s as StateId).unwrap_or_default())
            .sum()
    }

    fn start(&mut self) -> Result<StateId, Error> {
        if let Some(start) = self.fst.start() {
            return Ok(start);
        }
        let start = self.fst.add_state();
        self.fst.set_start(start)?;
        Ok(start)
    }

    fn label(&mut self, symbol: &Symbol) -> Label {
        match symbol {
            Symbol::Epsilon => EPS_LABEL,
            s => self.symbols.add_symbol(s.to_string()),
        }
    }

    fn symbol(&self, label: Label) -> Result<Symbol, Error> {
        if label == EPS_LABEL {
            return Ok(Symbol::Epsilon);
        }
        self.symbols
            .get_symbol(label)
            .and_then(Symbol::parse)
            .ok_or_else(|| Error::MalformedFst {
                message: format!("label {label} has no symbol"),
            })
    }

    /// Adds an arc to a fresh state and returns that state.
    fn add_arc(&mut self, from: StateId, ilabel: Label, olabel: Label) -> Result<StateId, Error> {
        let next = self.fst.add_state();
        self.fst
            .add_tr(from, Tr::new(ilabel, olabel, TropicalWeight::one(), next))?;
        Ok(next)
    }

    /// Adds `query => surface`. Returns false if the transduction was already present.
    pub fn insert(&mut self, query: &Query, surface: &str) -> Result<bool, Error> {
        if self
            .realize(query)
            .is_ok_and(|forms| forms.iter().any(|f| f == surface))
        {
            return Ok(false);
        }

        let mut state = self.start()?;
        for symbol in query.symbols() {
            let label = self.label(&symbol);
            let trs = self.fst.get_trs(state)?;
            let existing = trs
                .trs()
                .iter()
                .find(|tr| tr.ilabel == label && tr.olabel == EPS_LABEL)
                .map(|tr| tr.nextstate);
            state = match existing {
                Some(next) => next,
                None => self.add_arc(state, label, EPS_LABEL)?,
            };
        }

        let mut outputs = surface
            .chars()
            .map(|c| self.label(&Symbol::Char(c)))
            .collect::<Vec<_>>();
        if outputs.is_empty() {
            outputs.push(EPS_LABEL);
        }
        for output in outputs {
            state = self.add_arc(state, EPS_LABEL, output)?;
        }
        self.fst.set_final(state, TropicalWeight::one())?;
        Ok(true)
    }

    /// Every surface form for `query`, sorted.
    pub fn realize(&self, query: &Query) -> Result<Vec<String>, Error> {
        let symbols = query.symbols().collect::<Vec<_>>();
        let input = symbols
            .iter()
            .map(|s| self.symbols.get_label(&s.to_string()))
            .collect::<Vec<_>>();
        let paths = search(&self.fst, &input, Direction::Down)?;
        if paths.outputs.is_empty() {
            return Err(match symbols.get(paths.furthest) {
                Some(symbol) => Error::NoPath {
                    symbol: symbol.to_string(),
                },
                None => Error::NoFinalState,
            });
        }

        let mut forms = Vec::with_capacity(paths.outputs.len());
        for labels in paths.outputs {
            let mut surface = String::new();
            for label in labels {
                match self.symbol(label)? {
                    Symbol::Epsilon => (),
                    Symbol::Char(c) => surface.push(c),
                    Symbol::Tag(name) => {
                        surface.push('+');
                        surface.push_str(&name);
                    }
                }
            }
            forms.push(surface);
        }
        Ok(forms.into_iter().sorted().dedup().collect())
    }

    /// Every lemma and tag sequence that realizes as `surface`, sorted.
    pub fn analyze(&self, surface: &str) -> Result<Vec<Query>, Error> {
        let input = surface
            .chars()
            .map(|c| self.symbols.get_label(&Symbol::Char(c).to_string()))
            .collect::<Vec<_>>();
        let paths = search(&self.fst, &input, Direction::Up)?;

        let mut analyses = Vec::with_capacity(paths.outputs.len());
        for labels in paths.outputs {
            let mut lemma = String::new();
            let mut tags = Vec::new();
            for label in labels {
                match self.symbol(label)? {
                    Symbol::Epsilon => (),
                    Symbol::Char(c) => lemma.push(c),
                    Symbol::Tag(name) => tags.push(name),
                }
            }
            analyses.push(Query {
                lemma: lemma.into(),
                tags,
            });
        }
        Ok(analyses.into_iter().sorted().dedup().collect())
    }

    /// Writes the FST in OpenFst binary format with the symbol table attached.
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let mut fst = self.fst.clone();
        let symbols = Arc::new(self.symbols.clone());
        fst.set_input_symbols(Arc::clone(&symbols));
        fst.set_output_symbols(symbols);
        fst.write(path)
            .map_err(|e| Error::fst_file("write", path, e))
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        fs::metadata(path).map_err(|e| Error::io(path, e))?;
        let fst = VectorFst::<TropicalWeight>::read(path)
            .map_err(|e| Error::fst_file("read", path, e))?;
        let Some(symbols) = fst.input_symbols().map(|s| s.as_ref().clone()) else {
            return Err(Error::MalformedFst {
                message: format!("{path:?} has no symbol table"),
            });
        };
        debug!(
            "Loaded FST with {} states from {path:?}",
            fst.num_states()
        );
        Ok(Transducer { fst, symbols })
    }
}

#[cfg(test)]
mod tests {
    use crate::lexicon::parse_lexicon;

    use super::*;

    const LEXICON: &str = "\
estar: estoy+SG+IND+PRES+1P, estamos+PLU+IND+PRES+1P, estás+SG+IND+PRES+2P
ser: soy+SG+IND+PRES+1P, somos+PLU+IND+PRES+1P
";

    fn spanish() -> Transducer {
        Transducer::from_entries(&parse_lexicon(LEXICON).unwrap()).unwrap()
    }

    fn realize(fst: &Transducer, query: &str) -> Result<Vec<String>, Error> {
        fst.realize(&Query::parse(query).unwrap())
    }

    #[test]
    fn realize_known_forms() {
        let fst = spanish();
        assert_eq!(vec!["estamos"], realize(&fst, "estar+PLU+IND+PRES+1P").unwrap());
        assert_eq!(vec!["estás"], realize(&fst, "estar+SG+IND+PRES+2P").unwrap());
        assert_eq!(vec!["soy"], realize(&fst, "ser+SG+IND+PRES+1P").unwrap());
    }

    #[test]
    fn unknown_symbol_names_the_symbol() {
        let fst = spanish();
        let err = realize(&fst, "estar+PLU+SUBJ").unwrap_err();
        assert!(
            matches!(&err, Error::NoPath { symbol } if symbol == "+SUBJ"),
            "{err:?}"
        );

        let err = realize(&fst, "ir+SG").unwrap_err();
        assert!(matches!(&err, Error::NoPath { symbol } if symbol == "i"), "{err:?}");
    }

    #[test]
    fn known_symbol_in_wrong_place() {
        let fst = spanish();
        let err = realize(&fst, "estar+IND").unwrap_err();
        assert!(
            matches!(&err, Error::NoPath { symbol } if symbol == "+IND"),
            "{err:?}"
        );
    }

    #[test]
    fn incomplete_query_has_no_final_state() {
        let fst = spanish();
        let err = realize(&fst, "estar+PLU").unwrap_err();
        assert!(matches!(err, Error::NoFinalState), "{err:?}");
    }

    #[test]
    fn empty_transducer_has_no_path() {
        let err = realize(&Transducer::new(), "ser+1P").unwrap_err();
        assert!(matches!(&err, Error::NoPath { symbol } if symbol == "s"), "{err:?}");
    }

    #[test]
    fn lemmas_share_prefixes() {
        let mut fst = Transducer::new();
        fst.insert(&Query::new("ab", &["X"]), "c").unwrap();
        let states = fst.num_states();
        fst.insert(&Query::new("ab", &["Y"]), "d").unwrap();
        // Only the +Y arc and the one output arc are new
        assert_eq!(states + 2, fst.num_states());
    }

    #[test]
    fn duplicate_insert_is_ignored() {
        let mut fst = Transducer::new();
        assert!(fst.insert(&Query::new("ser", &["1P"]), "soy").unwrap());
        let arcs = fst.num_arcs();
        assert!(!fst.insert(&Query::new("ser", &["1P"]), "soy").unwrap());
        assert_eq!(arcs, fst.num_arcs());
    }

    #[test]
    fn ambiguous_realizations_are_all_returned() {
        let mut fst = Transducer::new();
        fst.insert(&Query::new("haber", &["3P"]), "hay").unwrap();
        fst.insert(&Query::new("haber", &["3P"]), "ha").unwrap();
        assert_eq!(vec!["ha", "hay"], realize(&fst, "haber+3P").unwrap());
    }

    #[test]
    fn empty_surface_form() {
        let mut fst = Transducer::new();
        fst.insert(&Query::new("nada", &["NULL"]), "").unwrap();
        assert_eq!(vec![String::new()], realize(&fst, "nada+NULL").unwrap());
    }

    #[test]
    fn analyze_inverts_realize() {
        let fst = spanish();
        assert_eq!(
            vec![Query::new("ser", &["PLU", "IND", "PRES", "1P"])],
            fst.analyze("somos").unwrap()
        );
        assert!(fst.analyze("vamos").unwrap().is_empty());
    }

    #[test]
    fn analyze_syncretism() {
        let mut fst = Transducer::new();
        fst.insert(&Query::new("cantar", &["PRES", "1P", "PLU"]), "cantamos")
            .unwrap();
        fst.insert(&Query::new("cantar", &["PRET", "1P", "PLU"]), "cantamos")
            .unwrap();
        assert_eq!(
            vec![
                Query::new("cantar", &["PRES", "1P", "PLU"]),
                Query::new("cantar", &["PRET", "1P", "PLU"]),
            ],
            fst.analyze("cantamos").unwrap()
        );
    }

    #[test]
    fn epsilon_cycle_terminates() {
        let mut fst = Transducer::new();
        let start = fst.start().unwrap();
        let x = fst.label(&Symbol::Char('x'));
        let a = fst.add_arc(start, EPS_LABEL, x).unwrap();
        fst.fst
            .add_tr(a, Tr::new(EPS_LABEL, EPS_LABEL, TropicalWeight::one(), start))
            .unwrap();
        fst.fst.set_final(a, TropicalWeight::one()).unwrap();

        let empty = Query {
            lemma: Default::default(),
            tags: Vec::new(),
        };
        assert_eq!(vec!["x"], fst.realize(&empty).unwrap());
    }

    #[test]
    fn long_forms_do_not_recurse() {
        let surface = "a".repeat(200_000);
        let mut fst = Transducer::new();
        fst.insert(&Query::new("largo", &["X"]), &surface).unwrap();
        assert_eq!(vec![surface.clone()], realize(&fst, "largo+X").unwrap());
        assert_eq!(vec![Query::new("largo", &["X"])], fst.analyze(&surface).unwrap());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morph.fst");
        let fst = spanish();
        fst.save(&path).unwrap();

        let loaded = Transducer::load(&path).unwrap();
        assert_eq!(fst.num_states(), loaded.num_states());
        assert_eq!(fst.num_arcs(), loaded.num_arcs());
        assert_eq!(vec!["estás"], realize(&loaded, "estar+SG+IND+PRES+2P").unwrap());
        assert_eq!(
            vec![Query::new("ser", &["SG", "IND", "PRES", "1P"])],
            loaded.analyze("soy").unwrap()
        );
    }

    #[test]
    fn whitespace_in_tags_survives_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morph.fst");
        let fst = Transducer::from_entries(&parse_lexicon("ir: voy+A\tB, vamos+A B\n").unwrap())
            .unwrap();
        assert_eq!(vec!["voy"], realize(&fst, "ir+A\tB").unwrap());
        fst.save(&path).unwrap();

        let loaded = Transducer::load(&path).unwrap();
        assert_eq!(vec!["voy"], realize(&loaded, "ir+A\tB").unwrap());
        assert_eq!(vec!["vamos"], realize(&loaded, "ir+A B").unwrap());
        assert_eq!(vec![Query::new("ir", &["A\tB"])], loaded.analyze("voy").unwrap());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Transducer::load(&dir.path().join("nope.fst")),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn load_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("morph.fst");
        fs::write(&path, "0\t1\ta\ta\n").unwrap();
        assert!(matches!(
            Transducer::load(&path),
            Err(Error::FstFile { action: "read", .. })
        ));
    }
}
