//! `lemma+CAT1+CAT2` queries

use std::fmt;

use itertools::Itertools;
use smol_str::SmolStr;

use crate::{Error, symbol::Symbol};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Query {
    pub lemma: SmolStr,
    pub tags: Vec<SmolStr>,
}

impl Query {
    pub fn new(lemma: &str, tags: &[&str]) -> Self {
        Query {
            lemma: lemma.into(),
            tags: tags.iter().map(|t| SmolStr::from(*t)).collect(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut parts = raw.trim().split('+');
        let lemma = parts.next().unwrap_or_default().trim();
        if lemma.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let tags = parts
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SmolStr::from)
            .collect();
        Ok(Query {
            lemma: lemma.into(),
            tags,
        })
    }

    /// Input side of the transducer: lemma characters, then one symbol per tag.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.lemma
            .chars()
            .map(Symbol::Char)
            .chain(self.tags.iter().map(|t| Symbol::Tag(t.clone())))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.lemma)?;
        if !self.tags.is_empty() {
            write!(f, "+{}", self.tags.iter().join("+"))?;
        }
        Ok(())
    }
}
