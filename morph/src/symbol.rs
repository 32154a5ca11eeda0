//! Transducer labels and their spelling in the FST symbol table

use std::fmt;

use smol_str::SmolStr;

/// rustfst's `SymbolTable::new()` reserves label 0 under this name
const EPSILON: &str = "<eps>";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Epsilon,
    Char(char),
    /// A morphological category, stored without the leading `+`
    Tag(SmolStr),
}

impl Symbol {
    pub fn tag(name: &str) -> Self {
        Symbol::Tag(name.into())
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }

    /// Parses the spelling produced by [`Display`](fmt::Display).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            EPSILON => Some(Symbol::Epsilon),
            v if v.len() > 1 && v.starts_with('+') => Some(Symbol::tag(&v[1..])),
            v => {
                let mut chars = v.chars();
                let first = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                Some(Symbol::Char(first))
            }
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Symbol::Epsilon => f.write_str(EPSILON),
            Symbol::Char(c) => write!(f, "{c}"),
            Symbol::Tag(name) => write!(f, "+{name}"),
        }
    }
}
