//! Reads lexicon files of the form
//!
//! ```text
//! lemma1: form1+CAT1+CAT2, form2+CAT1+CAT2
//! lemma2: form1+CAT1
//! ```

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub surface: SmolStr,
    pub tags: Vec<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub lemma: SmolStr,
    pub forms: Vec<Form>,
}

fn parse_form(line_no: usize, raw: &str) -> Option<Form> {
    let Some((surface, tags)) = raw.split_once('+') else {
        warn!("Line {line_no}: form {raw:?} has no categories, skipping");
        return None;
    };
    let tags = tags
        .split('+')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(SmolStr::from)
        .collect::<Vec<_>>();
    if tags.is_empty() {
        warn!("Line {line_no}: form {raw:?} has no categories, skipping");
        return None;
    }
    Some(Form {
        surface: surface.trim().into(),
        tags,
    })
}

/// Parses one lexicon line. Blank lines and `#` comments are `Ok(None)`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<Entry>, Error> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let Some((lemma, forms)) = line.split_once(':') else {
        return Err(Error::MissingForms { line: line_no });
    };
    let lemma = lemma.trim();
    if lemma.is_empty() {
        return Err(Error::MissingLemma { line: line_no });
    }

    let forms = forms
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .filter_map(|f| parse_form(line_no, f))
        .collect();

    Ok(Some(Entry {
        lemma: lemma.into(),
        forms,
    }))
}

pub fn parse_lexicon(text: &str) -> Result<Vec<Entry>, Error> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(idx + 1, line)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

pub fn read_lexicon(path: &Path) -> Result<Vec<Entry>, Error> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if let Some(entry) = parse_line(idx + 1, &line)? {
            entries.push(entry);
        }
    }
    debug!("Read {} lexicon entries from {path:?}", entries.len());
    Ok(entries)
}
