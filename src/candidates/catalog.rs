//! JSON lines entity catalog.
//!
//! ```text
//! {"id": "Q64", "label": "Berlin", "target": "Berlin", "aliases": ["Berlin, Germany"]}
//! ```
use std::io::{BufRead, Lines};
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::sources;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub label: String,
    /// Title of the page describing the entity, if any.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Iterates over catalog entries, skipping (and counting) unparseable lines.
pub struct CatalogReader<R> {
    lines: Lines<R>,
    line_no: usize,
    invalid: usize,
}

impl CatalogReader<Box<dyn BufRead + Send>> {
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Ok(Self::new(sources::open(path)?))
    }
}

impl<R: BufRead> CatalogReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            invalid: 0,
        }
    }

    /// Number of lines that could not be parsed so far.
    pub fn invalid(&self) -> usize {
        self.invalid
    }
}

impl<R: BufRead> Iterator for CatalogReader<R> {
    type Item = Result<CatalogEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => return Some(Ok(entry)),
                Err(e) => {
                    warn!("catalog line {}: {}", self.line_no, e);
                    self.invalid += 1;
                }
            }
        }
    }
}
