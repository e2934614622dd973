//! Query-only connections shared by workers.
//!
//! A [rusqlite::Connection] cannot be used by two threads at once, so each
//! query checks a connection out of the pool and puts it back afterwards.
//! Connections are opened lazily, which bounds their number by the number of
//! threads querying at the same time.
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Mutex,
};

use log::debug;

use crate::error::Error;
use crate::graph::{Neighbors, PageHash};

use super::Database;

pub struct ReaderPool {
    path: PathBuf,
    idle: Mutex<Vec<Database>>,
}

impl ReaderPool {
    /// Check that the database exists. No connection is opened yet.
    pub fn new(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            idle: Mutex::new(Vec::new()),
        })
    }

    /// Number of connections opened so far and currently idle.
    pub fn idle(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn with_reader<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Database) -> Result<T, Error>,
    {
        let pooled = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let reader = match pooled {
            Some(reader) => reader,
            None => {
                debug!("opening a reader on {:?}", self.path);
                Database::open_reader(&self.path)?
            }
        };

        let result = f(&reader);
        // a poisoned pool drops the connection
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(reader);
        }
        result
    }
}

impl Neighbors for ReaderPool {
    fn linked_to(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        self.with_reader(|db| db.linked_to(page))
    }

    fn linked_from(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        self.with_reader(|db| db.linked_from(page))
    }

    fn neighbors(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        self.with_reader(|db| db.neighbors(page))
    }
}
