//! Row writers.
//!
//! A pass hands its rows to a [RowWriter] and calls [RowWriter::checkpoint]
//! after each unit of work (usually a page). How and when rows reach the
//! database depends on the writer:
//!
//! - [IncrementalWriter] writes rows right away and commits every `n` checkpoints,
//! - [BulkWriter] keeps rows in memory and writes them all in a single transaction when finished.
//!
//! [Writer] picks one from a [WriteMode].
use std::marker::PhantomData;

use log::{debug, error};
use rusqlite::Connection;

use crate::config::WriteMode;
use crate::error::Error;

use super::{Database, Persist};

pub trait RowWriter<T> {
    fn write(&mut self, row: T) -> Result<(), Error>;

    /// Mark the end of a unit of work.
    fn checkpoint(&mut self) -> Result<(), Error>;

    /// Flush everything and return the number of inserted rows.
    fn finish(&mut self) -> Result<usize, Error>;
}

/// Writes through, committing every `commit_every` checkpoints.
///
/// Pending rows are committed when the writer is dropped, so that an
/// interrupted pass keeps what it has written so far.
pub struct IncrementalWriter<'a> {
    conn: &'a Connection,
    commit_every: usize,
    checkpoints: usize,
    in_transaction: bool,
    inserted: usize,
    commits: usize,
}

impl<'a> IncrementalWriter<'a> {
    pub fn new(db: &'a Database, commit_every: usize) -> Self {
        Self {
            conn: db.conn(),
            commit_every: commit_every.max(1),
            checkpoints: 0,
            in_transaction: false,
            inserted: 0,
            commits: 0,
        }
    }

    fn begin(&mut self) -> Result<(), Error> {
        if !self.in_transaction {
            self.conn.execute_batch("BEGIN")?;
            self.in_transaction = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Error> {
        if self.in_transaction {
            self.conn.execute_batch("COMMIT")?;
            self.in_transaction = false;
            self.commits += 1;
            debug!(
                "commit #{} ({} rows inserted so far)",
                self.commits, self.inserted
            );
        }
        self.checkpoints = 0;
        Ok(())
    }
}

impl<T: Persist> RowWriter<T> for IncrementalWriter<'_> {
    fn write(&mut self, row: T) -> Result<(), Error> {
        self.begin()?;
        self.inserted += row.persist(self.conn)?;
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<(), Error> {
        self.checkpoints += 1;
        if self.checkpoints >= self.commit_every {
            self.commit()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<usize, Error> {
        self.commit()?;
        Ok(self.inserted)
    }
}

impl Drop for IncrementalWriter<'_> {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Err(e) = self.conn.execute_batch("COMMIT") {
                error!("could not commit pending rows: {}", e);
            }
        }
    }
}

/// Buffers every row, and writes them in one transaction on [RowWriter::finish].
pub struct BulkWriter<'a, T> {
    conn: &'a Connection,
    rows: Vec<T>,
    inserted: usize,
}

impl<'a, T> BulkWriter<'a, T> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            conn: db.conn(),
            rows: Vec::new(),
            inserted: 0,
        }
    }

    /// Number of rows waiting to be written.
    pub fn pending(&self) -> usize {
        self.rows.len()
    }
}

impl<T: Persist> RowWriter<T> for BulkWriter<'_, T> {
    fn write(&mut self, row: T) -> Result<(), Error> {
        self.rows.push(row);
        Ok(())
    }

    fn checkpoint(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn finish(&mut self) -> Result<usize, Error> {
        debug!("bulk writing {} rows", self.rows.len());
        let tx = self.conn.unchecked_transaction()?;
        for row in self.rows.drain(..) {
            self.inserted += row.persist(&tx)?;
        }
        tx.commit()?;
        Ok(self.inserted)
    }
}

/// Writer selected from a [WriteMode].
pub enum Writer<'a, T> {
    Incremental(IncrementalWriter<'a>, PhantomData<T>),
    Bulk(BulkWriter<'a, T>),
}

impl<'a, T: Persist> Writer<'a, T> {
    pub fn new(db: &'a Database, mode: WriteMode) -> Self {
        match mode {
            WriteMode::Incremental { commit_every } => {
                Writer::Incremental(IncrementalWriter::new(db, commit_every), PhantomData)
            }
            WriteMode::Bulk => Writer::Bulk(BulkWriter::new(db)),
        }
    }
}

impl<T: Persist> RowWriter<T> for Writer<'_, T> {
    fn write(&mut self, row: T) -> Result<(), Error> {
        match self {
            Writer::Incremental(w, _) => w.write(row),
            Writer::Bulk(w) => w.write(row),
        }
    }

    fn checkpoint(&mut self) -> Result<(), Error> {
        match self {
            Writer::Incremental(w, _) => RowWriter::<T>::checkpoint(w),
            Writer::Bulk(w) => w.checkpoint(),
        }
    }

    fn finish(&mut self) -> Result<usize, Error> {
        match self {
            Writer::Incremental(w, _) => RowWriter::<T>::finish(w),
            Writer::Bulk(w) => w.finish(),
        }
    }
}
