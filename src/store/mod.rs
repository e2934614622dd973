/*! SQLite storage.

A single database file holds the link graph (`links`, `redirects`, `pages`),
the mentions (`page_texts`, `matches`) and the derived training contexts
(`contexts`). See `schema.sql`.

Only the coordinating thread writes, through a [RowWriter]. Rows are inserted
with `INSERT OR IGNORE`, so that re-running a pass over the same input does not
duplicate matches or contexts. Workers that query the graph from the store do
so through a [ReaderPool] of query-only connections.

Neighbor queries follow redirects: a link to `Deutschland` is a link to
`Germany` when `Deutschland` redirects there.
!*/
mod persist;
mod readers;
mod writer;

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use crate::candidates::TitleResolver;
use crate::contexts::ContextRow;
use crate::error::Error;
use crate::graph::{LinkEdge, Neighbors, PageHash, RedirectMap};
use crate::matching::Match;

pub use crate::graph::MAX_REDIRECT_HOPS;
pub use persist::{PageMatches, PageText, Persist};
pub use readers::ReaderPool;
pub use writer::{BulkWriter, IncrementalWriter, RowWriter, Writer};

const SCHEMA: &str = include_str!("schema.sql");

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) a database file and make sure the schema exists.
    pub fn open(path: &Path) -> Result<Self, Error> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        debug!("opened database {:?}", path);
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Open a database that a previous pass must have created.
    pub fn open_existing(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        Self::open(path)
    }

    /// Open an existing database for queries only. The schema is not touched.
    pub fn open_reader(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(Error::MissingInput(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(30))?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, Error> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, path })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    fn count(&self, table: &str) -> Result<usize, Error> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(n as usize)
    }

    pub fn edge_count(&self) -> Result<usize, Error> {
        self.count("links")
    }

    pub fn page_count(&self) -> Result<usize, Error> {
        self.count("pages")
    }

    pub fn redirect_count(&self) -> Result<usize, Error> {
        self.count("redirects")
    }

    pub fn match_count(&self) -> Result<usize, Error> {
        self.count("matches")
    }

    pub fn context_count(&self) -> Result<usize, Error> {
        self.count("contexts")
    }

    /// Stream every stored edge, duplicates included. Returns the number of edges.
    pub fn for_each_edge<F: FnMut(LinkEdge)>(&self, mut f: F) -> Result<usize, Error> {
        let mut stmt = self.conn.prepare("SELECT from_hash, to_hash FROM links")?;
        let mut rows = stmt.query([])?;
        let mut nb = 0;
        while let Some(row) = rows.next()? {
            f(LinkEdge {
                from: PageHash::from_raw(row.get(0)?),
                to: PageHash::from_raw(row.get(1)?),
            });
            nb += 1;
        }
        Ok(nb)
    }

    /// Every redirect, keyed by hash.
    pub fn redirect_map(&self) -> Result<RedirectMap, Error> {
        let mut stmt = self.conn.prepare("SELECT from_hash, to_hash FROM redirects")?;
        let map = stmt
            .query_map([], |row| {
                Ok((
                    PageHash::from_raw(row.get(0)?),
                    PageHash::from_raw(row.get(1)?),
                ))
            })?
            .collect::<Result<RedirectMap, _>>()?;
        Ok(map)
    }

    /// Page `page` leads to, following at most [MAX_REDIRECT_HOPS] redirects.
    /// Cycles resolve to `page`.
    pub fn resolve_hash(&self, page: PageHash) -> Result<PageHash, Error> {
        let mut current = page;
        for _ in 0..MAX_REDIRECT_HOPS {
            let next: Option<i64> = self
                .conn
                .prepare_cached("SELECT to_hash FROM redirects WHERE from_hash = ?1")?
                .query_row([current.raw()], |row| row.get(0))
                .optional()?;
            match next.map(PageHash::from_raw) {
                Some(next) if next == page => return Ok(page),
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(current)
    }

    /// `page` and every redirect leading to it, within [MAX_REDIRECT_HOPS].
    fn aliases(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        let mut aliases: HashSet<PageHash> = [page].into_iter().collect();
        let mut frontier = vec![page];
        for _ in 0..MAX_REDIRECT_HOPS {
            let mut next = Vec::new();
            for hash in frontier {
                for alias in self.hashes("SELECT from_hash FROM redirects WHERE to_hash = ?1", hash)? {
                    if aliases.insert(alias) {
                        next.push(alias);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        Ok(aliases)
    }

    fn hashes(&self, sql: &str, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let hashes = stmt
            .query_map([page.raw()], |row| row.get::<_, i64>(0))?
            .map(|raw| raw.map(PageHash::from_raw))
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(hashes)
    }

    /// Title of an article, as written in the dump.
    pub fn page_title(&self, page: PageHash) -> Result<Option<String>, Error> {
        Ok(self
            .conn
            .prepare_cached("SELECT title FROM pages WHERE page_hash = ?1")?
            .query_row([page.raw()], |row| row.get(0))
            .optional()?)
    }

    /// Direct target of a redirect page.
    pub fn redirect_target(&self, title: &str) -> Result<Option<String>, Error> {
        Ok(self
            .conn
            .prepare_cached("SELECT to_title FROM redirects WHERE from_hash = ?1")?
            .query_row([PageHash::of(title).raw()], |row| row.get(0))
            .optional()?)
    }

    /// Follow redirects (at most [MAX_REDIRECT_HOPS]) and return the title of
    /// the article `title` leads to, if it exists.
    pub fn resolve_title(&self, title: &str) -> Result<Option<String>, Error> {
        let mut current = title.trim().to_string();
        let mut seen = HashSet::new();

        for _ in 0..MAX_REDIRECT_HOPS {
            if !seen.insert(PageHash::of(&current)) {
                debug!("redirect cycle from {:?}", title);
                return Ok(None);
            }
            match self.redirect_target(&current)? {
                Some(target) => current = target,
                None => break,
            }
        }

        self.page_title(PageHash::of(&current))
    }

    pub fn page_text(&self, title: &str) -> Result<Option<String>, Error> {
        Ok(self
            .conn
            .prepare_cached("SELECT text FROM page_texts WHERE title = ?1")?
            .query_row([title], |row| row.get(0))
            .optional()?)
    }

    /// Ids of the entities that have at least one match, sorted.
    pub fn entities_with_matches(&self) -> Result<Vec<String>, Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT entity_id FROM matches ORDER BY entity_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Matches of an entity, ordered by page then offset.
    pub fn matches_for_entity(&self, entity_id: &str) -> Result<Vec<Match>, Error> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT entity_id, surface_form, page_title, start_char, end_char, debug_context
             FROM matches WHERE entity_id = ?1 ORDER BY page_title, start_char, surface_form",
        )?;
        let matches = stmt
            .query_map(params![entity_id], |row| {
                Ok(Match {
                    entity_id: row.get(0)?,
                    surface_form: row.get(1)?,
                    page_title: row.get(2)?,
                    start_char: row.get::<_, i64>(3)? as usize,
                    end_char: row.get::<_, i64>(4)? as usize,
                    debug_context: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(matches)
    }

    /// Stream every stored context. Returns the number of contexts.
    pub fn for_each_context<F>(&self, mut f: F) -> Result<usize, Error>
    where
        F: FnMut(ContextRow) -> Result<(), Error>,
    {
        let mut stmt = self.conn.prepare(
            "SELECT entity_id, surface_form, page_title, unmasked_context, masked_context
             FROM contexts ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        let mut nb = 0;
        while let Some(row) = rows.next()? {
            f(ContextRow {
                entity_id: row.get(0)?,
                surface_form: row.get(1)?,
                page_title: row.get(2)?,
                unmasked_context: row.get(3)?,
                masked_context: row.get(4)?,
            })?;
            nb += 1;
        }
        Ok(nb)
    }
}

impl Neighbors for Database {
    fn linked_to(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        self.hashes(
            "SELECT DISTINCT to_hash FROM links WHERE from_hash = ?1",
            page,
        )?
        .into_iter()
        .map(|target| self.resolve_hash(target))
        .collect()
    }

    fn linked_from(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        let mut sources = HashSet::new();
        for alias in self.aliases(page)? {
            let linking = self.hashes(
                "SELECT DISTINCT from_hash FROM links WHERE to_hash = ?1",
                alias,
            )?;
            sources.extend(linking);
        }
        Ok(sources)
    }
}

impl TitleResolver for Database {
    fn resolve(&self, title: &str) -> Result<Option<String>, Error> {
        self.resolve_title(title)
    }
}
