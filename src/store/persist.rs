//! Row insertion.
use rusqlite::{params, Connection};

use crate::contexts::ContextRow;
use crate::graph::{GraphRow, LinkEdge, PageHash, PageTitle, Redirect};
use crate::matching::Match;

/// Something that can be written into the database.
pub trait Persist {
    /// Insert the row(s), returning how many were actually inserted.
    /// Rows that are already present are ignored.
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize>;
}

impl<T: Persist> Persist for Vec<T> {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        let mut nb = 0;
        for row in self {
            nb += row.persist(conn)?;
        }
        Ok(nb)
    }
}

impl Persist for LinkEdge {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached("INSERT INTO links (from_hash, to_hash) VALUES (?1, ?2)")?
            .execute(params![self.from.raw(), self.to.raw()])
    }
}

impl Persist for PageTitle {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached("INSERT OR IGNORE INTO pages (page_hash, title) VALUES (?1, ?2)")?
            .execute(params![self.hash.raw(), self.title])
    }
}

impl Persist for Redirect {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached(
            "INSERT OR IGNORE INTO redirects (from_hash, from_title, to_hash, to_title)
             VALUES (?1, ?2, ?3, ?4)",
        )?
        .execute(params![
            PageHash::of(&self.from).raw(),
            self.from,
            PageHash::of(&self.to).raw(),
            self.to
        ])
    }
}

impl Persist for GraphRow {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        match self {
            GraphRow::Article { title, edges } => Ok(title.persist(conn)? + edges.persist(conn)?),
            GraphRow::Redirect(redirect) => redirect.persist(conn),
        }
    }
}

impl Persist for Match {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached(
            "INSERT OR IGNORE INTO matches
             (entity_id, surface_form, page_title, start_char, end_char, debug_context)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?
        .execute(params![
            self.entity_id,
            self.surface_form,
            self.page_title,
            self.start_char as i64,
            self.end_char as i64,
            self.debug_context
        ])
    }
}

/// Plain text of a page, kept for context derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub text: String,
}

impl Persist for PageText {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached("INSERT OR IGNORE INTO page_texts (title, text) VALUES (?1, ?2)")?
            .execute(params![self.title, self.text])
    }
}

/// Everything the mention pass stores for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMatches {
    pub page: PageText,
    pub matches: Vec<Match>,
}

impl Persist for PageMatches {
    /// Only counts matches.
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        if self.matches.is_empty() {
            return Ok(0);
        }
        self.page.persist(conn)?;
        self.matches.persist(conn)
    }
}

impl Persist for ContextRow {
    fn persist(&self, conn: &Connection) -> rusqlite::Result<usize> {
        conn.prepare_cached(
            "INSERT OR IGNORE INTO contexts
             (entity_id, surface_form, page_title, unmasked_context, masked_context)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?
        .execute(params![
            self.entity_id,
            self.surface_form,
            self.page_title,
            self.unmasked_context,
            self.masked_context
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    #[test]
    fn page_without_matches_is_not_stored() {
        let db = Database::in_memory().unwrap();
        let rows = PageMatches {
            page: PageText {
                title: "Nowhere".to_string(),
                text: "Nothing here.".to_string(),
            },
            matches: vec![],
        };
        assert_eq!(rows.persist(db.conn()).unwrap(), 0);
        assert_eq!(db.page_text("Nowhere").unwrap(), None);
    }

    #[test]
    fn duplicate_contexts_are_ignored() {
        let db = Database::in_memory().unwrap();
        let row = ContextRow {
            entity_id: "Q64".to_string(),
            surface_form: "Berlin".to_string(),
            page_title: "Germany".to_string(),
            unmasked_context: "capital is Berlin today".to_string(),
            masked_context: "capital is ###### today".to_string(),
        };
        let rows = vec![row.clone(), row];
        assert_eq!(rows.persist(db.conn()).unwrap(), 1);
        assert_eq!(db.context_count().unwrap(), 1);
    }
}
