//! Candidate table.
use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use log::{debug, info};
use serde::Serialize;

use crate::error::Error;
use crate::graph::PageHash;

use super::{CatalogEntry, CatalogReader, TitleResolver};

/// A catalog entity whose target page exists in the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntity {
    pub id: String,
    pub label: String,
    /// Label and aliases, ambiguous ones included.
    pub surface_forms: BTreeSet<String>,
    /// Resolved title of the target page.
    pub target: String,
    pub target_hash: PageHash,
}

/// Catalog loading counters.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub entries: usize,
    /// Entities kept in the table.
    pub entities: usize,
    /// Entities without a resolvable target page.
    pub missing: usize,
    /// Entities whose id was already loaded.
    pub duplicate_ids: usize,
    /// Surface forms shared by several entities, excluded from matching.
    pub ambiguous_forms: usize,
    pub invalid_lines: usize,
}

impl std::fmt::Display for CatalogStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} catalog entries: {} entities kept, {} missing a target page, {} duplicate ids, {} ambiguous surface forms dropped, {} invalid lines",
            self.entries,
            self.entities,
            self.missing,
            self.duplicate_ids,
            self.ambiguous_forms,
            self.invalid_lines
        )
    }
}

/// Read-only entity lookup tables.
#[derive(Debug, Default)]
pub struct CandidateTable {
    entities: Vec<CandidateEntity>,
    by_id: HashMap<String, usize>,
    by_target: HashMap<PageHash, usize>,
    /// Unambiguous surface forms only.
    by_form: HashMap<String, usize>,
}

impl CandidateTable {
    /// Load a catalog file. See [super::CatalogReader].
    pub fn load<R: TitleResolver + ?Sized>(
        path: &Path,
        resolver: &R,
    ) -> Result<(Self, CatalogStats), Error> {
        let mut reader = CatalogReader::from_path(path)?;
        let entries = reader.by_ref().collect::<Result<Vec<_>, Error>>()?;
        let (table, mut stats) = Self::from_entries(entries, resolver)?;
        stats.invalid_lines = reader.invalid();

        info!("{}", stats);
        Ok((table, stats))
    }

    pub fn from_entries<I, R>(entries: I, resolver: &R) -> Result<(Self, CatalogStats), Error>
    where
        I: IntoIterator<Item = CatalogEntry>,
        R: TitleResolver + ?Sized,
    {
        let mut table = Self::default();
        let mut stats = CatalogStats::default();
        let mut form_owners: HashMap<String, BTreeSet<usize>> = HashMap::new();

        for entry in entries {
            stats.entries += 1;

            if table.by_id.contains_key(&entry.id) {
                debug!("duplicate entity id {}", entry.id);
                stats.duplicate_ids += 1;
                continue;
            }

            let target = match &entry.target {
                Some(target) => resolver.resolve(target)?,
                None => None,
            };
            let target = match target {
                Some(target) => target,
                None => {
                    debug!("no target page for {} ({:?})", entry.id, entry.target);
                    stats.missing += 1;
                    continue;
                }
            };

            let surface_forms: BTreeSet<String> = std::iter::once(&entry.label)
                .chain(entry.aliases.iter())
                .map(|form| form.trim())
                .filter(|form| !form.is_empty())
                .map(String::from)
                .collect();

            let idx = table.entities.len();
            for form in &surface_forms {
                form_owners.entry(form.clone()).or_default().insert(idx);
            }

            let target_hash = PageHash::of(&target);
            table.by_id.insert(entry.id.clone(), idx);
            table.by_target.entry(target_hash).or_insert(idx);
            table.entities.push(CandidateEntity {
                id: entry.id,
                label: entry.label,
                surface_forms,
                target,
                target_hash,
            });
        }

        for (form, owners) in form_owners {
            if owners.len() == 1 {
                if let Some(idx) = owners.into_iter().next() {
                    table.by_form.insert(form, idx);
                }
            } else {
                debug!("ambiguous surface form {:?} ({} entities)", form, owners.len());
                stats.ambiguous_forms += 1;
            }
        }

        stats.entities = table.entities.len();
        Ok((table, stats))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &CandidateEntity> {
        self.entities.iter()
    }

    pub fn entity(&self, id: &str) -> Option<&CandidateEntity> {
        self.by_id.get(id).map(|idx| &self.entities[*idx])
    }

    /// Entity referred to by an unambiguous surface form.
    pub fn entity_for_form(&self, form: &str) -> Option<&CandidateEntity> {
        self.by_form.get(form).map(|idx| &self.entities[*idx])
    }

    /// Entity whose target page is `title`.
    pub fn entity_for_target(&self, title: &str) -> Option<&CandidateEntity> {
        self.by_target
            .get(&PageHash::of(title))
            .map(|idx| &self.entities[*idx])
    }

    /// Surface forms that can be matched.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.by_form.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::candidates::AnyTitle;

    use super::*;

    fn entry(id: &str, label: &str, target: Option<&str>, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            label: label.to_string(),
            target: target.map(String::from),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Only knows a fixed set of pages, with one redirect.
    struct Pages;
    impl TitleResolver for Pages {
        fn resolve(&self, title: &str) -> Result<Option<String>, Error> {
            Ok(match title {
                "Berlin" | "Mercury (planet)" | "Mercury (element)" => Some(title.to_string()),
                "Hg" => Some("Mercury (element)".to_string()),
                _ => None,
            })
        }
    }

    fn table() -> (CandidateTable, CatalogStats) {
        CandidateTable::from_entries(
            vec![
                entry("Q64", "Berlin", Some("Berlin"), &["Berlin, Germany", " "]),
                entry("Q308", "Mercury", Some("Mercury (planet)"), &["Planet Mercury"]),
                entry("Q925", "mercury", Some("Hg"), &["Mercury", "Hg"]),
                entry("Q1", "Nowhere", Some("Nowhere"), &[]),
                entry("Q2", "Nothing", None, &[]),
                entry("Q64", "Berlin again", Some("Berlin"), &[]),
            ],
            &Pages,
        )
        .unwrap()
    }

    #[test]
    fn counters() {
        let (t, stats) = table();
        assert_eq!(t.len(), 3);
        assert_eq!(stats.entries, 6);
        assert_eq!(stats.missing, 2);
        assert_eq!(stats.duplicate_ids, 1);
        assert_eq!(stats.ambiguous_forms, 1);
    }

    #[test]
    fn ambiguous_forms_are_not_matchable() {
        let (t, _) = table();
        assert!(t.entity_for_form("Mercury").is_none());
        assert_eq!(t.entity_for_form("Planet Mercury").unwrap().id, "Q308");
        assert_eq!(t.entity_for_form("mercury").unwrap().id, "Q925");

        let vocabulary: HashSet<&str> = t.vocabulary().collect();
        let expected: HashSet<&str> = [
            "Berlin",
            "Berlin, Germany",
            "Planet Mercury",
            "mercury",
            "Hg",
        ]
        .into_iter()
        .collect();
        assert_eq!(vocabulary, expected);

        // ambiguous forms are still listed for their entities
        assert!(t.entity("Q308").unwrap().surface_forms.contains("Mercury"));
    }

    #[test]
    fn resolved_targets() {
        let (t, _) = table();
        let hg = t.entity("Q925").unwrap();
        assert_eq!(hg.target, "Mercury (element)");
        assert_eq!(t.entity_for_target("mercury (element)").unwrap().id, "Q925");
        assert!(t.entity_for_target("Hg").is_none());
    }

    #[test]
    fn any_title() {
        let (t, stats) =
            CandidateTable::from_entries(vec![entry("Q1", "A", Some("B"), &[])], &AnyTitle)
                .unwrap();
        assert_eq!(stats.missing, 0);
        assert_eq!(t.entity("Q1").unwrap().target, "B");
    }
}
