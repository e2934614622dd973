//! Context derivation pass.
//!
//! For every entity with stored matches, derive masked contexts (see
//! [crate::contexts]) from its matches, optionally sampled, and store them.
//! Matches of an entity are processed in parallel. Entities are processed one
//! after the other, so that only the page texts of a single entity are kept in
//! memory.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;

use crate::candidates::CandidateTable;
use crate::config::ContextConfig;
use crate::contexts::{ContextBuilder, ContextOutcome, ContextRow};
use crate::error::Error;
use crate::matching::Matcher;
use crate::store::{Database, RowWriter, Writer};

use super::stats::ContextStats;
use super::Pipeline;

pub struct ContextPipeline {
    catalog: PathBuf,
    db: PathBuf,
    config: ContextConfig,
    export: Option<PathBuf>,
}

impl ContextPipeline {
    pub fn new(catalog: PathBuf, db: PathBuf, config: ContextConfig) -> Self {
        Self {
            catalog,
            db,
            config,
            export: None,
        }
    }

    /// Also export every stored context to a TSV file.
    pub fn with_export(mut self, export: Option<PathBuf>) -> Self {
        self.export = export;
        self
    }
}

/// Write every stored context as a tab separated file, with a header.
/// Returns the number of contexts written.
pub fn export_tsv(db: &Database, dst: &Path) -> Result<usize, Error> {
    let mut out = csv::WriterBuilder::new().delimiter(b'\t').from_path(dst)?;
    let nb = db.for_each_context(|row: ContextRow| Ok(out.serialize(row)?))?;
    out.flush()?;
    info!("exported {} contexts to {:?}", nb, dst);
    Ok(nb)
}

impl Pipeline<ContextStats> for ContextPipeline {
    fn run(&self) -> Result<ContextStats, Error> {
        debug!("context pass configuration: {:?}", self.config);

        let db = Database::open_existing(&self.db)?;
        let (candidates, _) = CandidateTable::load(&self.catalog, &db)?;
        let builder = ContextBuilder::new(&self.config);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut writer = Writer::new(&db, self.config.write_mode);
        let mut stats = ContextStats::default();

        let entities = db.entities_with_matches()?;
        info!("deriving contexts for {} entities", entities.len());

        for entity_id in entities {
            stats.entities += 1;
            let entity = match candidates.entity(&entity_id) {
                Some(entity) => entity,
                None => {
                    warn!("entity {} has matches but is not in the catalog", entity_id);
                    stats.unknown_entities += 1;
                    continue;
                }
            };
            let mentions = Matcher::new(&entity.surface_forms)?;

            let mut matches = db.matches_for_entity(&entity_id)?;
            if let Some(max) = self.config.contexts_per_entity {
                if matches.len() > max {
                    matches.shuffle(&mut rng);
                    matches.truncate(max);
                }
            }
            stats.matches_seen += matches.len();

            let mut texts: HashMap<&str, String> = HashMap::new();
            for m in &matches {
                if !texts.contains_key(m.page_title.as_str()) {
                    if let Some(text) = db.page_text(&m.page_title)? {
                        texts.insert(m.page_title.as_str(), text);
                    }
                }
            }

            let outcomes: Vec<Option<ContextOutcome>> = matches
                .par_iter()
                .map(|m| {
                    texts
                        .get(m.page_title.as_str())
                        .map(|text| builder.derive(m, text, &mentions))
                })
                .collect();

            for outcome in outcomes {
                match outcome {
                    Some(ContextOutcome::Context(row)) => {
                        stats.contexts += 1;
                        writer.write(row)?;
                    }
                    Some(ContextOutcome::CroppedEmpty) => stats.cropped_empty += 1,
                    Some(ContextOutcome::NoMention) => stats.unmasked += 1,
                    Some(ContextOutcome::OutOfBounds) => stats.out_of_bounds += 1,
                    None => stats.missing_text += 1,
                }
            }
            writer.checkpoint()?;
            debug!("{}: {} contexts so far", entity_id, stats.contexts);
        }
        stats.inserted = writer.finish()?;
        info!("context pass done: {}", stats);

        if let Some(dst) = &self.export {
            export_tsv(&db, dst)?;
        }

        Ok(stats)
    }
}
