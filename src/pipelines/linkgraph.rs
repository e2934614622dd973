//! Link graph pass.
//!
//! Reads the dump sequentially and stores, for every article, its title and
//! its outgoing links, and for every redirect its target.
use std::path::PathBuf;

use log::{debug, info};

use crate::config::GraphConfig;
use crate::error::Error;
use crate::graph::{GraphRow, GraphStats};
use crate::sources::DumpReader;
use crate::store::{Database, RowWriter, Writer};

use super::stats::GraphReport;
use super::Pipeline;

pub struct LinkGraphPipeline {
    src: PathBuf,
    db: PathBuf,
    config: GraphConfig,
}

impl LinkGraphPipeline {
    pub fn new(src: PathBuf, db: PathBuf, config: GraphConfig) -> Self {
        Self { src, db, config }
    }
}

impl Pipeline<GraphReport> for LinkGraphPipeline {
    fn run(&self) -> Result<GraphReport, Error> {
        debug!("link graph pass configuration: {:?}", self.config);

        let mut reader = DumpReader::from_path(&self.src)?.with_max_pages(self.config.max_pages);
        let db = Database::open(&self.db)?;
        let mut writer = Writer::new(&db, self.config.write_mode);
        let mut stats = GraphStats::default();
        let progress_every = self.config.progress_every.max(1);

        for (idx, page) in reader.by_ref().enumerate() {
            let row = GraphRow::from_page(&page?);
            stats.record(&row);
            writer.write(row)?;
            writer.checkpoint()?;

            if (idx + 1) % progress_every == 0 {
                info!("{} pages: {}", idx + 1, stats);
            }
        }
        writer.finish()?;

        let report = GraphReport {
            read: reader.stats().clone(),
            graph: stats,
        };
        info!("link graph pass done:\n{}", report);
        Ok(report)
    }
}
