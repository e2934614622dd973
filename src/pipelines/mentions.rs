//! Mention extraction pass.
//!
//! # Processing
//! 1. The candidate table is loaded from the catalog, resolving targets through the link graph store.
//! 1. The link graph is loaded in memory, or queried from the store by each worker through a
//!    [ReaderPool] when [GraphStorage::Database] is configured. Either way, links to redirects
//!    count as links to the article they lead to.
//! 1. Pages are read from the dump by a feeder thread and processed by a pool of workers.
//!    Each worker matches, resolves and filters the mentions of a page (see [super::worker]).
//! 1. The coordinator (the calling thread) receives page results in arrival order and
//!    persists them through a [crate::store::RowWriter], committing every `n` pages.
//!
//! Failing pages are logged and skipped. An unreadable dump stops the pass once the pages
//! already read have been processed and persisted.
use std::{io::BufRead, path::PathBuf, sync::mpsc, thread};

use log::{debug, error, info};
use rayon::prelude::*;

use crate::candidates::{CandidateTable, CatalogStats};
use crate::config::{GraphStorage, MentionConfig};
use crate::error::Error;
use crate::graph::{LinkGraph, Neighbors};
use crate::sources::{DumpReader, ReadStats};
use crate::store::{Database, ReaderPool, RowWriter, Writer};

use super::stats::{MentionReport, MentionStats};
use super::worker::{PageOutcome, WorkerContext};
use super::Pipeline;

pub struct MentionPipeline {
    src: PathBuf,
    catalog: PathBuf,
    db: PathBuf,
    config: MentionConfig,
}

impl MentionPipeline {
    pub fn new(src: PathBuf, catalog: PathBuf, db: PathBuf, config: MentionConfig) -> Self {
        Self {
            src,
            catalog,
            db,
            config,
        }
    }

    /// Run the workers over the dump and persist their results.
    fn extract<G: Neighbors + Sync>(
        &self,
        mut reader: DumpReader<Box<dyn BufRead + Send>>,
        db: &Database,
        ctx: WorkerContext<G>,
        catalog: CatalogStats,
    ) -> Result<MentionReport, Error> {
        info!(
            "matching {} surface forms of {} entities",
            ctx.matcher().len(),
            ctx.candidates().len()
        );

        let nb_workers = self.config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(nb_workers)
            .thread_name(|idx| format!("worker-{idx}"))
            .build()
            .map_err(|e| Error::Custom(format!("could not build worker pool: {e}")))?;
        info!("starting {} workers", nb_workers);

        let (tx, rx) = mpsc::sync_channel::<PageOutcome>(self.config.channel_capacity);
        let mut writer = Writer::new(db, self.config.write_mode);
        let mut stats = MentionStats::default();
        let mut stream_error: Option<Error> = None;
        let mut store_error: Option<Error> = None;

        let read = thread::scope(|s| -> Result<ReadStats, Error> {
            let reader = &mut reader;
            let pool = &pool;
            let ctx = &ctx;

            let feeder = s.spawn(move || {
                // fails only when the coordinator stopped listening
                let _ = pool.install(|| {
                    reader
                        .by_ref()
                        .enumerate()
                        .par_bridge()
                        .try_for_each_with(tx, |tx, (idx, page)| {
                            let outcome = match page {
                                Ok(page) => ctx.run(idx, page),
                                Err(error) => PageOutcome::Unreadable { idx, error },
                            };
                            tx.send(outcome)
                        })
                });
                reader.stats().clone()
            });

            for outcome in rx {
                match outcome {
                    PageOutcome::Done(result) => {
                        stats.record(result.stats);
                        let written = writer
                            .write(result.rows)
                            .and_then(|_| writer.checkpoint());
                        if let Err(e) = written {
                            error!("could not persist matches: {}", e);
                            store_error = Some(e);
                            break;
                        }
                    }
                    PageOutcome::Redirect => stats.record_redirect(),
                    PageOutcome::Failed { idx, title, error } => {
                        stats.record_failure();
                        error!(
                            "page {} ({:?}) failed: {} ({})",
                            idx,
                            title,
                            error,
                            stats.progress()
                        );
                    }
                    PageOutcome::Unreadable { idx, error } => {
                        error!("dump unreadable after page {}: {}", idx, error);
                        stream_error = Some(error);
                    }
                }

                if stats.pages > 0 && stats.pages % self.config.progress_every.max(1) == 0 {
                    info!("{}", stats.progress());
                }
            }

            feeder
                .join()
                .map_err(|_| Error::WorkerPanic("page feeder panicked".to_string()))
        })?;

        if let Some(e) = store_error {
            return Err(e);
        }
        stats.inserted_matches = writer.finish()?;
        if let Some(e) = stream_error {
            return Err(e);
        }

        let report = MentionReport {
            read,
            catalog,
            mentions: stats,
        };
        info!("mention pass done:\n{}", report);
        Ok(report)
    }
}

impl Pipeline<MentionReport> for MentionPipeline {
    fn run(&self) -> Result<MentionReport, Error> {
        debug!("mention pass configuration: {:?}", self.config);

        let reader = DumpReader::from_path(&self.src)?.with_max_pages(self.config.max_pages);
        let db = Database::open_existing(&self.db)?;
        let (candidates, catalog) = CandidateTable::load(&self.catalog, &db)?;

        match self.config.graph_storage {
            GraphStorage::Memory => {
                let graph = LinkGraph::load(&db)?;
                let ctx = WorkerContext::new(candidates, graph, &self.config)?;
                self.extract(reader, &db, ctx, catalog)
            }
            GraphStorage::Database => {
                info!("querying the link graph from {:?}", self.db);
                let graph = ReaderPool::new(&self.db)?;
                let ctx = WorkerContext::new(candidates, graph, &self.config)?;
                self.extract(reader, &db, ctx, catalog)
            }
        }
    }
}
