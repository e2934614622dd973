//! # wikilinks
//!
//! Extraction of entity mentions from a wiki dump, disambiguated by the link
//! graph of the wiki, and derivation of masked training contexts.
//!
//! ## Getting started
//!
//! ```sh
//! wikilinks graph enwiki-pages-articles.xml.bz2 links.db
//! wikilinks mentions enwiki-pages-articles.xml.bz2 entities.jsonl links.db
//! wikilinks contexts entities.jsonl links.db --sentences -n 100 --export contexts.tsv
//! ```
//!
//! The log level is set with `RUST_LOG` (e.g. `RUST_LOG=info`).
use structopt::StructOpt;

use wikilinks::error::Error;
use wikilinks::pipelines::{ContextPipeline, LinkGraphPipeline, MentionPipeline, Pipeline};

#[macro_use]
extern crate log;

mod cli;

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Wikilinks::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Wikilinks::Graph(g) => {
            let p = LinkGraphPipeline::new(g.src.clone(), g.db.clone(), g.config()?);
            let report = p.run()?;
            println!("{report}");
        }
        cli::Wikilinks::Mentions(m) => {
            let p = MentionPipeline::new(
                m.src.clone(),
                m.catalog.clone(),
                m.db.clone(),
                m.config()?,
            );
            let report = p.run()?;
            println!("{report}");
        }
        cli::Wikilinks::Contexts(c) => {
            let p = ContextPipeline::new(c.catalog.clone(), c.db.clone(), c.config()?)
                .with_export(c.export.clone());
            let stats = p.run()?;
            println!("{stats}");
        }
    };
    Ok(())
}
