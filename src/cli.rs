//! Command line arguments and parameters management/parsing.
//!
//! Each pass loads its configuration from an optional JSON file, and then
//! applies the flags that were given on the command line.
use std::path::PathBuf;

use structopt::StructOpt;

use wikilinks::config::{
    self, ContextConfig, CropMode, GraphConfig, GraphStorage, MentionConfig, OverlapPolicy,
    WriteMode,
};
use wikilinks::error::Error;

#[derive(Debug, StructOpt)]
#[structopt(name = "wikilinks", about = "entity mention extraction from wiki dumps.")]
/// Holds every command that is callable by the `wikilinks` command.
pub enum Wikilinks {
    #[structopt(about = "Build the link graph of a dump")]
    Graph(Graph),
    #[structopt(about = "Extract entity mentions")]
    Mentions(Mentions),
    #[structopt(about = "Derive masked training contexts from extracted mentions")]
    Contexts(Contexts),
}

/// Flags shared by every pass to choose how rows are written.
#[derive(Debug, StructOpt)]
pub struct WriteFlags {
    #[structopt(
        long = "bulk",
        help = "keep rows in memory and write them in a single transaction at the end"
    )]
    pub bulk: bool,
    #[structopt(long = "commit-every", help = "number of pages between commits")]
    pub commit_every: Option<usize>,
}

impl WriteFlags {
    fn apply(&self, current: WriteMode) -> WriteMode {
        if self.bulk {
            WriteMode::Bulk
        } else if let Some(commit_every) = self.commit_every {
            WriteMode::Incremental { commit_every }
        } else {
            current
        }
    }
}

fn load_or_default<T>(path: &Option<PathBuf>) -> Result<T, Error>
where
    T: Default + serde::de::DeserializeOwned,
{
    match path {
        Some(path) => config::load(path),
        None => Ok(T::default()),
    }
}

fn overlap_policy(leftmost_longest: bool, current: OverlapPolicy) -> OverlapPolicy {
    if leftmost_longest {
        OverlapPolicy::LeftmostLongest
    } else {
        current
    }
}

#[derive(Debug, StructOpt)]
/// Graph command and parameters.
///
/// ```sh
/// wikilinks graph [FLAGS] [OPTIONS] <src> <db>
/// ```
pub struct Graph {
    #[structopt(parse(from_os_str), help = "dump location (.xml, .xml.gz or .xml.bz2)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "database location (created if needed)")]
    pub db: PathBuf,
    #[structopt(parse(from_os_str), long = "config", help = "JSON configuration file")]
    pub config: Option<PathBuf>,
    #[structopt(long = "max-pages", help = "stop after this many pages")]
    pub max_pages: Option<usize>,
    #[structopt(flatten)]
    pub write: WriteFlags,
}

impl Graph {
    pub fn config(&self) -> Result<GraphConfig, Error> {
        let mut config: GraphConfig = load_or_default(&self.config)?;
        config.write_mode = self.write.apply(config.write_mode);
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }
        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
/// Mentions command and parameters.
///
/// ```sh
/// wikilinks mentions [FLAGS] [OPTIONS] <src> <catalog> <db>
/// ```
pub struct Mentions {
    #[structopt(parse(from_os_str), help = "dump location (.xml, .xml.gz or .xml.bz2)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "entity catalog (JSON lines)")]
    pub catalog: PathBuf,
    #[structopt(parse(from_os_str), help = "database built by the graph command")]
    pub db: PathBuf,
    #[structopt(parse(from_os_str), long = "config", help = "JSON configuration file")]
    pub config: Option<PathBuf>,
    #[structopt(
        short = "w",
        long = "workers",
        help = "number of workers. Default is the number of cores minus one."
    )]
    pub workers: Option<usize>,
    #[structopt(long = "max-pages", help = "stop after this many pages")]
    pub max_pages: Option<usize>,
    #[structopt(long = "debug-radius", help = "radius of the debug context of matches")]
    pub debug_radius: Option<usize>,
    #[structopt(
        long = "leftmost-longest",
        help = "drop partially overlapping mentions instead of keeping both"
    )]
    pub leftmost_longest: bool,
    #[structopt(
        long = "graph-on-disk",
        help = "query the link graph from the database instead of loading it in memory"
    )]
    pub graph_on_disk: bool,
    #[structopt(flatten)]
    pub write: WriteFlags,
}

impl Mentions {
    pub fn config(&self) -> Result<MentionConfig, Error> {
        let mut config: MentionConfig = load_or_default(&self.config)?;
        config.write_mode = self.write.apply(config.write_mode);
        config.overlap_policy = overlap_policy(self.leftmost_longest, config.overlap_policy);
        if self.graph_on_disk {
            config.graph_storage = GraphStorage::Database;
        }
        if self.workers.is_some() {
            config.workers = self.workers;
        }
        if self.max_pages.is_some() {
            config.max_pages = self.max_pages;
        }
        if let Some(radius) = self.debug_radius {
            config.debug_radius = radius;
        }
        Ok(config)
    }
}

#[derive(Debug, StructOpt)]
/// Contexts command and parameters.
///
/// ```sh
/// wikilinks contexts [FLAGS] [OPTIONS] <catalog> <db>
/// ```
pub struct Contexts {
    #[structopt(parse(from_os_str), help = "entity catalog (JSON lines)")]
    pub catalog: PathBuf,
    #[structopt(parse(from_os_str), help = "database filled by the mentions command")]
    pub db: PathBuf,
    #[structopt(parse(from_os_str), long = "config", help = "JSON configuration file")]
    pub config: Option<PathBuf>,
    #[structopt(short = "r", long = "radius", help = "context radius, in characters")]
    pub radius: Option<usize>,
    #[structopt(long = "sentences", help = "crop contexts to whole sentences")]
    pub sentences: bool,
    #[structopt(long = "mask-char", help = "character replacing entity mentions")]
    pub mask_char: Option<char>,
    #[structopt(
        short = "n",
        long = "per-entity",
        help = "maximum number of contexts per entity"
    )]
    pub per_entity: Option<usize>,
    #[structopt(long = "seed", help = "seed used to sample matches")]
    pub seed: Option<u64>,
    #[structopt(
        long = "leftmost-longest",
        help = "drop partially overlapping mentions instead of keeping both"
    )]
    pub leftmost_longest: bool,
    #[structopt(
        parse(from_os_str),
        long = "export",
        help = "export contexts to a TSV file"
    )]
    pub export: Option<PathBuf>,
    #[structopt(flatten)]
    pub write: WriteFlags,
}

impl Contexts {
    pub fn config(&self) -> Result<ContextConfig, Error> {
        let mut config: ContextConfig = load_or_default(&self.config)?;
        config.write_mode = self.write.apply(config.write_mode);
        config.overlap_policy = overlap_policy(self.leftmost_longest, config.overlap_policy);
        if self.sentences {
            config.crop = CropMode::Sentences;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(mask_char) = self.mask_char {
            config.mask_char = mask_char;
        }
        if self.per_entity.is_some() {
            config.contexts_per_entity = self.per_entity;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}
