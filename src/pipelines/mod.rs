//! Pipelines.
//!
//! Each pass of the extraction is a pipeline, and the module
//! provides a light [Pipeline] trait that they implement.
//!
//! 1. [LinkGraphPipeline] builds the link graph,
//! 1. [MentionPipeline] extracts mentions in parallel,
//! 1. [ContextPipeline] derives masked contexts from the stored mentions.
mod contexts;
mod linkgraph;
mod mentions;
#[allow(clippy::module_inception)]
mod pipeline;
mod stats;
pub mod worker;

pub use contexts::{export_tsv, ContextPipeline};
pub use linkgraph::LinkGraphPipeline;
pub use mentions::MentionPipeline;
pub use pipeline::Pipeline;
pub use stats::{ContextStats, GraphReport, MentionReport, MentionStats, PageStats};
