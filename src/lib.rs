/*! # wikilinks

Entity mention extraction from wiki dumps.

A dump is read three times:

1. the link graph of the wiki is built and stored ([pipelines::LinkGraphPipeline]),
1. mentions of catalog entities are found in every page, and kept only if the entity's
   page is linked to or from the page ([pipelines::MentionPipeline]),
1. masked training contexts are derived from the stored mentions ([pipelines::ContextPipeline]).
!*/
pub mod candidates;
pub mod config;
pub mod contexts;
pub mod error;
pub mod filtering;
pub mod graph;
pub mod matching;
pub mod pipelines;
pub mod sources;
pub mod store;
