//! In-memory link graph.
//!
//! Loaded once and shared read-only between workers. Edge ends are resolved
//! through redirects when loading.
use std::{
    collections::{HashMap, HashSet},
    hash::BuildHasherDefault,
};

use log::info;
use twox_hash::XxHash64;

use crate::error::Error;
use crate::store::Database;

use super::{LinkEdge, Neighbors, PageHash, RedirectMap};

type Adjacency = HashMap<PageHash, Vec<PageHash>, BuildHasherDefault<XxHash64>>;

#[derive(Debug, Default)]
pub struct LinkGraph {
    forward: Adjacency,
    backward: Adjacency,
}

impl LinkGraph {
    pub fn from_edges<I: IntoIterator<Item = LinkEdge>>(edges: I) -> Self {
        let mut graph = Self::default();
        for edge in edges {
            graph.insert(edge);
        }
        graph.compact();
        graph
    }

    /// Build a graph whose edges point to the articles redirects lead to.
    pub fn from_edges_through<I>(edges: I, redirects: &RedirectMap) -> Self
    where
        I: IntoIterator<Item = LinkEdge>,
    {
        Self::from_edges(edges.into_iter().map(|edge| redirects.resolve_edge(edge)))
    }

    /// Load every edge of the store, resolving redirects.
    pub fn load(db: &Database) -> Result<Self, Error> {
        let redirects = db.redirect_map()?;
        let mut graph = Self::default();
        let nb_edges = db.for_each_edge(|edge| graph.insert(redirects.resolve_edge(edge)))?;
        graph.compact();
        info!(
            "loaded link graph: {} edges, {} redirects, {} linking pages, {} linked pages",
            nb_edges,
            redirects.len(),
            graph.forward.len(),
            graph.backward.len()
        );
        Ok(graph)
    }

    fn insert(&mut self, edge: LinkEdge) {
        self.forward.entry(edge.from).or_default().push(edge.to);
        self.backward.entry(edge.to).or_default().push(edge.from);
    }

    /// Remove duplicate edges.
    fn compact(&mut self) {
        for targets in self.forward.values_mut().chain(self.backward.values_mut()) {
            targets.sort_unstable();
            targets.dedup();
            targets.shrink_to_fit();
        }
    }

    fn lookup(adjacency: &Adjacency, page: PageHash) -> HashSet<PageHash> {
        adjacency
            .get(&page)
            .map(|pages| pages.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Neighbors for LinkGraph {
    fn linked_to(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        Ok(Self::lookup(&self.forward, page))
    }

    fn linked_from(&self, page: PageHash) -> Result<HashSet<PageHash>, Error> {
        Ok(Self::lookup(&self.backward, page))
    }
}
