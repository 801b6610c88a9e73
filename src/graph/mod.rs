//! In-memory RDF graphs.
//!
//! A [`Graph`] is an unordered, duplicate-free set of triples together with a
//! context IRI (the base of the graph) and a [`GraphMetadata`] collector that
//! is rebuilt on every insertion.

use std::collections::HashSet;
use std::fmt;

use tracing::trace;

use crate::error::{ModelError, ModelResult};
use crate::ns::DEFAULT_BASE;
use crate::term::{Resource, Term};
use crate::triple::Triple;

mod collection;
mod container;
mod metadata;

pub use collection::Collection;
pub use container::{Container, ContainerKind, ItemKind};
pub use metadata::{CollectionItem, GraphMetadata};

/// An unordered set of triples with a context IRI and derived metadata.
#[derive(Clone, Debug)]
pub struct Graph {
    context: String,
    triples: HashSet<Triple>,
    metadata: GraphMetadata,
}

impl Graph {
    /// An empty graph with the default context.
    pub fn new() -> Self {
        Graph {
            context: DEFAULT_BASE.to_string(),
            triples: HashSet::new(),
            metadata: GraphMetadata::new(),
        }
    }

    /// An empty graph with the given context IRI.
    pub fn with_context(context: &str) -> ModelResult<Self> {
        let mut g = Graph::new();
        g.set_context(context)?;
        Ok(g)
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Change the context. The context must be an absolute, non-blank IRI.
    pub fn set_context(&mut self, context: &str) -> ModelResult<()> {
        let r = Resource::new(context)?;
        if r.is_blank() {
            return Err(ModelError::BlankNode("a graph context"));
        }
        self.context = context.to_string();
        Ok(())
    }

    /// Insert a triple; returns whether it was new. Metadata is updated on
    /// every successful insertion.
    pub fn insert(&mut self, t: Triple) -> bool {
        let added = self.triples.insert(t.clone());
        if added {
            trace!(triple = %t, "graph insert");
            self.metadata.update(&t);
        }
        added
    }

    /// Remove a triple; returns whether it was present. Metadata is not
    /// shrunk by removals.
    pub fn remove(&mut self, t: &Triple) -> bool {
        self.triples.remove(t)
    }

    pub fn contains(&self, t: &Triple) -> bool {
        self.triples.contains(t)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Drop every triple and reset the metadata.
    pub fn clear(&mut self) {
        self.triples.clear();
        self.metadata.clear();
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    /// Triples matching the given components; `None` matches anything.
    pub fn select(
        &self,
        subject: Option<&Resource>,
        predicate: Option<&Resource>,
        object: Option<&Term>,
    ) -> Vec<&Triple> {
        self.triples
            .iter()
            .filter(|t| subject.map_or(true, |s| t.subject() == s))
            .filter(|t| predicate.map_or(true, |p| t.predicate() == p))
            .filter(|t| object.map_or(true, |o| t.object() == o))
            .collect()
    }

    /// Reify `container` under `subject` and insert the resulting triples.
    pub fn insert_container(
        &mut self,
        subject: &Resource,
        container: &Container,
    ) -> ModelResult<()> {
        for t in container.reify(subject)? {
            self.insert(t);
        }
        Ok(())
    }

    /// Reify `collection` starting at `head` and insert the resulting triples.
    pub fn insert_collection(
        &mut self,
        head: &Resource,
        collection: &Collection,
    ) -> ModelResult<()> {
        for t in collection.reify(head)? {
            self.insert(t);
        }
        Ok(())
    }

    /// Insert every triple of `other` into this graph.
    pub fn merge(&mut self, other: &Graph) {
        for t in other.iter() {
            self.insert(t.clone());
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.context == other.context && self.triples == other.triples
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.context)
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for t in iter {
            self.insert(t);
        }
    }
}
