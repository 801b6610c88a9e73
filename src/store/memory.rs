//! An in-memory quadruple store.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::StoreResult;
use crate::graph::Graph;
use crate::term::{Resource, Term};
use crate::triple::Quadruple;

use super::Store;

/// A store holding its quadruples in a map keyed by their stable id.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    quadruples: HashMap<i64, Quadruple>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.quadruples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quadruples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quadruple> {
        self.quadruples.values()
    }

    fn remove_where<F: Fn(&Quadruple) -> bool>(&mut self, pred: F) -> usize {
        let before = self.quadruples.len();
        self.quadruples.retain(|_, q| !pred(q));
        before - self.quadruples.len()
    }
}

impl Store for MemoryStore {
    fn add_quadruple(&mut self, q: Quadruple) -> StoreResult<bool> {
        trace!(quadruple = %q, "store insert");
        Ok(self.quadruples.insert(q.id(), q).is_none())
    }

    fn remove_quadruple(&mut self, q: &Quadruple) -> StoreResult<bool> {
        Ok(self.quadruples.remove(&q.id()).is_some())
    }

    fn remove_by_context(&mut self, context: &Resource) -> StoreResult<usize> {
        Ok(self.remove_where(|q| q.context() == context))
    }

    fn remove_by_subject(&mut self, subject: &Resource) -> StoreResult<usize> {
        Ok(self.remove_where(|q| q.subject() == subject))
    }

    fn remove_by_predicate(&mut self, predicate: &Resource) -> StoreResult<usize> {
        Ok(self.remove_where(|q| q.predicate() == predicate))
    }

    fn remove_by_object(&mut self, object: &Resource) -> StoreResult<usize> {
        Ok(self.remove_where(|q| q.object().as_resource() == Some(object)))
    }

    fn remove_by_literal(&mut self, literal: &Term) -> StoreResult<usize> {
        if literal.is_resource() {
            return Ok(0);
        }
        Ok(self.remove_where(|q| q.object() == literal))
    }

    fn clear(&mut self) -> StoreResult<()> {
        self.quadruples.clear();
        Ok(())
    }

    fn contains(&self, q: &Quadruple) -> StoreResult<bool> {
        Ok(self.quadruples.contains_key(&q.id()))
    }

    fn select_quadruples(
        &self,
        context: Option<&Resource>,
        subject: Option<&Resource>,
        predicate: Option<&Resource>,
        object: Option<&Resource>,
        literal: Option<&Term>,
    ) -> StoreResult<Vec<Quadruple>> {
        let selected = self
            .quadruples
            .values()
            .filter(|q| context.map_or(true, |c| q.context() == c))
            .filter(|q| subject.map_or(true, |s| q.subject() == s))
            .filter(|q| predicate.map_or(true, |p| q.predicate() == p))
            .filter(|q| object.map_or(true, |o| q.object().as_resource() == Some(o)))
            .filter(|q| literal.map_or(true, |l| q.object() == l))
            .cloned()
            .collect();
        Ok(selected)
    }

    fn extract_graphs(&self) -> StoreResult<Vec<Graph>> {
        let mut graphs: Vec<Graph> = Vec::new();
        for q in self.quadruples.values() {
            let context = q.context().uri();
            let idx = match graphs.iter().position(|g| g.context() == context) {
                Some(idx) => idx,
                None => {
                    graphs.push(Graph::with_context(context)?);
                    graphs.len() - 1
                }
            };
            graphs[idx].insert(q.triple().clone());
        }
        Ok(graphs)
    }

    fn merge_graph(&mut self, graph: &Graph) -> StoreResult<()> {
        debug!(context = graph.context(), triples = graph.len(), "merging graph into store");
        let context = Resource::new(graph.context())?;
        for t in graph.iter() {
            let q = Quadruple::from_triple(context.clone(), t.clone())?;
            self.quadruples.insert(q.id(), q);
        }
        Ok(())
    }
}
