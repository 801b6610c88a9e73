//! Derived graph metadata, rebuilt on every triple insertion.

use std::collections::HashMap;

use crate::graph::{ContainerKind, ItemKind};
use crate::ns::{self, rdf, Namespace};
use crate::term::{Resource, Term};
use crate::triple::{Triple, TripleFlavor};

/// One cons-cell of an RDF list, as observed in the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct CollectionItem {
    pub item_kind: ItemKind,
    pub item_value: Option<Term>,
    pub next: Option<Resource>,
}

/// Namespaces, container subjects and collection cells derived from the
/// triples of a graph. Updated incrementally on insertion; removal does not
/// shrink it, only [`GraphMetadata::clear`] does.
#[derive(Clone, Debug, Default)]
pub struct GraphMetadata {
    namespaces: Vec<Namespace>,
    containers: HashMap<Resource, ContainerKind>,
    collections: HashMap<Resource, CollectionItem>,
}

impl GraphMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespaces touched by any component of any triple, in first-seen order.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn containers(&self) -> &HashMap<Resource, ContainerKind> {
        &self.containers
    }

    pub fn collections(&self) -> &HashMap<Resource, CollectionItem> {
        &self.collections
    }

    pub fn clear(&mut self) {
        self.namespaces.clear();
        self.containers.clear();
        self.collections.clear();
    }

    pub(crate) fn update(&mut self, t: &Triple) {
        self.collect_namespaces(t);
        self.collect_containers(t);
        self.collect_collections(t);
    }

    fn collect_namespaces(&mut self, t: &Triple) {
        let mut components: Vec<&str> = vec![t.subject().uri(), t.predicate().uri()];
        match t.object() {
            Term::Resource(r) => components.push(r.uri()),
            Term::TypedLiteral(l) => components.push(l.datatype().uri()),
            Term::PlainLiteral(_) => {}
        }
        for ns in ns::snapshot() {
            if self.namespaces.contains(&ns) {
                continue;
            }
            let prefixed = format!("{}:", ns.prefix());
            if components
                .iter()
                .any(|c| c.contains(ns.uri()) || c.starts_with(&prefixed))
            {
                self.namespaces.push(ns);
            }
        }
    }

    fn collect_containers(&mut self, t: &Triple) {
        if t.flavor() != TripleFlavor::Spo || t.predicate().uri() != rdf::TYPE {
            return;
        }
        let kind = match t.object() {
            Term::Resource(r) => match ContainerKind::from_uri(r.uri()) {
                Some(k) => k,
                None => return,
            },
            _ => return,
        };
        self.containers.entry(t.subject().clone()).or_insert(kind);
    }

    fn collect_collections(&mut self, t: &Triple) {
        let subject = t.subject();
        match (t.predicate().uri(), t.object()) {
            (rdf::TYPE, Term::Resource(r)) if r.uri() == rdf::LIST => {
                self.collections
                    .entry(subject.clone())
                    .or_insert(CollectionItem {
                        item_kind: ItemKind::Resource,
                        item_value: None,
                        next: None,
                    });
            }
            (rdf::FIRST, value) => {
                if let Some(cell) = self.collections.get_mut(subject) {
                    cell.item_kind = if value.is_resource() {
                        ItemKind::Resource
                    } else {
                        ItemKind::Literal
                    };
                    cell.item_value = Some(value.clone());
                }
            }
            (rdf::REST, Term::Resource(next)) => {
                if let Some(cell) = self.collections.get_mut(subject) {
                    cell.next = Some(next.clone());
                }
            }
            _ => {}
        }
    }
}
