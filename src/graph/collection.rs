//! RDF lists built from `rdf:first` / `rdf:rest` cons-cells.

use crate::error::{ModelError, ModelResult};
use crate::graph::ItemKind;
use crate::ns::rdf;
use crate::term::{Resource, Term};
use crate::triple::Triple;

/// A builder for an RDF collection: an ordered run of same-kinded items
/// that reifies into a chain of cons-cells terminated by `rdf:nil`.
#[derive(Clone, Debug, PartialEq)]
pub struct Collection {
    item_kind: ItemKind,
    items: Vec<Term>,
}

impl Collection {
    pub fn new(item_kind: ItemKind) -> Self {
        Collection {
            item_kind,
            items: Vec::new(),
        }
    }

    pub fn item_kind(&self) -> ItemKind {
        self.item_kind
    }

    pub fn items(&self) -> &[Term] {
        &self.items
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    pub fn add_item(&mut self, item: impl Into<Term>) -> ModelResult<&mut Self> {
        let item = item.into();
        let got = ItemKind::of(&item);
        if got != self.item_kind {
            return Err(ModelError::MixedItemKinds {
                expected: self.item_kind,
                got,
            });
        }
        self.items.push(item);
        Ok(self)
    }

    /// The cons-cell triples for this collection, with `head` as the first
    /// cell. Every cell gets `rdf:type rdf:List`, `rdf:first` and `rdf:rest`;
    /// the last `rdf:rest` points at `rdf:nil`. An empty collection reifies
    /// to nothing.
    pub fn reify(&self, head: &Resource) -> ModelResult<Vec<Triple>> {
        let mut triples = Vec::with_capacity(self.items.len() * 3);
        if self.items.is_empty() {
            return Ok(triples);
        }
        let rdf_type = Resource::new(rdf::TYPE)?;
        let rdf_list = Resource::new(rdf::LIST)?;
        let rdf_first = Resource::new(rdf::FIRST)?;
        let rdf_rest = Resource::new(rdf::REST)?;
        let nil = Resource::new(rdf::NIL)?;

        let mut cell = head.clone();
        for (i, item) in self.items.iter().enumerate() {
            let next = if i + 1 < self.items.len() {
                Resource::blank()
            } else {
                nil.clone()
            };
            triples.push(Triple::new(cell.clone(), rdf_type.clone(), rdf_list.clone())?);
            triples.push(Triple::new(cell.clone(), rdf_first.clone(), item.clone())?);
            triples.push(Triple::new(cell, rdf_rest.clone(), next.clone())?);
            cell = next;
        }
        Ok(triples)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn res(uri: &str) -> Resource {
        Resource::new(uri).unwrap()
    }

    #[test]
    fn reify_chains_cells_to_nil() {
        let mut coll = Collection::new(ItemKind::Resource);
        coll.add_item(res("http://e/a")).unwrap();
        coll.add_item(res("http://e/b")).unwrap();
        let head = Resource::blank();
        let triples = coll.reify(&head).unwrap();
        assert_eq!(triples.len(), 6);

        // first cell
        assert_eq!(triples[0].subject(), &head);
        assert_eq!(triples[1].predicate().uri(), rdf::FIRST);
        assert_eq!(triples[1].object().lexical_value(), "http://e/a");
        // rest of the first cell is the subject of the second
        let second = match triples[2].object() {
            Term::Resource(r) => r.clone(),
            _ => panic!("rest must be a resource"),
        };
        assert_eq!(triples[3].subject(), &second);
        // final rest is nil
        assert_eq!(triples[5].object().lexical_value(), rdf::NIL);
    }

    #[test]
    fn empty_collection_reifies_to_nothing() {
        let coll = Collection::new(ItemKind::Resource);
        assert!(coll.reify(&Resource::blank()).unwrap().is_empty());
    }
}
