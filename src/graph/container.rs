//! Bag / Seq / Alt containers.

use std::fmt;

use crate::error::{ModelError, ModelResult};
use crate::ns::rdf;
use crate::term::{Resource, Term};
use crate::triple::Triple;

/// The three container kinds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContainerKind {
    Bag,
    Seq,
    Alt,
}

impl ContainerKind {
    pub fn uri(self) -> &'static str {
        match self {
            ContainerKind::Bag => rdf::BAG,
            ContainerKind::Seq => rdf::SEQ,
            ContainerKind::Alt => rdf::ALT,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            rdf::BAG => Some(ContainerKind::Bag),
            rdf::SEQ => Some(ContainerKind::Seq),
            rdf::ALT => Some(ContainerKind::Alt),
            _ => None,
        }
    }

    /// The bare element name used in RDF/XML (`Bag`, `Seq`, `Alt`).
    pub fn local_name(self) -> &'static str {
        match self {
            ContainerKind::Bag => "Bag",
            ContainerKind::Seq => "Seq",
            ContainerKind::Alt => "Alt",
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.local_name())
    }
}

/// Whether the members of a container or collection are resources or
/// literals. The two kinds never mix within one container.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ItemKind {
    Resource,
    Literal,
}

impl ItemKind {
    pub fn of(term: &Term) -> Self {
        if term.is_resource() {
            ItemKind::Resource
        } else {
            ItemKind::Literal
        }
    }
}

/// A typed sequence of same-kinded items. `Alt` containers refuse duplicate
/// values.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    kind: ContainerKind,
    item_kind: ItemKind,
    items: Vec<Term>,
}

impl Container {
    pub fn new(kind: ContainerKind, item_kind: ItemKind) -> Self {
        Container {
            kind,
            item_kind,
            items: Vec::new(),
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
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

    /// Append an item. The item kind must match the container's; an `Alt`
    /// container silently drops values it already holds.
    pub fn add_item(&mut self, item: impl Into<Term>) -> ModelResult<&mut Self> {
        let item = item.into();
        let got = ItemKind::of(&item);
        if got != self.item_kind {
            return Err(ModelError::MixedItemKinds {
                expected: self.item_kind,
                got,
            });
        }
        if self.kind == ContainerKind::Alt && self.items.contains(&item) {
            return Ok(self);
        }
        self.items.push(item);
        Ok(self)
    }

    /// The triples stating that `subject` is this container: one `rdf:type`
    /// plus one `rdf:_N` membership triple per item.
    pub fn reify(&self, subject: &Resource) -> ModelResult<Vec<Triple>> {
        let mut triples = Vec::with_capacity(self.items.len() + 1);
        triples.push(Triple::new(
            subject.clone(),
            Resource::new(rdf::TYPE)?,
            Resource::new(self.kind.uri())?,
        )?);
        for (i, item) in self.items.iter().enumerate() {
            triples.push(Triple::new(
                subject.clone(),
                Resource::new(&rdf::member(i + 1))?,
                item.clone(),
            )?);
        }
        Ok(triples)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ns::rdf;

    fn res(uri: &str) -> Resource {
        Resource::new(uri).unwrap()
    }

    #[test]
    fn bag_of_two_resources_reifies() {
        let mut bag = Container::new(ContainerKind::Bag, ItemKind::Resource);
        bag.add_item(res("http://e/a")).unwrap();
        bag.add_item(res("http://e/b")).unwrap();
        let subject = Resource::blank();
        let triples = bag.reify(&subject).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].predicate().uri(), rdf::TYPE);
        assert_eq!(triples[0].object().lexical_value(), rdf::BAG);
        assert_eq!(triples[1].predicate().uri(), rdf::member(1));
        assert_eq!(triples[1].object().lexical_value(), "http://e/a");
        assert_eq!(triples[2].predicate().uri(), rdf::member(2));
        assert_eq!(triples[2].object().lexical_value(), "http://e/b");
    }

    #[test]
    fn alt_rejects_duplicates() {
        let mut alt = Container::new(ContainerKind::Alt, ItemKind::Resource);
        alt.add_item(res("http://e/x")).unwrap();
        alt.add_item(res("http://e/x")).unwrap();
        assert_eq!(alt.items_count(), 1);
    }

    #[test]
    fn bag_keeps_duplicates() {
        let mut bag = Container::new(ContainerKind::Bag, ItemKind::Resource);
        bag.add_item(res("http://e/x")).unwrap();
        bag.add_item(res("http://e/x")).unwrap();
        assert_eq!(bag.items_count(), 2);
    }

    #[test]
    fn mixed_item_kinds_rejected() {
        let mut bag = Container::new(ContainerKind::Bag, ItemKind::Resource);
        let err = bag.add_item(crate::term::PlainLiteral::new("v"));
        assert!(err.is_err());
    }

    #[test]
    fn empty_container_reifies_to_type_only() {
        let bag = Container::new(ContainerKind::Bag, ItemKind::Literal);
        let triples = bag.reify(&Resource::blank()).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].predicate().uri(), rdf::TYPE);
    }
}
