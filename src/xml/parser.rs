//! Reading RDF/XML into graphs.
//!
//! The document is loaded whole into an element tree, then walked: one pass
//! over the children of `rdf:RDF` extracts each subject, and a nested pass
//! over their children extracts predicates and objects, expanding
//! collections and containers back into their triples.

use std::collections::HashSet;
use std::io::BufRead;

use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::graph::{ContainerKind, Graph};
use crate::ns::{rdf, AUTO_PREFIX};
use crate::term::{Datatype, PlainLiteral, Resource, Term, TypedLiteral};
use crate::triple::Triple;
use crate::xml::dom::{self, XmlElement};

/// Parse an RDF/XML document into a fresh graph.
pub fn parse_str(txt: &str) -> ModelResult<Graph> {
    parse_read(txt.as_bytes())
}

/// Parse an RDF/XML document from a reader into a fresh graph. The reader is
/// consumed and released whether parsing succeeds or fails.
pub fn parse_read<R: BufRead>(reader: R) -> ModelResult<Graph> {
    let mut graph = Graph::new();
    parse_into(reader, &mut graph)?;
    Ok(graph)
}

/// Parse an RDF/XML document into an existing graph. On error, triples
/// already added stay in the graph; the caller is expected to discard it.
pub fn parse_into<R: BufRead>(reader: R, graph: &mut Graph) -> ModelResult<()> {
    let root = dom::read_document(reader)?;
    if root.name != "rdf:RDF" && root.name != "RDF" {
        return Err(ModelError::XmlShape(format!(
            "expected rdf:RDF root element, found `{}`",
            root.name
        )));
    }

    let base = match root.attr(&["xml:base"]) {
        Some(base) => {
            graph.set_context(base)?;
            base.to_string()
        }
        None => root
            .attr(&["xmlns"])
            .map(str::to_string)
            .unwrap_or_else(|| graph.context().to_string()),
    };
    debug!(base = %base, "parsing RDF/XML");

    let mut walker = Walker { graph, base };
    for child in &root.children {
        walker.subject_node(child)?;
    }
    Ok(())
}

struct Walker<'g> {
    graph: &'g mut Graph,
    base: String,
}

impl Walker<'_> {
    fn subject_node(&mut self, node: &XmlElement) -> ModelResult<()> {
        let is_description = node.name == "rdf:Description" || node.name == "Description";

        let subject = if let Some(v) = node.attr(&["rdf:about", "about"]) {
            Resource::resolve(&self.base, v)?
        } else if let Some(v) = node.attr(&["rdf:nodeID", "nodeID"]) {
            Resource::blank_from_id(v)?
        } else if let Some(v) = node.attr(&["rdf:ID", "ID"]) {
            Resource::new(&format!("{}{}", self.base, v))?
        } else if is_description {
            Resource::blank()
        } else {
            return Ok(());
        };

        if !is_description {
            let type_uri = format!("{}{}", node.namespace_uri, node.local_name);
            self.add(
                subject.clone(),
                Resource::new(rdf::TYPE)?,
                Resource::resolve(&self.base, &type_uri)?,
            )?;
        }

        for pred_node in &node.children {
            self.predicate_node(&subject, pred_node)?;
        }
        Ok(())
    }

    fn predicate_node(&mut self, subject: &Resource, node: &XmlElement) -> ModelResult<()> {
        let predicate = self.predicate_resource(node)?;

        // resource object carried by an attribute
        if let Some(v) = node.attr(&["rdf:about", "about", "rdf:resource", "resource"]) {
            let object = Resource::resolve(&self.base, v)?;
            return self.add(subject.clone(), predicate, object);
        }
        if let Some(v) = node.attr(&["rdf:nodeID", "nodeID"]) {
            let object = Resource::blank_from_id(v)?;
            return self.add(subject.clone(), predicate, object);
        }

        // typed literal
        if let Some(dt) = node.attr(&["rdf:datatype"]) {
            let datatype = Datatype::from_uri(dt).unwrap_or(Datatype::String);
            let value = node.text.clone().unwrap_or_default();
            return self.add(subject.clone(), predicate, TypedLiteral::new(&value, datatype));
        }

        // literal XML content
        if node.attr(&["rdf:parseType"]) == Some("Literal") {
            let literal = TypedLiteral::new(&node.inner_xml(), Datatype::Literal);
            return self.add(subject.clone(), predicate, literal);
        }

        // plain literal
        if let Some(lang) = node.attr(&["xml:lang"]) {
            let value = node.text.clone().unwrap_or_default();
            let literal = PlainLiteral::with_language(&value, lang)?;
            return self.add(subject.clone(), predicate, literal);
        }
        if node.is_text_only() && node.attr(&["rdf:parseType"]).is_none() {
            let value = node.text.clone().unwrap_or_default();
            return self.add(subject.clone(), predicate, PlainLiteral::new(&value));
        }

        // collection
        if node.attr(&["rdf:parseType"]) == Some("Collection") {
            return self.expand_collection(subject, &predicate, node);
        }

        // nested container
        if let Some(first) = node.children.first() {
            if let Some(kind) = container_element_kind(first) {
                if !first.has_rdf_attributes() {
                    return self.expand_container(subject, &predicate, kind, first);
                }
            }
        }

        // nothing recognizable carries an object here
        Ok(())
    }

    fn predicate_resource(&self, node: &XmlElement) -> ModelResult<Resource> {
        let uri = if node.local_name.starts_with(AUTO_PREFIX) {
            node.namespace_uri.clone()
        } else if node.namespace_uri.is_empty() {
            format!("{}{}", self.base, node.local_name)
        } else {
            format!("{}{}", node.namespace_uri, node.local_name)
        };
        Resource::new(&uri)
    }

    fn expand_collection(
        &mut self,
        subject: &Resource,
        predicate: &Resource,
        node: &XmlElement,
    ) -> ModelResult<()> {
        let rdf_type = Resource::new(rdf::TYPE)?;
        let rdf_list = Resource::new(rdf::LIST)?;
        let rdf_first = Resource::new(rdf::FIRST)?;
        let rdf_rest = Resource::new(rdf::REST)?;
        let nil = Resource::new(rdf::NIL)?;

        let mut cell = Resource::blank();
        self.add(subject.clone(), predicate.clone(), cell.clone())?;

        let items: Vec<Resource> = node
            .children
            .iter()
            .map(|item| self.item_resource(item))
            .collect::<ModelResult<_>>()?;
        for (i, item) in items.iter().enumerate() {
            let next = if i + 1 < items.len() {
                Resource::blank()
            } else {
                nil.clone()
            };
            self.add(cell.clone(), rdf_type.clone(), rdf_list.clone())?;
            self.add(cell.clone(), rdf_first.clone(), item.clone())?;
            self.add(cell.clone(), rdf_rest.clone(), next.clone())?;
            cell = next;
        }
        Ok(())
    }

    /// The resource identified by a collection item element, or a fresh
    /// blank node if it carries no identity.
    fn item_resource(&self, item: &XmlElement) -> ModelResult<Resource> {
        if let Some(v) = item.attr(&["rdf:about", "about", "rdf:resource", "resource"]) {
            Resource::resolve(&self.base, v)
        } else if let Some(v) = item.attr(&["rdf:nodeID", "nodeID"]) {
            Resource::blank_from_id(v)
        } else if let Some(v) = item.attr(&["rdf:ID", "ID"]) {
            Resource::new(&format!("{}{}", self.base, v))
        } else {
            Ok(Resource::blank())
        }
    }

    fn expand_container(
        &mut self,
        subject: &Resource,
        predicate: &Resource,
        kind: ContainerKind,
        container: &XmlElement,
    ) -> ModelResult<()> {
        let bag = Resource::blank();
        self.add(subject.clone(), predicate.clone(), bag.clone())?;
        self.add(bag.clone(), Resource::new(rdf::TYPE)?, Resource::new(kind.uri())?)?;

        let mut seen = HashSet::new();
        for item in &container.children {
            if !item.local_name.starts_with('_') {
                continue;
            }
            let member = Resource::new(&format!("{}{}", rdf::URI, item.local_name))?;
            let value = self.item_value(item)?;
            if kind == ContainerKind::Alt && !seen.insert(value.to_string()) {
                continue;
            }
            self.add(bag.clone(), member, value)?;
        }
        Ok(())
    }

    /// The value of one `rdf:_N` member element: a resource if identified by
    /// an attribute, otherwise a literal from the element's content.
    fn item_value(&self, item: &XmlElement) -> ModelResult<Term> {
        if let Some(v) = item.attr(&["rdf:resource", "resource"]) {
            return Ok(Resource::resolve(&self.base, v)?.into());
        }
        if let Some(v) = item.attr(&["rdf:nodeID", "nodeID"]) {
            return Ok(Resource::blank_from_id(v)?.into());
        }
        let value = item.text.clone().unwrap_or_default();
        if let Some(dt) = item.attr(&["rdf:datatype"]) {
            let datatype = Datatype::from_uri(dt).unwrap_or(Datatype::String);
            return Ok(TypedLiteral::new(&value, datatype).into());
        }
        let lang = item.attr(&["xml:lang"]).unwrap_or_default();
        Ok(PlainLiteral::with_language(&value, lang)?.into())
    }

    fn add(
        &mut self,
        subject: Resource,
        predicate: Resource,
        object: impl Into<Term>,
    ) -> ModelResult<()> {
        let triple = Triple::new(subject, predicate, object)?;
        self.graph.insert(triple);
        Ok(())
    }
}

fn container_element_kind(node: &XmlElement) -> Option<ContainerKind> {
    let named = match node.local_name.as_str() {
        "Bag" => Some(ContainerKind::Bag),
        "Seq" => Some(ContainerKind::Seq),
        "Alt" => Some(ContainerKind::Alt),
        _ => None,
    }?;
    // in the rdf namespace, or bare with no namespace in scope; a bare name
    // captured by a foreign default xmlns is not a container
    if node.namespace_uri.is_empty() || node.namespace_uri == rdf::URI {
        Some(named)
    } else {
        None
    }
}
