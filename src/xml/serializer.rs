//! Writing graphs as RDF/XML.
//!
//! The graph is grouped by subject, the groups are turned into an element
//! tree (containers and resource collections are folded into their
//! referencing predicate), and the tree is written out with
//! [`quick_xml::Writer`].

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use crate::error::ModelResult;
use crate::graph::{ContainerKind, Graph, ItemKind};
use crate::ns::{self, rdf};
use crate::term::{Resource, Term};
use crate::triple::Triple;
use crate::xml::dom::XmlElement;

/// Serialize `graph` into `write` as UTF-8 RDF/XML.
pub fn write_graph<W: Write>(graph: &Graph, write: W) -> ModelResult<()> {
    debug!(context = graph.context(), triples = graph.len(), "serializing RDF/XML");
    let root = build_document(graph)?;
    let mut writer = Writer::new_with_indent(write, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_element(&mut writer, &root)?;
    Ok(())
}

/// Serialize `graph` to an RDF/XML string.
pub fn to_string(graph: &Graph) -> ModelResult<String> {
    let mut out = Vec::new();
    write_graph(graph, &mut out)?;
    String::from_utf8(out).map_err(|e| crate::error::ModelError::XmlShape(e.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, elem: &XmlElement) -> ModelResult<()> {
    let mut start = BytesStart::new(elem.name.as_str());
    for (k, v) in &elem.attributes {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if elem.children.is_empty() && elem.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &elem.children {
        write_element(writer, child)?;
    }
    if let Some(text) = &elem.text {
        writer.write_event(Event::Text(BytesText::new(text.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new(elem.name.as_str())))?;
    Ok(())
}

struct SubjectGroups<'g> {
    groups: BTreeMap<String, Vec<&'g Triple>>,
}

impl<'g> SubjectGroups<'g> {
    fn new(graph: &'g Graph) -> Self {
        let mut groups: BTreeMap<String, Vec<&Triple>> = BTreeMap::new();
        for t in graph.iter() {
            groups.entry(t.subject().uri().to_string()).or_default().push(t);
        }
        SubjectGroups { groups }
    }
}

struct Serializer<'g> {
    graph: &'g Graph,
    /// Resources that occur as the object of some triple; everything else is
    /// floating and must be emitted inline.
    objects: HashSet<String>,
    /// Container elements already folded under a referencing predicate.
    embedded: HashSet<String>,
    /// Containers currently being built, to cut reference cycles.
    in_progress: HashSet<String>,
}

fn build_document(graph: &Graph) -> ModelResult<XmlElement> {
    let mut root = XmlElement::new("rdf:RDF");
    root.set_attr("xmlns:rdf", rdf::URI);
    for ns in graph.metadata().namespaces() {
        if ns.prefix() == rdf::PREFIX || ns.prefix() == "base" {
            continue;
        }
        root.set_attr(format!("xmlns:{}", ns.prefix()), ns.uri());
    }
    root.set_attr("xml:base", graph.context());

    let groups = SubjectGroups::new(graph);
    let objects: HashSet<String> = graph
        .iter()
        .filter_map(|t| t.object().as_resource())
        .map(|r| r.uri().to_string())
        .collect();
    let mut ser = Serializer {
        graph,
        objects,
        embedded: HashSet::new(),
        in_progress: HashSet::new(),
    };

    for (subject_uri, triples) in &groups.groups {
        let subject = triples[0].subject();
        if ser.is_embeddable_container(subject_uri) {
            // folded under its referencing predicate
            continue;
        }
        if ser.is_embeddable_collection_cell(subject_uri) {
            // rebuilt inline through rdf:parseType="Collection"
            continue;
        }
        let elem = ser.description_element(subject, triples, &groups)?;
        root.children.push(elem);
    }
    Ok(root)
}

impl<'g> Serializer<'g> {
    fn is_floating(&self, subject_uri: &str) -> bool {
        !self.objects.contains(subject_uri)
    }

    fn container_kind(&self, subject_uri: &str) -> Option<ContainerKind> {
        self.graph
            .metadata()
            .containers()
            .iter()
            .find(|(r, _)| r.uri() == subject_uri)
            .map(|(_, k)| *k)
    }

    fn is_embeddable_container(&self, subject_uri: &str) -> bool {
        self.container_kind(subject_uri).is_some() && !self.is_floating(subject_uri)
    }

    /// A cons-cell with resource items that some predicate can reconstruct.
    fn is_embeddable_collection_cell(&self, subject_uri: &str) -> bool {
        self.graph
            .metadata()
            .collections()
            .iter()
            .any(|(r, cell)| r.uri() == subject_uri && cell.item_kind == ItemKind::Resource)
            && !self.is_floating(subject_uri)
    }

    /// A plain `rdf:Description` element for one subject group.
    fn description_element(
        &mut self,
        subject: &Resource,
        triples: &[&'g Triple],
        groups: &SubjectGroups<'g>,
    ) -> ModelResult<XmlElement> {
        let mut elem = XmlElement::new("rdf:Description");
        self.set_identity(&mut elem, subject);
        self.append_predicates(&mut elem, triples, false, groups)?;
        Ok(elem)
    }

    /// A container element (`rdf:Bag` etc.) carrying no identity attributes,
    /// ready to be folded under the referencing predicate.
    fn container_element(
        &mut self,
        kind: ContainerKind,
        subject_uri: &str,
        groups: &SubjectGroups<'g>,
    ) -> ModelResult<XmlElement> {
        let mut elem = XmlElement::new(&format!("rdf:{}", kind.local_name()));
        if let Some(triples) = groups.groups.get(subject_uri) {
            let triples = triples.clone();
            self.append_predicates(&mut elem, &triples, true, groups)?;
        }
        Ok(elem)
    }

    fn set_identity(&self, elem: &mut XmlElement, subject: &Resource) {
        match subject.bnode_id() {
            Some(id) => elem.set_attr("rdf:nodeID", id),
            None => elem.set_attr("rdf:about", subject.uri()),
        }
    }

    fn append_predicates(
        &mut self,
        elem: &mut XmlElement,
        triples: &[&'g Triple],
        elem_is_container: bool,
        groups: &SubjectGroups<'g>,
    ) -> ModelResult<()> {
        for t in triples {
            if elem_is_container && t.predicate().uri() == rdf::TYPE {
                // implied by the container element's own name
                continue;
            }
            let mut pred = self.predicate_element(t.predicate());
            self.render_object(&mut pred, t.object(), groups)?;
            elem.children.push(pred);
        }
        Ok(())
    }

    fn predicate_element(&self, predicate: &Resource) -> XmlElement {
        let uri = predicate.uri();
        let cut = uri
            .rfind(|c| c == '#' || c == '/')
            .map(|i| i + 1)
            .unwrap_or(uri.len());
        let (ns_uri, local) = uri.split_at(cut);

        // a predicate inside the graph's own context namespace is written
        // bare, with no declaration; the reader resolves it against xml:base
        if !local.is_empty() && ns_uri == self.graph.context() {
            return XmlElement::new(local);
        }

        // a registered namespace yields a prefixed name, as long as the
        // remainder is usable as a local name
        if let Some(ns) = ns::namespace_of(uri) {
            if !ns.is_auto() {
                let reg_local = uri.strip_prefix(ns.uri()).unwrap_or("");
                let clean = reg_local.trim_start_matches('#');
                if !reg_local.is_empty()
                    && !clean.contains(|c| c == '/' || c == '#' || c == ':')
                {
                    let qname = format!("{}:{}", ns.prefix(), reg_local)
                        .replace(":#", ":")
                        .trim_end_matches(|c| c == ':' || c == '/')
                        .to_string();
                    return XmlElement::new(&qname);
                }
            }
        }

        // no usable prefix: declare the namespace on the element itself; the
        // generated prefix never appears, except as the element name itself
        // when the IRI has no local part at all
        let ns = ns::auto_namespace(uri);
        let name = if local.is_empty() { ns.prefix() } else { local };
        let mut elem = XmlElement::new(name);
        elem.set_attr("xmlns", ns.uri());
        elem
    }

    fn render_object(
        &mut self,
        pred: &mut XmlElement,
        object: &Term,
        groups: &SubjectGroups<'g>,
    ) -> ModelResult<()> {
        match object {
            Term::Resource(r) => self.render_resource_object(pred, r, groups),
            Term::PlainLiteral(l) => {
                if let Some(lang) = l.language() {
                    pred.set_attr("xml:lang", lang);
                }
                pred.text = Some(l.value().to_string());
                Ok(())
            }
            Term::TypedLiteral(l) => {
                pred.set_attr("rdf:datatype", l.datatype().uri());
                pred.text = Some(l.value().to_string());
                Ok(())
            }
        }
    }

    fn render_resource_object(
        &mut self,
        pred: &mut XmlElement,
        object: &Resource,
        groups: &SubjectGroups<'g>,
    ) -> ModelResult<()> {
        let uri = object.uri();

        // a container is folded in at its first reference
        if let Some(kind) = self.container_kind(uri) {
            if !self.is_floating(uri)
                && !self.embedded.contains(uri)
                && !self.in_progress.contains(uri)
            {
                self.in_progress.insert(uri.to_string());
                let container = self.container_element(kind, uri, groups)?;
                self.in_progress.remove(uri);
                self.embedded.insert(uri.to_string());
                pred.children.push(container);
                return Ok(());
            }
        }

        // a resource collection head is rebuilt inline
        if self.is_embeddable_collection_cell(uri) {
            pred.set_attr("rdf:parseType", "Collection");
            let mut visited = HashSet::new();
            let mut cursor = Some(object.clone());
            while let Some(cell_id) = cursor {
                if cell_id.uri() == rdf::NIL || !visited.insert(cell_id.clone()) {
                    break;
                }
                let cell = match self.collection_cell(cell_id.uri()) {
                    Some(c) => c,
                    None => break,
                };
                if let Some(Term::Resource(item)) = cell.0 {
                    let mut item_elem = XmlElement::new("rdf:Description");
                    self.set_identity(&mut item_elem, &item);
                    pred.children.push(item_elem);
                }
                cursor = cell.1;
            }
            return Ok(());
        }

        match object.bnode_id() {
            Some(id) => pred.set_attr("rdf:nodeID", id),
            None => pred.set_attr("rdf:resource", uri),
        }
        Ok(())
    }

    fn collection_cell(&self, uri: &str) -> Option<(Option<Term>, Option<Resource>)> {
        self.graph
            .metadata()
            .collections()
            .iter()
            .find(|(r, _)| r.uri() == uri)
            .map(|(_, cell)| (cell.item_value.clone(), cell.next.clone()))
    }
}
