use std::collections::HashMap;

use crate::graph::{Container, ContainerKind, Graph, ItemKind};
use crate::ns::{self, rdf, DEFAULT_BASE};
use crate::term::{Datatype, PlainLiteral, Resource, Term, TypedLiteral};
use crate::triple::Triple;
use crate::xml::{parser, serializer};

fn res(uri: &str) -> Resource {
    Resource::new(uri).unwrap()
}

fn triple(s: &str, p: &str, o: &str) -> Triple {
    Triple::new(res(s), res(p), res(o)).unwrap()
}

fn register_example_ns() {
    ns::register(ns::Namespace::new("ex", "http://example.org/").unwrap());
}

/// Whether two graphs hold the same triples up to a bijective renaming of
/// blank nodes. Backtracking search; fine for test-sized graphs.
fn isomorphic(a: &Graph, b: &Graph) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let ta: Vec<&Triple> = a.iter().collect();
    let tb: Vec<&Triple> = b.iter().collect();
    let mut used = vec![false; tb.len()];
    let mut map = HashMap::new();
    let mut rev = HashMap::new();
    try_match(0, &ta, &tb, &mut used, &mut map, &mut rev)
}

fn try_match(
    i: usize,
    ta: &[&Triple],
    tb: &[&Triple],
    used: &mut [bool],
    map: &mut HashMap<String, String>,
    rev: &mut HashMap<String, String>,
) -> bool {
    if i == ta.len() {
        return true;
    }
    for j in 0..tb.len() {
        if used[j] {
            continue;
        }
        let saved_map = map.clone();
        let saved_rev = rev.clone();
        if unify_triple(ta[i], tb[j], map, rev) {
            used[j] = true;
            if try_match(i + 1, ta, tb, used, map, rev) {
                return true;
            }
            used[j] = false;
        }
        *map = saved_map;
        *rev = saved_rev;
    }
    false
}

fn unify_triple(
    x: &Triple,
    y: &Triple,
    map: &mut HashMap<String, String>,
    rev: &mut HashMap<String, String>,
) -> bool {
    unify_resource(x.subject(), y.subject(), map, rev)
        && unify_resource(x.predicate(), y.predicate(), map, rev)
        && unify_term(x.object(), y.object(), map, rev)
}

fn unify_resource(
    a: &Resource,
    b: &Resource,
    map: &mut HashMap<String, String>,
    rev: &mut HashMap<String, String>,
) -> bool {
    match (a.bnode_id(), b.bnode_id()) {
        (Some(ia), Some(ib)) => match map.get(ia) {
            Some(mapped) => mapped == ib,
            None => {
                if rev.contains_key(ib) {
                    false
                } else {
                    map.insert(ia.to_string(), ib.to_string());
                    rev.insert(ib.to_string(), ia.to_string());
                    true
                }
            }
        },
        (None, None) => a == b,
        _ => false,
    }
}

fn unify_term(
    a: &Term,
    b: &Term,
    map: &mut HashMap<String, String>,
    rev: &mut HashMap<String, String>,
) -> bool {
    match (a, b) {
        (Term::Resource(ra), Term::Resource(rb)) => unify_resource(ra, rb, map, rev),
        _ => a == b,
    }
}

fn roundtrip(g: &Graph) -> Graph {
    let out = serializer::to_string(g).unwrap();
    parser::parse_str(&out).unwrap()
}

#[test]
fn empty_graph_serializes_to_bare_root() {
    let g = Graph::new();
    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("<rdf:RDF"));
    assert!(out.contains("xmlns:rdf=\"http://www.w3.org/1999/02/22-rdf-syntax-ns#\""));
    assert!(out.contains(&format!("xml:base=\"{DEFAULT_BASE}\"")));
    assert!(!out.contains("xmlns:base"));

    let back = parser::parse_str(&out).unwrap();
    assert!(back.is_empty());
    assert_eq!(back.context(), DEFAULT_BASE);
}

#[test]
fn resource_objects_roundtrip() {
    register_example_ns();
    let mut g = Graph::new();
    g.insert(triple("http://example.org/s", "http://example.org/p", "http://example.org/o"));
    g.insert(triple("http://example.org/o", "http://example.org/p2", "http://example.org/s"));

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("rdf:about=\"http://example.org/s\""));
    assert!(out.contains("rdf:resource=\"http://example.org/o\""));
    assert!(out.contains("xmlns:ex=\"http://example.org/\""));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn blank_node_identifiers_survive_exactly() {
    register_example_ns();
    let mut g = Graph::new();
    g.insert(triple("bnode:me", "http://example.org/p", "http://example.org/o"));
    g.insert(triple("http://example.org/s", "http://example.org/q", "bnode:me"));

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("rdf:nodeID=\"me\""));
    assert!(!out.contains("bnode:me"));

    let back = roundtrip(&g);
    assert_eq!(g.len(), back.len());
    for t in g.iter() {
        assert!(back.contains(t), "missing {t}");
    }
}

#[test]
fn typed_literal_roundtrips() {
    let mut g = Graph::new();
    let s = format!("{DEFAULT_BASE}s");
    let p = format!("{DEFAULT_BASE}p");
    g.insert(
        Triple::new(
            res(&s),
            res(&p),
            TypedLiteral::new("42", Datatype::Integer),
        )
        .unwrap(),
    );

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("rdf:datatype=\"http://www.w3.org/2001/XMLSchema#integer\""));
    assert!(out.contains(">42</p>"));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn plain_literal_language_roundtrips() {
    register_example_ns();
    let mut g = Graph::new();
    g.insert(
        Triple::new(
            res("http://example.org/s"),
            res("http://example.org/name"),
            PlainLiteral::with_language("Alice", "en").unwrap(),
        )
        .unwrap(),
    );
    g.insert(
        Triple::new(
            res("http://example.org/s"),
            res("http://example.org/note"),
            PlainLiteral::new("no language"),
        )
        .unwrap(),
    );

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("xml:lang=\"en\""));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn empty_plain_literal_roundtrips() {
    register_example_ns();
    let mut g = Graph::new();
    g.insert(
        Triple::new(
            res("http://example.org/s"),
            res("http://example.org/note"),
            PlainLiteral::new(""),
        )
        .unwrap(),
    );

    let back = roundtrip(&g);
    assert_eq!(back.len(), 1);
    let t = back.iter().next().unwrap();
    match t.object() {
        Term::PlainLiteral(l) => {
            assert_eq!(l.value(), "");
            assert_eq!(l.language(), None);
        }
        other => panic!("expected a plain literal, got {other}"),
    }
    assert!(isomorphic(&g, &back));
}

#[test]
fn collection_roundtrips_through_parse_type() {
    register_example_ns();
    let mut g = Graph::new();
    g.insert(triple("http://example.org/s", "http://example.org/p", "bnode:h"));
    g.insert(triple("bnode:h", rdf::TYPE, rdf::LIST));
    g.insert(triple("bnode:h", rdf::FIRST, "http://example.org/a"));
    g.insert(triple("bnode:h", rdf::REST, "bnode:h2"));
    g.insert(triple("bnode:h2", rdf::TYPE, rdf::LIST));
    g.insert(triple("bnode:h2", rdf::FIRST, "http://example.org/b"));
    g.insert(triple("bnode:h2", rdf::REST, rdf::NIL));

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("rdf:parseType=\"Collection\""));
    assert!(out.contains("rdf:about=\"http://example.org/a\""));
    assert!(out.contains("rdf:about=\"http://example.org/b\""));
    // the cells themselves are not emitted as subjects
    assert!(!out.contains("rdf:nodeID=\"h\""));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn embedded_container_roundtrips() {
    register_example_ns();
    let mut g = Graph::new();
    let c = Resource::blank();
    let mut bag = Container::new(ContainerKind::Bag, ItemKind::Resource);
    bag.add_item(res("http://example.org/a")).unwrap();
    bag.add_item(res("http://example.org/b")).unwrap();
    g.insert_container(&c, &bag).unwrap();
    g.insert(Triple::new(res("http://example.org/s"), res("http://example.org/p"), c).unwrap());

    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("<rdf:Bag>"));
    assert!(out.contains("<rdf:_1 rdf:resource=\"http://example.org/a\"/>"));
    assert!(out.contains("<rdf:_2 rdf:resource=\"http://example.org/b\"/>"));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn floating_container_is_emitted_inline() {
    register_example_ns();
    let mut g = Graph::new();
    let c = res("http://example.org/floating");
    let mut seq = Container::new(ContainerKind::Seq, ItemKind::Literal);
    seq.add_item(PlainLiteral::new("one")).unwrap();
    g.insert_container(&c, &seq).unwrap();

    let out = serializer::to_string(&g).unwrap();
    // no referencing predicate, so no abbreviated element
    assert!(!out.contains("<rdf:Seq>"));
    assert!(out.contains("rdf:about=\"http://example.org/floating\""));

    let back = roundtrip(&g);
    assert!(isomorphic(&g, &back));
}

#[test]
fn container_expansion_deduplicates_alt_members() {
    let doc = r#"<?xml version="1.0"?>
        <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/s">
            <ex:choices>
              <rdf:Alt>
                <rdf:_1 rdf:resource="http://example.org/x"/>
                <rdf:_2 rdf:resource="http://example.org/x"/>
              </rdf:Alt>
            </ex:choices>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    // one link triple, one type triple, one member (duplicate dropped)
    assert_eq!(g.len(), 3);
}

#[test]
fn typed_subject_element_emits_type_triple() {
    let doc = r#"<?xml version="1.0"?>
        <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:ex="http://example.org/">
          <ex:Person rdf:about="http://example.org/alice">
            <ex:name>Alice</ex:name>
          </ex:Person>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert!(g.contains(&triple(
        "http://example.org/alice",
        rdf::TYPE,
        "http://example.org/Person"
    )));
    assert!(g.contains(
        &Triple::new(
            res("http://example.org/alice"),
            res("http://example.org/name"),
            PlainLiteral::new("Alice"),
        )
        .unwrap()
    ));
}

#[test]
fn bare_root_and_unprefixed_attributes_are_accepted() {
    let doc = r#"<RDF xmlns:ex="http://example.org/">
          <Description about="http://example.org/s">
            <ex:p resource="http://example.org/o"/>
          </Description>
        </RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert_eq!(g.len(), 1);
    assert!(g.contains(&triple("http://example.org/s", "http://example.org/p", "http://example.org/o")));
}

#[test]
fn rdf_id_concatenates_base() {
    let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:ex="http://example.org/"
                          xml:base="http://example.org/doc#">
          <rdf:Description rdf:ID="thing">
            <ex:p rdf:resource="http://example.org/o"/>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert_eq!(g.context(), "http://example.org/doc#");
    assert!(g.contains(&triple(
        "http://example.org/doc#thing",
        "http://example.org/p",
        "http://example.org/o"
    )));
}

#[test]
fn parse_type_literal_keeps_inner_markup() {
    let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/s">
            <ex:markup rdf:parseType="Literal"><b>bold</b></ex:markup>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    let t = g.iter().next().unwrap();
    match t.object() {
        Term::TypedLiteral(l) => {
            assert_eq!(l.datatype(), Datatype::Literal);
            assert_eq!(l.value(), "<b>bold</b>");
        }
        other => panic!("expected a typed literal, got {other}"),
    }
}

#[test]
fn missing_root_is_an_error() {
    assert!(parser::parse_str("<notrdf/>").is_err());
}

#[test]
fn nested_bag_with_attributes_is_not_a_container() {
    // an identified Bag element is not the abbreviated form
    let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/s">
            <ex:p><rdf:Bag rdf:nodeID="c"/></ex:p>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert!(g.is_empty());
}

#[test]
fn bare_container_in_foreign_default_namespace_is_not_expanded() {
    // the bare <Bag> resolves to the document's default namespace, so it is
    // an ordinary element, not the container abbreviation
    let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/s">
            <ex:p><Bag xmlns="http://example.org/"><_1 resource="http://example.org/a"/></Bag></ex:p>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert!(g.is_empty());
}

#[test]
fn bare_container_without_namespace_is_expanded() {
    let doc = r#"<RDF xmlns:ex="http://example.org/">
          <Description about="http://example.org/s">
            <ex:p><Bag><_1 resource="http://example.org/a"/></Bag></ex:p>
          </Description>
        </RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    assert_eq!(g.len(), 3);
    assert_eq!(
        g.select(None, Some(&res(&rdf::member(1))), None).len(),
        1
    );
}

#[test]
fn unknown_datatype_defaults_to_string() {
    let doc = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                          xmlns:ex="http://example.org/">
          <rdf:Description rdf:about="http://example.org/s">
            <ex:p rdf:datatype="http://example.org/custom">v</ex:p>
          </rdf:Description>
        </rdf:RDF>"#;
    let g = parser::parse_str(doc).unwrap();
    let t = g.iter().next().unwrap();
    match t.object() {
        Term::TypedLiteral(l) => assert_eq!(l.datatype(), Datatype::String),
        other => panic!("expected a typed literal, got {other}"),
    }
}

#[test]
fn graph_context_feeds_xml_base() {
    let mut g = Graph::with_context("http://example.org/ctx/").unwrap();
    g.insert(triple("http://example.org/s", "http://example.org/ctx/p", "http://example.org/o"));
    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("xml:base=\"http://example.org/ctx/\""));
    // the predicate sits in the context namespace, so its element is bare
    assert!(out.contains("<p rdf:resource=\"http://example.org/o\"/>"));

    let back = parser::parse_str(&out).unwrap();
    assert_eq!(back.context(), "http://example.org/ctx/");
    assert!(isomorphic(&g, &back));
}

#[test]
fn unregistered_namespace_gets_inline_declaration() {
    let mut g = Graph::new();
    g.insert(triple(
        "http://unregistered.example/s",
        "http://unregistered.example/vocab#knows",
        "http://unregistered.example/o",
    ));
    let out = serializer::to_string(&g).unwrap();
    assert!(out.contains("<knows xmlns=\"http://unregistered.example/vocab#\""));

    let back = parser::parse_str(&out).unwrap();
    assert!(isomorphic(&g, &back));
}
