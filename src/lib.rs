//! This crate provides an RDF object model, an RDF/XML codec and a SPARQL
//! DESCRIBE engine.
//!
//! * the [`term`] module defines resources, blank nodes and literals;
//! * the [`triple`] module defines triples and context-carrying quadruples;
//! * the [`graph`] module provides in-memory graphs with derived metadata
//!   (namespaces, containers, collections);
//! * the [`xml`] module reads and writes the RDF/XML concrete syntax,
//!   including container and collection abbreviations;
//! * the [`query`] module builds and applies DESCRIBE queries over graphs,
//!   stores and federations;
//! * the [`store`] module defines the quadruple store contract, an in-memory
//!   store and federations;
//! * the [`ns`] module holds the standard vocabularies and the process-wide
//!   namespace registry.

pub mod error;
pub mod graph;
pub mod ns;
pub mod query;
pub mod store;
pub mod term;
pub mod triple;
pub mod xml;

pub use error::{ModelError, QueryError, StoreError};
pub use graph::{Collection, Container, ContainerKind, Graph, GraphMetadata, ItemKind};
pub use query::{DescribeQuery, DescribeQueryResult, Pattern, PatternGroup, Variable};
pub use store::{Federation, MemoryStore, Store};
pub use term::{Datatype, PlainLiteral, Resource, Term, TypedLiteral};
pub use triple::{Quadruple, Triple, TripleFlavor};
