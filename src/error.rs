//! Types for handling errors.
//!
//! Three kinds of failure are surfaced to callers: [`ModelError`] for invalid
//! RDF data and malformed RDF/XML, [`QueryError`] for ill-formed or unbound
//! queries, and [`StoreError`] for backend failures. Errors abort the
//! enclosing operation; partial state already written into caller-owned
//! structures is left as-is and is expected to be discarded.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;
pub type QueryResult<T> = Result<T, QueryError>;
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while building or (de)serializing RDF data.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid IRI: {0}")]
    InvalidIri(String),
    #[error("invalid language tag: {0}")]
    InvalidLanguageTag(String),
    #[error("invalid variable name: {0}")]
    InvalidVariableName(String),
    #[error("a blank node cannot be used as {0}")]
    BlankNode(&'static str),
    #[error("container items must all be {expected:?}, got {got:?}")]
    MixedItemKinds {
        expected: crate::graph::ItemKind,
        got: crate::graph::ItemKind,
    },
    #[error("invalid RDF/XML: {0}")]
    XmlShape(String),
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while building or applying a query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("the query has no data source bound")]
    NullDataSource,
    #[error("invalid RDF in query evaluation: {0}")]
    Model(#[from] ModelError),
    #[error("store failure during query evaluation: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("invalid RDF in store operation: {0}")]
    Model(#[from] ModelError),
}
