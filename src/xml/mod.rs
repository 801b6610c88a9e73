//! The RDF/XML codec.
//!
//! [`serializer`] writes a [`Graph`](crate::graph::Graph) out as RDF/XML with
//! container and collection abbreviations; [`parser`] reads a document back,
//! expanding those abbreviations into triples. A graph without blank-node
//! ambiguities survives the round trip up to blank-node renaming.

pub(crate) mod dom;
pub mod parser;
pub mod serializer;

#[cfg(test)]
mod test;
