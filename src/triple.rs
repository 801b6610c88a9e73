//! Triples and quadruples.

use std::fmt;

use xxhash_rust::xxh64::xxh64;

use crate::error::{ModelError, ModelResult};
use crate::term::{Resource, Term};

/// Whether a triple's object is a resource (`Spo`) or a literal (`Spl`).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TripleFlavor {
    Spo = 1,
    Spl = 2,
}

/// An RDF statement: subject and predicate are resources, the object is any
/// term. The predicate must not be a blank node.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Triple {
    subject: Resource,
    predicate: Resource,
    object: Term,
}

impl Triple {
    pub fn new(subject: Resource, predicate: Resource, object: impl Into<Term>) -> ModelResult<Self> {
        if predicate.is_blank() {
            return Err(ModelError::BlankNode("a predicate"));
        }
        Ok(Triple {
            subject,
            predicate,
            object: object.into(),
        })
    }

    pub fn subject(&self) -> &Resource {
        &self.subject
    }

    pub fn predicate(&self) -> &Resource {
        &self.predicate
    }

    pub fn object(&self) -> &Term {
        &self.object
    }

    pub fn flavor(&self) -> TripleFlavor {
        match self.object {
            Term::Resource(_) => TripleFlavor::Spo,
            _ => TripleFlavor::Spl,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A triple in a named context.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Quadruple {
    context: Resource,
    triple: Triple,
}

impl Quadruple {
    pub fn new(
        context: Resource,
        subject: Resource,
        predicate: Resource,
        object: impl Into<Term>,
    ) -> ModelResult<Self> {
        let triple = Triple::new(subject, predicate, object)?;
        Quadruple::from_triple(context, triple)
    }

    pub fn from_triple(context: Resource, triple: Triple) -> ModelResult<Self> {
        if context.is_blank() {
            return Err(ModelError::BlankNode("a context"));
        }
        Ok(Quadruple { context, triple })
    }

    pub fn context(&self) -> &Resource {
        &self.context
    }

    pub fn subject(&self) -> &Resource {
        self.triple.subject()
    }

    pub fn predicate(&self) -> &Resource {
        self.triple.predicate()
    }

    pub fn object(&self) -> &Term {
        self.triple.object()
    }

    pub fn triple(&self) -> &Triple {
        &self.triple
    }

    pub fn flavor(&self) -> TripleFlavor {
        self.triple.flavor()
    }

    /// The stable identifier of this quadruple.
    pub fn id(&self) -> i64 {
        quadruple_id(
            self.context.uri(),
            &self.subject().to_string(),
            &self.predicate().to_string(),
            &self.object().to_string(),
        )
    }
}

impl fmt::Display for Quadruple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.context, self.triple)
    }
}

/// Stable 64-bit identifier of a quadruple: a pure function of the four
/// string forms, identical across processes.
pub fn quadruple_id(context: &str, subject: &str, predicate: &str, object: &str) -> i64 {
    let joined = format!("{context} {subject} {predicate} {object}");
    xxh64(joined.as_bytes(), 0) as i64
}
