//! Standard namespaces and the process-wide namespace registry.
//!
//! The registry is shared, mutable state consulted by metadata collection and
//! by both directions of the RDF/XML codec, so every lookup and insertion
//! happens under a lock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use lazy_static::lazy_static;
use url::Url;

use crate::error::{ModelError, ModelResult};

macro_rules! ns_terms {
    ($uri:expr; $($ident:ident => $suffix:expr),* $(,)?) => {
        $(
            pub const $ident: &str = concat!($uri, $suffix);
        )*
    };
}

pub mod rdf {
    pub const PREFIX: &str = "rdf";
    pub const URI: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    ns_terms!("http://www.w3.org/1999/02/22-rdf-syntax-ns#";
        // classes
        BAG => "Bag", SEQ => "Seq", ALT => "Alt", LIST => "List",
        STATEMENT => "Statement",
        // properties
        TYPE => "type", FIRST => "first", REST => "rest", LI => "li",
        SUBJECT => "subject", PREDICATE => "predicate", OBJECT => "object",
        // individuals
        NIL => "nil",
    );

    /// The `rdf:_N` membership property for position `n` (1-based).
    pub fn member(n: usize) -> String {
        format!("{URI}_{n}")
    }
}

pub mod rdfs {
    pub const PREFIX: &str = "rdfs";
    pub const URI: &str = "http://www.w3.org/2000/01/rdf-schema#";

    ns_terms!("http://www.w3.org/2000/01/rdf-schema#";
        CLASS => "Class", LITERAL => "Literal", RESOURCE => "Resource",
        COMMENT => "comment", LABEL => "label", SEE_ALSO => "seeAlso",
    );
}

pub mod xsd {
    pub const PREFIX: &str = "xsd";
    pub const URI: &str = "http://www.w3.org/2001/XMLSchema#";

    ns_terms!("http://www.w3.org/2001/XMLSchema#";
        STRING => "string", BOOLEAN => "boolean",
        DECIMAL => "decimal", FLOAT => "float", DOUBLE => "double",
        INTEGER => "integer", LONG => "long", INT => "int",
        SHORT => "short", BYTE => "byte",
        NON_POSITIVE_INTEGER => "nonPositiveInteger",
        NEGATIVE_INTEGER => "negativeInteger",
        NON_NEGATIVE_INTEGER => "nonNegativeInteger",
        POSITIVE_INTEGER => "positiveInteger",
        UNSIGNED_LONG => "unsignedLong", UNSIGNED_INT => "unsignedInt",
        UNSIGNED_SHORT => "unsignedShort", UNSIGNED_BYTE => "unsignedByte",
        DURATION => "duration", DATE_TIME => "dateTime",
        TIME => "time", DATE => "date",
        G_YEAR_MONTH => "gYearMonth", G_YEAR => "gYear",
        G_MONTH_DAY => "gMonthDay", G_DAY => "gDay", G_MONTH => "gMonth",
        HEX_BINARY => "hexBinary", BASE64_BINARY => "base64Binary",
        ANY_URI => "anyURI",
    );
}

pub mod xml {
    pub const PREFIX: &str = "xml";
    pub const URI: &str = "http://www.w3.org/XML/1998/namespace";
}

/// Prefix stem used for namespaces generated on the fly during
/// serialization. Qualified names carrying it are reduced to the bare local
/// name with an `xmlns` declaration on the element instead.
pub const AUTO_PREFIX: &str = "autoNS";

/// The context every graph starts with until it is given one.
pub const DEFAULT_BASE: &str = "https://rdfkit.dev/";

/// A prefix / URI pair.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Namespace {
    prefix: String,
    uri: String,
}

impl Namespace {
    /// Build a namespace, validating that `uri` is an absolute IRI and the
    /// prefix is a plain non-reserved token.
    pub fn new(prefix: &str, uri: &str) -> ModelResult<Self> {
        if prefix.is_empty() || prefix == "_" || prefix.contains(':') {
            return Err(ModelError::InvalidIri(format!("invalid prefix `{prefix}`")));
        }
        if Url::parse(uri).is_err() {
            return Err(ModelError::InvalidIri(uri.to_string()));
        }
        Ok(Namespace {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        })
    }

    pub(crate) fn new_unchecked(prefix: &str, uri: &str) -> Self {
        Namespace {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether this namespace was generated on the fly by the serializer.
    pub fn is_auto(&self) -> bool {
        self.prefix.starts_with(AUTO_PREFIX)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

#[derive(Debug, Default)]
struct Registry {
    namespaces: Vec<Namespace>,
}

impl Registry {
    fn with_defaults() -> Self {
        Registry {
            namespaces: vec![
                Namespace::new_unchecked(rdf::PREFIX, rdf::URI),
                Namespace::new_unchecked(rdfs::PREFIX, rdfs::URI),
                Namespace::new_unchecked(xsd::PREFIX, xsd::URI),
                Namespace::new_unchecked(xml::PREFIX, xml::URI),
                Namespace::new_unchecked("base", DEFAULT_BASE),
            ],
        }
    }
}

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::with_defaults());
    static ref AUTO_COUNT: AtomicU64 = AtomicU64::new(0);
}

/// Add a namespace to the process-wide registry. A namespace whose prefix or
/// URI is already registered is ignored.
pub fn register(ns: Namespace) {
    let mut reg = REGISTRY.lock().expect("namespace registry poisoned");
    if !reg
        .namespaces
        .iter()
        .any(|n| n.prefix == ns.prefix || n.uri == ns.uri)
    {
        reg.namespaces.push(ns);
    }
}

/// Look up a registered namespace by prefix.
pub fn by_prefix(prefix: &str) -> Option<Namespace> {
    let reg = REGISTRY.lock().expect("namespace registry poisoned");
    reg.namespaces.iter().find(|n| n.prefix == prefix).cloned()
}

/// Look up a registered namespace by URI.
pub fn by_uri(uri: &str) -> Option<Namespace> {
    let reg = REGISTRY.lock().expect("namespace registry poisoned");
    reg.namespaces.iter().find(|n| n.uri == uri).cloned()
}

/// Snapshot of every registered namespace, in registration order.
pub fn snapshot() -> Vec<Namespace> {
    let reg = REGISTRY.lock().expect("namespace registry poisoned");
    reg.namespaces.clone()
}

/// The registered namespace whose URI is the longest prefix of `iri`.
pub fn namespace_of(iri: &str) -> Option<Namespace> {
    let reg = REGISTRY.lock().expect("namespace registry poisoned");
    reg.namespaces
        .iter()
        .filter(|n| iri.starts_with(&n.uri))
        .max_by_key(|n| n.uri.len())
        .cloned()
}

/// Derive a namespace for `iri` when none is registered: the URI is cut
/// after its last `#` or `/`, and an opaque prefix is generated. The result
/// is registered so the same URI maps to the same prefix from then on.
pub fn auto_namespace(iri: &str) -> Namespace {
    let cut = iri
        .rfind(|c| c == '#' || c == '/')
        .map(|i| i + 1)
        .unwrap_or(iri.len());
    let uri = &iri[..cut];
    if let Some(ns) = by_uri(uri) {
        return ns;
    }
    let n = AUTO_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    let ns = Namespace::new_unchecked(&format!("{AUTO_PREFIX}{n}"), uri);
    register(ns.clone());
    ns
}

/// Resolve an `xmlns` declaration against the registry: a registered prefix
/// or URI wins over the document's own pairing, otherwise the declaration
/// stands as a document-scoped namespace.
pub fn resolve_declaration(prefix: &str, uri: &str) -> (String, String) {
    if let Some(ns) = by_prefix(prefix) {
        return (prefix.to_string(), ns.uri);
    }
    if let Some(ns) = by_uri(uri) {
        return (ns.prefix, uri.to_string());
    }
    (prefix.to_string(), uri.to_string())
}
