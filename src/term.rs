//! The RDF term model.
//!
//! A term is either a [`Resource`] (an absolute IRI or a blank node), a
//! [`PlainLiteral`] (lexical value plus optional BCP-47 language tag) or a
//! [`TypedLiteral`] (lexical value plus a datatype drawn from the closed
//! [`Datatype`] enumeration). Terms are immutable values compared
//! component-wise; the only non-byte-wise comparison is the language tag,
//! which is case-insensitive but stored as given.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use language_tag::LangTag;
use url::Url;

use crate::error::{ModelError, ModelResult};
use crate::ns::{rdfs, xsd};

/// Marker prepended to blank node identifiers in their string form.
pub const BNODE_PREFIX: &str = "bnode:";

static NEXT_BNODE: AtomicU64 = AtomicU64::new(0);

/// Any RDF term.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Term {
    Resource(Resource),
    PlainLiteral(PlainLiteral),
    TypedLiteral(TypedLiteral),
}

impl Term {
    pub fn is_resource(&self) -> bool {
        matches!(self, Term::Resource(_))
    }

    pub fn is_literal(&self) -> bool {
        !self.is_resource()
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Resource(r) if r.is_blank())
    }

    pub fn as_resource(&self) -> Option<&Resource> {
        match self {
            Term::Resource(r) => Some(r),
            _ => None,
        }
    }

    /// The lexical value for literals, the IRI for resources.
    pub fn lexical_value(&self) -> &str {
        match self {
            Term::Resource(r) => r.uri(),
            Term::PlainLiteral(l) => l.value(),
            Term::TypedLiteral(l) => l.value(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Resource(r) => r.fmt(f),
            Term::PlainLiteral(l) => l.fmt(f),
            Term::TypedLiteral(l) => l.fmt(f),
        }
    }
}

impl From<Resource> for Term {
    fn from(r: Resource) -> Self {
        Term::Resource(r)
    }
}

impl From<PlainLiteral> for Term {
    fn from(l: PlainLiteral) -> Self {
        Term::PlainLiteral(l)
    }
}

impl From<TypedLiteral> for Term {
    fn from(l: TypedLiteral) -> Self {
        Term::TypedLiteral(l)
    }
}

/// An IRI or a blank node, held as a single string; blank nodes carry the
/// `bnode:` marker.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Resource {
    uri: String,
}

impl Resource {
    /// Build a resource from an absolute IRI or a `bnode:<id>` identifier.
    pub fn new(uri: &str) -> ModelResult<Self> {
        if let Some(id) = uri.strip_prefix(BNODE_PREFIX) {
            return Resource::blank_from_id(id);
        }
        if Url::parse(uri).is_err() {
            return Err(ModelError::InvalidIri(uri.to_string()));
        }
        Ok(Resource {
            uri: uri.to_string(),
        })
    }

    /// Build a blank node with a fresh identifier.
    pub fn blank() -> Self {
        let n = NEXT_BNODE.fetch_add(1, Ordering::Relaxed);
        Resource {
            uri: format!("{BNODE_PREFIX}{n}"),
        }
    }

    /// Build a blank node from a document-provided identifier.
    pub fn blank_from_id(id: &str) -> ModelResult<Self> {
        if id.is_empty() || id.contains(char::is_whitespace) {
            return Err(ModelError::InvalidIri(format!("{BNODE_PREFIX}{id}")));
        }
        Ok(Resource {
            uri: format!("{BNODE_PREFIX}{id}"),
        })
    }

    /// Resolve `value` against `base` when it is not already absolute.
    pub fn resolve(base: &str, value: &str) -> ModelResult<Self> {
        if value.starts_with(BNODE_PREFIX) || Url::parse(value).is_ok() {
            return Resource::new(value);
        }
        let base = Url::parse(base).map_err(|_| ModelError::InvalidIri(base.to_string()))?;
        let joined = base
            .join(value)
            .map_err(|_| ModelError::InvalidIri(value.to_string()))?;
        Resource::new(joined.as_str())
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_blank(&self) -> bool {
        self.uri.starts_with(BNODE_PREFIX)
    }

    /// The identifier of a blank node, without the `bnode:` marker.
    pub fn bnode_id(&self) -> Option<&str> {
        self.uri.strip_prefix(BNODE_PREFIX)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// A literal with an optional language tag.
#[derive(Clone, Debug)]
pub struct PlainLiteral {
    value: String,
    language: Option<String>,
}

impl PlainLiteral {
    pub fn new(value: &str) -> Self {
        PlainLiteral {
            value: value.to_string(),
            language: None,
        }
    }

    /// Build a language-tagged literal. An empty tag means no tag at all;
    /// anything else must be a well-formed BCP-47 tag, kept as given.
    pub fn with_language(value: &str, language: &str) -> ModelResult<Self> {
        if language.is_empty() {
            return Ok(PlainLiteral::new(value));
        }
        LangTag::from_str(language).map_err(ModelError::InvalidLanguageTag)?;
        Ok(PlainLiteral {
            value: value.to_string(),
            language: Some(language.to_string()),
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl PartialEq for PlainLiteral {
    fn eq(&self, other: &Self) -> bool {
        if self.value != other.value {
            return false;
        }
        match (&self.language, &other.language) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl Eq for PlainLiteral {}

impl Hash for PlainLiteral {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
        self.language
            .as_ref()
            .map(|l| l.to_ascii_lowercase())
            .hash(state);
    }
}

impl fmt::Display for PlainLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.language {
            Some(lang) => write!(f, "\"{}\"@{}", self.value, lang),
            None => write!(f, "\"{}\"", self.value),
        }
    }
}

/// A literal carrying a datatype from the closed enumeration.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct TypedLiteral {
    value: String,
    datatype: Datatype,
}

impl TypedLiteral {
    pub fn new(value: &str, datatype: Datatype) -> Self {
        TypedLiteral {
            value: value.to_string(),
            datatype,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }
}

impl fmt::Display for TypedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"^^<{}>", self.value, self.datatype.uri())
    }
}

macro_rules! datatypes {
    ($($variant:ident => $uri:path),* $(,)?) => {
        /// The closed datatype vocabulary.
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum Datatype {
            $($variant),*
        }

        impl Datatype {
            /// The IRI this datatype round-trips through.
            pub fn uri(self) -> &'static str {
                match self {
                    $(Datatype::$variant => $uri),*
                }
            }

            /// The datatype registered under `uri`, if any.
            pub fn from_uri(uri: &str) -> Option<Self> {
                match uri {
                    $(u if u == $uri => Some(Datatype::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

datatypes! {
    String => xsd::STRING,
    Boolean => xsd::BOOLEAN,
    Decimal => xsd::DECIMAL,
    Float => xsd::FLOAT,
    Double => xsd::DOUBLE,
    Integer => xsd::INTEGER,
    Long => xsd::LONG,
    Int => xsd::INT,
    Short => xsd::SHORT,
    Byte => xsd::BYTE,
    NonPositiveInteger => xsd::NON_POSITIVE_INTEGER,
    NegativeInteger => xsd::NEGATIVE_INTEGER,
    NonNegativeInteger => xsd::NON_NEGATIVE_INTEGER,
    PositiveInteger => xsd::POSITIVE_INTEGER,
    UnsignedLong => xsd::UNSIGNED_LONG,
    UnsignedInt => xsd::UNSIGNED_INT,
    UnsignedShort => xsd::UNSIGNED_SHORT,
    UnsignedByte => xsd::UNSIGNED_BYTE,
    Duration => xsd::DURATION,
    DateTime => xsd::DATE_TIME,
    Time => xsd::TIME,
    Date => xsd::DATE,
    GYearMonth => xsd::G_YEAR_MONTH,
    GYear => xsd::G_YEAR,
    GMonthDay => xsd::G_MONTH_DAY,
    GDay => xsd::G_DAY,
    GMonth => xsd::G_MONTH,
    HexBinary => xsd::HEX_BINARY,
    Base64Binary => xsd::BASE64_BINARY,
    AnyUri => xsd::ANY_URI,
    Literal => rdfs::LITERAL,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.uri())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test]
    fn resource_requires_absolute_iri() {
        assert!(Resource::new("http://example.org/a").is_ok());
        assert!(Resource::new("urn:isbn:12345").is_ok());
        assert!(Resource::new("relative/path").is_err());
        assert!(Resource::new("").is_err());
    }

    #[test]
    fn blank_nodes_are_marked_and_fresh() {
        let a = Resource::blank();
        let b = Resource::blank();
        assert!(a.is_blank());
        assert_ne!(a, b);
        let c = Resource::new("bnode:abc").unwrap();
        assert_eq!(c.bnode_id(), Some("abc"));
        assert!(Resource::new("bnode:").is_err());
    }

    #[test]
    fn resolve_joins_relative_references() {
        let r = Resource::resolve("http://example.org/dir/", "name").unwrap();
        assert_eq!(r.uri(), "http://example.org/dir/name");
        let abs = Resource::resolve("http://example.org/", "http://other.org/x").unwrap();
        assert_eq!(abs.uri(), "http://other.org/x");
    }

    #[test_case("en", "EN", true ; "case insensitive tags")]
    #[test_case("en", "en-US", false ; "different tags")]
    #[test_case("en", "en", true ; "identical tags")]
    fn plain_literal_language_equality(a: &str, b: &str, equal: bool) {
        let la = PlainLiteral::with_language("v", a).unwrap();
        let lb = PlainLiteral::with_language("v", b).unwrap();
        assert_eq!(la == lb, equal);
    }

    #[test]
    fn plain_literal_keeps_tag_as_given() {
        let l = PlainLiteral::with_language("v", "en-US").unwrap();
        assert_eq!(l.language(), Some("en-US"));
        assert_eq!(l.to_string(), "\"v\"@en-US");
    }

    #[test]
    fn empty_language_means_none() {
        let l = PlainLiteral::with_language("v", "").unwrap();
        assert_eq!(l.language(), None);
        assert_eq!(l.to_string(), "\"v\"");
    }

    #[test]
    fn invalid_language_rejected() {
        assert!(PlainLiteral::with_language("v", "not a tag").is_err());
    }

    #[test]
    fn typed_literal_display() {
        let l = TypedLiteral::new("42", Datatype::Integer);
        assert_eq!(
            l.to_string(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test_case(Datatype::String)]
    #[test_case(Datatype::Integer)]
    #[test_case(Datatype::DateTime)]
    #[test_case(Datatype::Literal)]
    fn datatype_uri_round_trips(dt: Datatype) {
        assert_eq!(Datatype::from_uri(dt.uri()), Some(dt));
    }

    #[test]
    fn unknown_datatype_uri() {
        assert_eq!(Datatype::from_uri("http://example.org/dt"), None);
    }
}
