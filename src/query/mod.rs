//! The DESCRIBE query model.
//!
//! A [`DescribeQuery`] names the terms to describe (resources and/or
//! variables, or nothing for `DESCRIBE *`), carries the pattern groups that
//! bind those variables, and optional limit/offset modifiers. Applying it to
//! a graph, a store or a federation runs the describe pipeline and yields a
//! [`DescribeQueryResult`].

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ModelError, ModelResult, QueryResult};
use crate::graph::Graph;
use crate::store::{Federation, Store};
use crate::term::{Resource, Term};

mod engine;
pub mod filter;
mod result;
mod table;

pub use filter::{ComparisonFilter, ComparisonOp, IsBlankFilter, IsLiteralFilter, IsUriFilter, PatternFilter, RegexFilter};
pub use result::{DescribeQueryResult, COL_OBJECT, COL_PREDICATE, COL_SUBJECT};
pub use table::ResultTable;

lazy_static! {
    static ref VARIABLE_NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// A named query variable. The name is stored with its leading `?`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Variable {
    name: String,
    reserved: bool,
}

impl Variable {
    /// Build a variable from a name, with or without the leading `?`.
    pub fn new(name: &str) -> ModelResult<Self> {
        let bare = name.strip_prefix('?').unwrap_or(name);
        if !VARIABLE_NAME.is_match(bare) {
            return Err(ModelError::InvalidVariableName(name.to_string()));
        }
        Ok(Variable {
            name: format!("?{bare}"),
            reserved: false,
        })
    }

    pub(crate) fn reserved(name: &str) -> Self {
        Variable {
            name: format!("?{name}"),
            reserved: true,
        }
    }

    /// The variable name, leading `?` included.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One slot of a pattern: a ground term or a variable.
#[derive(Clone, Debug, PartialEq)]
pub enum PatternItem {
    Ground(Term),
    Variable(Variable),
}

impl PatternItem {
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            PatternItem::Variable(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ground(&self) -> Option<&Term> {
        match self {
            PatternItem::Ground(t) => Some(t),
            _ => None,
        }
    }
}

impl fmt::Display for PatternItem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PatternItem::Ground(t) => t.fmt(f),
            PatternItem::Variable(v) => v.fmt(f),
        }
    }
}

impl From<Term> for PatternItem {
    fn from(t: Term) -> Self {
        PatternItem::Ground(t)
    }
}

impl From<Resource> for PatternItem {
    fn from(r: Resource) -> Self {
        PatternItem::Ground(r.into())
    }
}

impl From<Variable> for PatternItem {
    fn from(v: Variable) -> Self {
        PatternItem::Variable(v)
    }
}

/// A triple (or quadruple) pattern: every slot is ground or a variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    context: Option<PatternItem>,
    subject: PatternItem,
    predicate: PatternItem,
    object: PatternItem,
}

impl Pattern {
    pub fn new(
        subject: impl Into<PatternItem>,
        predicate: impl Into<PatternItem>,
        object: impl Into<PatternItem>,
    ) -> Self {
        Pattern {
            context: None,
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    pub fn with_context(
        context: impl Into<PatternItem>,
        subject: impl Into<PatternItem>,
        predicate: impl Into<PatternItem>,
        object: impl Into<PatternItem>,
    ) -> Self {
        Pattern {
            context: Some(context.into()),
            ..Pattern::new(subject, predicate, object)
        }
    }

    pub fn context(&self) -> Option<&PatternItem> {
        self.context.as_ref()
    }

    pub fn subject(&self) -> &PatternItem {
        &self.subject
    }

    pub fn predicate(&self) -> &PatternItem {
        &self.predicate
    }

    pub fn object(&self) -> &PatternItem {
        &self.object
    }

    /// The variables of this pattern, in slot order, deduplicated.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut vars: Vec<&Variable> = Vec::new();
        let slots = [
            self.context.as_ref(),
            Some(&self.subject),
            Some(&self.predicate),
            Some(&self.object),
        ];
        for item in slots.into_iter().flatten() {
            if let Some(v) = item.as_variable() {
                if !vars.contains(&v) {
                    vars.push(v);
                }
            }
        }
        vars
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ctx) = &self.context {
            write!(f, "{ctx} ")?;
        }
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// A named conjunction of patterns and filters. Groups combine with the next
/// group by natural join, or by union when [`PatternGroup::set_join_as_union`]
/// was called.
#[derive(Debug)]
pub struct PatternGroup {
    name: String,
    patterns: Vec<Pattern>,
    filters: Vec<Box<dyn PatternFilter>>,
    join_as_union: bool,
}

impl PatternGroup {
    pub fn new(name: &str) -> Self {
        PatternGroup {
            name: name.to_string(),
            patterns: Vec::new(),
            filters: Vec::new(),
            join_as_union: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a pattern; a pattern already in the group is ignored.
    pub fn add_pattern(&mut self, pattern: Pattern) -> &mut Self {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
        self
    }

    pub fn add_filter(&mut self, filter: Box<dyn PatternFilter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn filters(&self) -> &[Box<dyn PatternFilter>] {
        &self.filters
    }

    pub fn join_as_union(&self) -> bool {
        self.join_as_union
    }

    /// Make this group combine with the following one by union instead of
    /// join.
    pub fn set_join_as_union(&mut self, union: bool) -> &mut Self {
        self.join_as_union = union;
        self
    }
}

/// A result-set modifier. At most one of each kind applies to a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modifier {
    Limit(usize),
    Offset(usize),
}

impl Modifier {
    fn same_kind(&self, other: &Modifier) -> bool {
        matches!(
            (self, other),
            (Modifier::Limit(_), Modifier::Limit(_)) | (Modifier::Offset(_), Modifier::Offset(_))
        )
    }
}

/// A term a DESCRIBE query asks about: a ground resource or a variable bound
/// by the query's patterns.
#[derive(Clone, Debug, PartialEq)]
pub enum DescribeTerm {
    Resource(Resource),
    Variable(Variable),
}

impl fmt::Display for DescribeTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DescribeTerm::Resource(r) => write!(f, "<{r}>"),
            DescribeTerm::Variable(v) => v.fmt(f),
        }
    }
}

impl From<Resource> for DescribeTerm {
    fn from(r: Resource) -> Self {
        DescribeTerm::Resource(r)
    }
}

impl From<Variable> for DescribeTerm {
    fn from(v: Variable) -> Self {
        DescribeTerm::Variable(v)
    }
}

/// A DESCRIBE query.
#[derive(Debug, Default)]
pub struct DescribeQuery {
    describe_terms: Vec<DescribeTerm>,
    pattern_groups: Vec<PatternGroup>,
    modifiers: Vec<Modifier>,
}

impl DescribeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term to describe; a term already present is ignored.
    pub fn add_describe_term(&mut self, term: impl Into<DescribeTerm>) -> &mut Self {
        let term = term.into();
        if !self.describe_terms.contains(&term) {
            self.describe_terms.push(term);
        }
        self
    }

    /// Add a pattern group; a group with an already-used name is ignored.
    pub fn add_pattern_group(&mut self, group: PatternGroup) -> &mut Self {
        if !self.pattern_groups.iter().any(|g| g.name() == group.name()) {
            self.pattern_groups.push(group);
        }
        self
    }

    /// Add a modifier; a second modifier of the same kind is silently
    /// ignored.
    pub fn add_modifier(&mut self, modifier: Modifier) -> &mut Self {
        if !self.modifiers.iter().any(|m| m.same_kind(&modifier)) {
            self.modifiers.push(modifier);
        }
        self
    }

    pub fn describe_terms(&self) -> &[DescribeTerm] {
        &self.describe_terms
    }

    pub fn pattern_groups(&self) -> &[PatternGroup] {
        &self.pattern_groups
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// `DESCRIBE *`: no explicit describe terms.
    pub fn is_star(&self) -> bool {
        self.describe_terms.is_empty()
    }

    /// A query without any pattern group.
    pub fn is_empty(&self) -> bool {
        self.pattern_groups.is_empty()
    }

    /// Run this query against a single graph.
    pub fn apply_to_graph(&self, graph: &Graph) -> QueryResult<DescribeQueryResult> {
        engine::DescribeEngine::new(self).apply(&engine::Source::Graph(graph))
    }

    /// Run this query against a single store.
    pub fn apply_to_store(&self, store: &dyn Store) -> QueryResult<DescribeQueryResult> {
        engine::DescribeEngine::new(self).apply(&engine::Source::Store(store))
    }

    /// Run this query against every member of a federation, merging results.
    pub fn apply_to_federation(&self, federation: &Federation) -> QueryResult<DescribeQueryResult> {
        engine::DescribeEngine::new(self).apply_to_federation(federation)
    }
}

impl fmt::Display for DescribeQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DESCRIBE ")?;
        if self.is_star() {
            f.write_str("*")?;
        } else {
            let terms: Vec<String> = self.describe_terms.iter().map(|t| t.to_string()).collect();
            f.write_str(&terms.join(" "))?;
        }
        f.write_str("\nWHERE{\n")?;
        f.write_str(&self.render_groups())?;
        f.write_str("\n}")?;
        // Limit renders before Offset, whatever the order they were added in
        if let Some(Modifier::Limit(n)) = self
            .modifiers
            .iter()
            .find(|m| matches!(m, Modifier::Limit(_)))
        {
            write!(f, "\nLIMIT {n}")?;
        }
        if let Some(Modifier::Offset(n)) = self
            .modifiers
            .iter()
            .find(|m| matches!(m, Modifier::Offset(_)))
        {
            write!(f, "\nOFFSET {n}")?;
        }
        Ok(())
    }
}

impl DescribeQuery {
    fn render_groups(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        let groups = &self.pattern_groups;
        let mut i = 0;
        while i < groups.len() {
            if groups[i].join_as_union() && i + 1 < groups.len() {
                lines.push("  {".to_string());
                loop {
                    render_group(&groups[i], "    ", &mut lines);
                    let more = groups[i].join_as_union() && i + 1 < groups.len();
                    if !more {
                        break;
                    }
                    lines.push("    UNION".to_string());
                    i += 1;
                }
                lines.push("  }".to_string());
            } else {
                render_group(&groups[i], "  ", &mut lines);
            }
            i += 1;
        }
        lines.join("\n")
    }
}

fn render_group(group: &PatternGroup, indent: &str, lines: &mut Vec<String>) {
    for p in group.patterns() {
        lines.push(format!("{indent}{p} ."));
    }
    for fl in group.filters() {
        lines.push(format!("{indent}FILTER ( {fl} )"));
    }
}
