//! Row filters applied inside a pattern group.
//!
//! A filter sees one row of an intermediate table as a map from variable
//! name (leading `?` included) to the bound term's string form. A row whose
//! variable is unbound fails every filter.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::term::{Term, BNODE_PREFIX};

use super::Variable;

/// One row of an intermediate result table.
pub type Row = HashMap<String, String>;

/// The capability a filter needs: judge one row.
pub trait PatternFilter: fmt::Debug + fmt::Display {
    fn evaluate(&self, row: &Row) -> bool;
}

fn bound<'r>(row: &'r Row, variable: &Variable) -> Option<&'r str> {
    row.get(variable.name()).map(String::as_str)
}

fn is_literal_form(value: &str) -> bool {
    value.starts_with('"')
}

fn is_blank_form(value: &str) -> bool {
    value.starts_with(BNODE_PREFIX)
}

/// Keeps rows whose variable is bound to a non-blank resource.
#[derive(Debug)]
pub struct IsUriFilter {
    variable: Variable,
}

impl IsUriFilter {
    pub fn new(variable: Variable) -> Self {
        IsUriFilter { variable }
    }
}

impl PatternFilter for IsUriFilter {
    fn evaluate(&self, row: &Row) -> bool {
        match bound(row, &self.variable) {
            Some(v) => !is_blank_form(v) && !is_literal_form(v),
            None => false,
        }
    }
}

impl fmt::Display for IsUriFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ISURI({})", self.variable)
    }
}

/// Keeps rows whose variable is bound to a blank node.
#[derive(Debug)]
pub struct IsBlankFilter {
    variable: Variable,
}

impl IsBlankFilter {
    pub fn new(variable: Variable) -> Self {
        IsBlankFilter { variable }
    }
}

impl PatternFilter for IsBlankFilter {
    fn evaluate(&self, row: &Row) -> bool {
        bound(row, &self.variable).is_some_and(is_blank_form)
    }
}

impl fmt::Display for IsBlankFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ISBLANK({})", self.variable)
    }
}

/// Keeps rows whose variable is bound to a literal.
#[derive(Debug)]
pub struct IsLiteralFilter {
    variable: Variable,
}

impl IsLiteralFilter {
    pub fn new(variable: Variable) -> Self {
        IsLiteralFilter { variable }
    }
}

impl PatternFilter for IsLiteralFilter {
    fn evaluate(&self, row: &Row) -> bool {
        bound(row, &self.variable).is_some_and(is_literal_form)
    }
}

impl fmt::Display for IsLiteralFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ISLITERAL({})", self.variable)
    }
}

/// Comparison operators for [`ComparisonFilter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComparisonOp {
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            ComparisonOp::Less => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::Greater => ">",
        })
    }
}

/// Compares a variable's binding against a fixed term: numerically when both
/// lexical values parse as numbers, lexicographically otherwise.
#[derive(Debug)]
pub struct ComparisonFilter {
    variable: Variable,
    op: ComparisonOp,
    term: Term,
}

impl ComparisonFilter {
    pub fn new(variable: Variable, op: ComparisonOp, term: impl Into<Term>) -> Self {
        ComparisonFilter {
            variable,
            op,
            term: term.into(),
        }
    }
}

/// The lexical part of a term's string form (the quoted value for literals).
fn lexical(value: &str) -> &str {
    if let Some(rest) = value.strip_prefix('"') {
        if let Some(end) = rest.rfind('"') {
            return &rest[..end];
        }
    }
    value
}

impl PatternFilter for ComparisonFilter {
    fn evaluate(&self, row: &Row) -> bool {
        let Some(value) = bound(row, &self.variable) else {
            return false;
        };
        let target = self.term.to_string();
        let ordering = match (
            lexical(value).parse::<f64>(),
            lexical(&target).parse::<f64>(),
        ) {
            (Ok(a), Ok(b)) => match a.partial_cmp(&b) {
                Some(o) => o,
                None => return false,
            },
            _ => value.cmp(target.as_str()),
        };
        match self.op {
            ComparisonOp::Less => ordering.is_lt(),
            ComparisonOp::LessOrEqual => ordering.is_le(),
            ComparisonOp::Equal => ordering.is_eq(),
            ComparisonOp::NotEqual => ordering.is_ne(),
            ComparisonOp::GreaterOrEqual => ordering.is_ge(),
            ComparisonOp::Greater => ordering.is_gt(),
        }
    }
}

impl fmt::Display for ComparisonFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.op, self.term)
    }
}

/// Keeps rows whose binding matches a regular expression.
#[derive(Debug)]
pub struct RegexFilter {
    variable: Variable,
    regex: Regex,
}

impl RegexFilter {
    pub fn new(variable: Variable, regex: Regex) -> Self {
        RegexFilter { variable, regex }
    }
}

impl PatternFilter for RegexFilter {
    fn evaluate(&self, row: &Row) -> bool {
        bound(row, &self.variable).is_some_and(|v| self.regex.is_match(v))
    }
}

impl fmt::Display for RegexFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "REGEX({}, \"{}\")", self.variable, self.regex.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::term::{Datatype, Resource, TypedLiteral};

    fn row(var: &str, value: &str) -> Row {
        let mut r = Row::new();
        r.insert(var.to_string(), value.to_string());
        r
    }

    fn var(name: &str) -> Variable {
        Variable::new(name).unwrap()
    }

    #[test]
    fn kind_filters_classify_string_forms() {
        let v = var("x");
        let uri = row("?x", "http://example.org/a");
        let blank = row("?x", "bnode:b1");
        let literal = row("?x", "\"text\"@en");

        assert!(IsUriFilter::new(v.clone()).evaluate(&uri));
        assert!(!IsUriFilter::new(v.clone()).evaluate(&blank));
        assert!(!IsUriFilter::new(v.clone()).evaluate(&literal));

        assert!(IsBlankFilter::new(v.clone()).evaluate(&blank));
        assert!(!IsBlankFilter::new(v.clone()).evaluate(&uri));

        assert!(IsLiteralFilter::new(v.clone()).evaluate(&literal));
        assert!(!IsLiteralFilter::new(v.clone()).evaluate(&uri));
    }

    #[test]
    fn unbound_variable_fails() {
        let v = var("missing");
        let r = row("?x", "http://example.org/a");
        assert!(!IsUriFilter::new(v.clone()).evaluate(&r));
        assert!(!IsBlankFilter::new(v.clone()).evaluate(&r));
        assert!(!IsLiteralFilter::new(v).evaluate(&r));
    }

    #[test]
    fn comparison_is_numeric_when_both_sides_parse() {
        let v = var("x");
        let nine = row("?x", "\"9\"^^<http://www.w3.org/2001/XMLSchema#integer>");
        let ten = TypedLiteral::new("10", Datatype::Integer);
        let f = ComparisonFilter::new(v, ComparisonOp::Less, ten);
        // lexicographically "9" > "10"; numerically 9 < 10
        assert!(f.evaluate(&nine));
    }

    #[test]
    fn comparison_falls_back_to_string_order() {
        let v = var("x");
        let r = row("?x", "http://example.org/a");
        let f = ComparisonFilter::new(
            v,
            ComparisonOp::Equal,
            Resource::new("http://example.org/a").unwrap(),
        );
        assert!(f.evaluate(&r));
    }

    #[test]
    fn regex_matches_string_form() {
        let v = var("x");
        let f = RegexFilter::new(v, Regex::new("example\\.org").unwrap());
        assert!(f.evaluate(&row("?x", "http://example.org/a")));
        assert!(!f.evaluate(&row("?x", "http://other.net/a")));
    }

    #[test]
    fn filters_render_for_query_text() {
        let v = var("x");
        assert_eq!(IsUriFilter::new(v.clone()).to_string(), "ISURI(?x)");
        assert_eq!(
            RegexFilter::new(v.clone(), Regex::new("a+").unwrap()).to_string(),
            "REGEX(?x, \"a+\")"
        );
        let c = ComparisonFilter::new(
            v,
            ComparisonOp::GreaterOrEqual,
            TypedLiteral::new("5", Datatype::Integer),
        );
        assert_eq!(
            c.to_string(),
            "?x >= \"5\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }
}
