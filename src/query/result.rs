//! The outcome of applying a DESCRIBE query.

use super::table::ResultTable;

/// Column name for described subjects.
pub const COL_SUBJECT: &str = "?SUBJECT";
/// Column name for described predicates.
pub const COL_PREDICATE: &str = "?PREDICATE";
/// Column name for described objects.
pub const COL_OBJECT: &str = "?OBJECT";

/// The query's rendered text plus the table of described triples.
#[derive(Clone, Debug, PartialEq)]
pub struct DescribeQueryResult {
    query_text: String,
    results: ResultTable,
}

impl DescribeQueryResult {
    pub(crate) fn new(query_text: String, results: ResultTable) -> Self {
        DescribeQueryResult {
            query_text,
            results,
        }
    }

    /// The string form of the query that produced this result.
    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    /// The described triples: columns `?SUBJECT`, `?PREDICATE`, `?OBJECT`.
    pub fn results(&self) -> &ResultTable {
        &self.results
    }
}
