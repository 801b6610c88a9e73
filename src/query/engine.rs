//! The DESCRIBE pipeline.
//!
//! One application runs Evaluate -> Combine -> Filter -> Join -> Describe ->
//! Modify. The engine owns the intermediate tables for the duration of a
//! single apply call and resets them on entry.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::graph::Graph;
use crate::store::{Federation, Store};
use crate::term::{Resource, Term};

use super::filter::Row;
use super::result::DescribeQueryResult;
use super::table::ResultTable;
use super::{DescribeQuery, DescribeTerm, Modifier, Pattern, PatternGroup, PatternItem, Variable};

/// The table every describe step fills: one row per described triple, under
/// the three reserved variables.
fn describe_table() -> ResultTable {
    let columns = [
        Variable::reserved("SUBJECT"),
        Variable::reserved("PREDICATE"),
        Variable::reserved("OBJECT"),
    ];
    ResultTable::with_columns(
        "DESCRIBE",
        &[columns[0].name(), columns[1].name(), columns[2].name()],
    )
}

/// A single queryable data source.
pub(super) enum Source<'a> {
    Graph(&'a Graph),
    Store(&'a dyn Store),
}

impl Source<'_> {
    fn evaluate_pattern(&self, pattern: &Pattern) -> QueryResult<ResultTable> {
        match self {
            Source::Graph(g) => Ok(evaluate_on_graph(pattern, g)),
            Source::Store(s) => evaluate_on_store(pattern, *s),
        }
    }

    /// Every triple in which `target` (a term's string form) occurs as
    /// subject or object, as `(subject, predicate, object)` string rows.
    fn describe_rows(&self, target: &str) -> QueryResult<Vec<[String; 3]>> {
        let mut rows = Vec::new();
        match self {
            Source::Graph(g) => {
                for t in g.iter() {
                    if t.subject().to_string() == target || t.object().to_string() == target {
                        rows.push([
                            t.subject().to_string(),
                            t.predicate().to_string(),
                            t.object().to_string(),
                        ]);
                    }
                }
            }
            Source::Store(s) => {
                for q in s.select_quadruples(None, None, None, None, None)? {
                    if q.subject().to_string() == target || q.object().to_string() == target {
                        rows.push([
                            q.subject().to_string(),
                            q.predicate().to_string(),
                            q.object().to_string(),
                        ]);
                    }
                }
            }
        }
        Ok(rows)
    }
}

pub(super) struct DescribeEngine<'q> {
    query: &'q DescribeQuery,
    pattern_tables: Vec<ResultTable>,
    group_tables: Vec<(bool, ResultTable)>,
}

impl<'q> DescribeEngine<'q> {
    pub(super) fn new(query: &'q DescribeQuery) -> Self {
        DescribeEngine {
            query,
            pattern_tables: Vec::new(),
            group_tables: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.pattern_tables.clear();
        self.group_tables.clear();
    }

    pub(super) fn apply(&mut self, source: &Source) -> QueryResult<DescribeQueryResult> {
        self.reset();
        debug!(query = %self.query, "applying DESCRIBE query");

        let query_table = if self.query.is_empty() {
            ResultTable::new("")
        } else {
            for group in self.query.pattern_groups() {
                let mut per_pattern = Vec::new();
                for pattern in group.patterns() {
                    let table = source.evaluate_pattern(pattern)?;
                    self.pattern_tables.push(table.clone());
                    per_pattern.push(table);
                }
                let table = finish_group(group, per_pattern);
                self.group_tables.push((group.join_as_union(), table));
            }
            join_groups(&self.group_tables)
        };
        debug!(rows = query_table.row_count(), "pattern groups joined");

        let mut results = self.describe(source, &query_table)?;
        apply_modifiers(self.query.modifiers(), &mut results);
        Ok(DescribeQueryResult::new(self.query.to_string(), results))
    }

    pub(super) fn apply_to_federation(
        &mut self,
        federation: &Federation,
    ) -> QueryResult<DescribeQueryResult> {
        if federation.is_empty() {
            return Err(QueryError::NullDataSource);
        }
        self.reset();
        debug!(query = %self.query, members = federation.len(), "applying DESCRIBE query to federation");

        let query_table = if self.query.is_empty() {
            ResultTable::new("")
        } else {
            for group in self.query.pattern_groups() {
                let mut per_pattern = Vec::new();
                for pattern in group.patterns() {
                    // per-store tables all carry the pattern's string form as
                    // their name and merge by that name
                    let mut merged = ResultTable::new(&pattern.to_string());
                    for store in federation.iter() {
                        let table = Source::Store(store).evaluate_pattern(pattern)?;
                        if table.name() == merged.name() {
                            merged.merge(&table, false);
                        }
                    }
                    self.pattern_tables.push(merged.clone());
                    per_pattern.push(merged);
                }
                let table = finish_group(group, per_pattern);
                self.group_tables.push((group.join_as_union(), table));
            }
            join_groups(&self.group_tables)
        };

        // per-store describe rows, deduplicated by row equality
        let mut results = describe_table();
        let mut seen = HashSet::new();
        for target in self.describe_targets(&query_table) {
            for store in federation.iter() {
                for row in Source::Store(store).describe_rows(&target)? {
                    if seen.insert(row.clone()) {
                        results.push_row(row.into_iter().map(Some).collect());
                    }
                }
            }
        }
        apply_modifiers(self.query.modifiers(), &mut results);
        Ok(DescribeQueryResult::new(self.query.to_string(), results))
    }

    fn describe(&self, source: &Source, query_table: &ResultTable) -> QueryResult<ResultTable> {
        let mut results = describe_table();
        for target in self.describe_targets(query_table) {
            for row in source.describe_rows(&target)? {
                results.push_row(row.into_iter().map(Some).collect());
            }
        }
        Ok(results)
    }

    /// The string forms of the terms to describe, in declaration order,
    /// deduplicated. `DESCRIBE *` takes every value of every variable.
    fn describe_targets(&self, query_table: &ResultTable) -> Vec<String> {
        let mut targets = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |t: String, targets: &mut Vec<String>| {
            if seen.insert(t.clone()) {
                targets.push(t);
            }
        };
        if self.query.is_star() {
            let columns: Vec<String> = query_table.columns().to_vec();
            for column in columns {
                for value in query_table.distinct_values(&column) {
                    push(value, &mut targets);
                }
            }
        } else {
            for term in self.query.describe_terms() {
                match term {
                    DescribeTerm::Resource(r) => push(r.to_string(), &mut targets),
                    DescribeTerm::Variable(v) => {
                        for value in query_table.distinct_values(v.name()) {
                            push(value, &mut targets);
                        }
                    }
                }
            }
        }
        targets
    }
}

/// Combine a group's pattern tables by natural join, then apply its filters.
fn finish_group(group: &PatternGroup, tables: Vec<ResultTable>) -> ResultTable {
    let mut iter = tables.into_iter();
    let mut combined = match iter.next() {
        Some(first) => iter.fold(first, |acc, t| acc.natural_join(&t)),
        None => ResultTable::new(group.name()),
    };
    if !group.filters().is_empty() {
        combined.retain(|row: &Row| group.filters().iter().all(|f| f.evaluate(row)));
    }
    combined.set_name(group.name());
    combined
}

/// Join the group tables left to right; a group flagged union-with-next
/// absorbs the following group into its union block first.
fn join_groups(tables: &[(bool, ResultTable)]) -> ResultTable {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < tables.len() {
        let mut block = tables[i].1.clone();
        while tables[i].0 && i + 1 < tables.len() {
            i += 1;
            block = block.union(&tables[i].1);
        }
        blocks.push(block);
        i += 1;
    }
    let mut iter = blocks.into_iter();
    match iter.next() {
        Some(first) => iter.fold(first, |acc, b| acc.natural_join(&b)),
        None => ResultTable::new("query"),
    }
}

/// Limit applies before Offset, regardless of the order they were added in.
fn apply_modifiers(modifiers: &[Modifier], table: &mut ResultTable) {
    if let Some(Modifier::Limit(n)) = modifiers
        .iter()
        .find(|m| matches!(m, Modifier::Limit(_)))
    {
        table.limit(*n);
    }
    if let Some(Modifier::Offset(n)) = modifiers
        .iter()
        .find(|m| matches!(m, Modifier::Offset(_)))
    {
        table.offset(*n);
    }
}

fn evaluate_on_graph(pattern: &Pattern, graph: &Graph) -> ResultTable {
    let columns: Vec<String> = pattern
        .variables()
        .iter()
        .map(|v| v.name().to_string())
        .collect();
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut table = ResultTable::with_columns(&pattern.to_string(), &column_refs);

    for t in graph.iter() {
        let mut bindings = Row::new();
        if !match_item(pattern.subject(), &Term::Resource(t.subject().clone()), &mut bindings) {
            continue;
        }
        if !match_item(pattern.predicate(), &Term::Resource(t.predicate().clone()), &mut bindings)
        {
            continue;
        }
        if !match_item(pattern.object(), t.object(), &mut bindings) {
            continue;
        }
        table.push_bindings(&bindings);
    }
    table
}

fn evaluate_on_store(pattern: &Pattern, store: &dyn Store) -> QueryResult<ResultTable> {
    let columns: Vec<String> = pattern
        .variables()
        .iter()
        .map(|v| v.name().to_string())
        .collect();
    let column_refs: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut table = ResultTable::with_columns(&pattern.to_string(), &column_refs);

    let ctx = ground_resource(pattern.context());
    let subj = ground_resource(Some(pattern.subject()));
    let pred = ground_resource(Some(pattern.predicate()));
    let (obj, lit) = match pattern.object() {
        PatternItem::Ground(Term::Resource(r)) => (Some(r), None),
        PatternItem::Ground(t) => (None, Some(t)),
        PatternItem::Variable(_) => (None, None),
    };

    for q in store.select_quadruples(ctx, subj, pred, obj, lit)? {
        let mut bindings = Row::new();
        if let Some(item) = pattern.context() {
            if !match_item(item, &Term::Resource(q.context().clone()), &mut bindings) {
                continue;
            }
        }
        if !match_item(pattern.subject(), &Term::Resource(q.subject().clone()), &mut bindings) {
            continue;
        }
        if !match_item(pattern.predicate(), &Term::Resource(q.predicate().clone()), &mut bindings)
        {
            continue;
        }
        if !match_item(pattern.object(), q.object(), &mut bindings) {
            continue;
        }
        table.push_bindings(&bindings);
    }
    Ok(table)
}

fn ground_resource(item: Option<&PatternItem>) -> Option<&Resource> {
    match item? {
        PatternItem::Ground(Term::Resource(r)) => Some(r),
        _ => None,
    }
}

/// Match one pattern slot against an actual term, extending the row's
/// bindings; a variable bound earlier in the same pattern must rebind to the
/// same value.
fn match_item(item: &PatternItem, actual: &Term, bindings: &mut Row) -> bool {
    match item {
        PatternItem::Ground(t) => t == actual,
        PatternItem::Variable(v) => {
            let value = actual.to_string();
            match bindings.get(v.name()) {
                Some(previous) => previous == &value,
                None => {
                    bindings.insert(v.name().to_string(), value);
                    true
                }
            }
        }
    }
}
