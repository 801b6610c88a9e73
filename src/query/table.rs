//! String-typed result tables: one column per variable, one row per binding.

use std::collections::{HashMap, HashSet};

use super::filter::Row;

/// A named table of string-typed columns. Cells hold a term's string form,
/// or nothing when the variable is unbound in that row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    pub fn new(name: &str) -> Self {
        ResultTable {
            name: name.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn with_columns(name: &str, columns: &[&str]) -> Self {
        ResultTable {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// The cell at `row`/`column`, if that variable is bound there.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// Append a row given cells aligned with [`ResultTable::columns`].
    pub fn push_row(&mut self, cells: Vec<Option<String>>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(cells);
    }

    /// Append a row from a bindings map; variables missing from the map stay
    /// unbound.
    pub fn push_bindings(&mut self, bindings: &Row) {
        let cells = self
            .columns
            .iter()
            .map(|c| bindings.get(c).cloned())
            .collect();
        self.rows.push(cells);
    }

    /// The bound cells of one row, as a bindings map.
    pub fn row(&self, index: usize) -> Row {
        let mut map = Row::new();
        if let Some(cells) = self.rows.get(index) {
            for (col, cell) in self.columns.iter().zip(cells) {
                if let Some(v) = cell {
                    map.insert(col.clone(), v.clone());
                }
            }
        }
        map
    }

    /// Every distinct bound value of a column, in row order.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let Some(idx) = self.column_index(column) else {
            return out;
        };
        for row in &self.rows {
            if let Some(Some(v)) = row.get(idx) {
                if seen.insert(v.clone()) {
                    out.push(v.clone());
                }
            }
        }
        out
    }

    /// Drop rows for which `keep` returns false.
    pub fn retain<F: FnMut(&Row) -> bool>(&mut self, mut keep: F) {
        let columns = self.columns.clone();
        self.rows.retain(|cells| {
            let mut map = Row::new();
            for (col, cell) in columns.iter().zip(cells) {
                if let Some(v) = cell {
                    map.insert(col.clone(), v.clone());
                }
            }
            keep(&map)
        });
    }

    /// Natural join: rows pair up when every shared column is bound to the
    /// same value on both sides. With no shared column this is the cross
    /// product. Rows leaving a shared column unbound never pair.
    pub fn natural_join(&self, other: &ResultTable) -> ResultTable {
        let shared: Vec<String> = self
            .columns
            .iter()
            .filter(|c| other.columns.contains(c))
            .cloned()
            .collect();
        let mut columns: Vec<String> = self.columns.clone();
        for c in &other.columns {
            if !columns.contains(c) {
                columns.push(c.clone());
            }
        }
        let mut joined = ResultTable {
            name: self.name.clone(),
            columns,
            rows: Vec::new(),
        };

        // index the right side by its shared-column key
        let mut index: HashMap<Vec<&str>, Vec<usize>> = HashMap::new();
        'right: for (i, row) in other.rows.iter().enumerate() {
            let mut key = Vec::with_capacity(shared.len());
            for c in &shared {
                let idx = other.column_index(c).expect("shared column");
                match &row[idx] {
                    Some(v) => key.push(v.as_str()),
                    None => continue 'right,
                }
            }
            index.entry(key).or_default().push(i);
        }

        'left: for left in &self.rows {
            let mut key = Vec::with_capacity(shared.len());
            for c in &shared {
                let idx = self.column_index(c).expect("shared column");
                match &left[idx] {
                    Some(v) => key.push(v.as_str()),
                    None => continue 'left,
                }
            }
            let Some(matches) = index.get(&key) else {
                continue;
            };
            for &i in matches {
                let right = &other.rows[i];
                let mut cells = left.clone();
                for (c, cell) in other.columns.iter().zip(right) {
                    if !self.columns.contains(c) {
                        cells.push(cell.clone());
                    }
                }
                joined.rows.push(cells);
            }
        }
        joined
    }

    /// Merge `other`'s rows into this table, aligning columns by name and
    /// adding the columns this table lacks. With `dedup`, rows equal to an
    /// existing row are dropped.
    pub fn merge(&mut self, other: &ResultTable, dedup: bool) {
        for c in &other.columns {
            if !self.columns.contains(c) {
                self.columns.push(c.clone());
                for row in &mut self.rows {
                    row.push(None);
                }
            }
        }
        let mut seen: HashSet<Vec<Option<String>>> = if dedup {
            self.rows.iter().cloned().collect()
        } else {
            HashSet::new()
        };
        for row in &other.rows {
            let cells: Vec<Option<String>> = self
                .columns
                .iter()
                .map(|c| {
                    other
                        .column_index(c)
                        .and_then(|idx| row.get(idx).cloned().flatten())
                })
                .collect();
            if dedup && !seen.insert(cells.clone()) {
                continue;
            }
            self.rows.push(cells);
        }
    }

    /// Union of two tables: merged columns, deduplicated rows.
    pub fn union(&self, other: &ResultTable) -> ResultTable {
        let mut out = self.clone();
        // dedup also within the left side
        let mut seen = HashSet::new();
        out.rows.retain(|r| seen.insert(r.clone()));
        out.merge(other, true);
        out
    }

    /// Keep at most the first `n` rows.
    pub fn limit(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Drop the first `n` rows.
    pub fn offset(&mut self, n: usize) {
        self.rows.drain(..n.min(self.rows.len()));
    }
}
