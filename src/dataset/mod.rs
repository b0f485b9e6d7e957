//! Tabular data model
//!
//! A [`Dataset`] is the ordered collection of [`Table`]s loaded from one
//! spreadsheet. Tables are also how the data agent returns tabular answers,
//! so the column de-duplication used before display lives here too.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named relation with a fixed, ordered set of columns
///
/// Every row has exactly one cell per column; constructors pad short rows
/// with empty cells and drop cells beyond the last column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from explicit columns and rows
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::dataset::Table;
    ///
    /// let table = Table::new(
    ///     "orders",
    ///     vec!["id".to_string(), "total".to_string()],
    ///     vec![vec!["1".to_string()]],
    /// );
    /// assert_eq!(table.rows()[0], vec!["1".to_string(), String::new()]);
    /// ```
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Build a table from raw sheet rows, promoting the first row to column names
    ///
    /// Returns `None` when the sheet has no rows at all. Blank header cells
    /// get a positional label and repeated header names are made unique.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::dataset::Table;
    ///
    /// let rows = vec![
    ///     vec!["name".to_string(), "age".to_string()],
    ///     vec!["Ada".to_string(), "36".to_string()],
    /// ];
    /// let table = Table::from_sheet_rows("people", rows).unwrap();
    /// assert_eq!(table.columns(), &["name".to_string(), "age".to_string()]);
    /// assert_eq!(table.row_count(), 1);
    /// ```
    pub fn from_sheet_rows(name: impl Into<String>, rows: Vec<Vec<String>>) -> Option<Self> {
        let mut rows = rows.into_iter();
        let header = rows.next()?;
        let data: Vec<Vec<String>> = rows.collect();

        let width = data
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(header.len());

        let mut columns: Vec<String> = header
            .into_iter()
            .map(|cell| cell.trim().to_string())
            .collect();
        columns.resize(width, String::new());
        for (idx, column) in columns.iter_mut().enumerate() {
            if column.is_empty() {
                *column = generic_label(idx);
            }
        }

        let mut table = Self::new(name, columns, data);
        table.dedupe_columns();
        Some(table)
    }

    /// Table name (sheet title for loaded tables)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether every column name is distinct
    pub fn has_unique_columns(&self) -> bool {
        let mut seen = HashSet::new();
        self.columns.iter().all(|c| seen.insert(c.as_str()))
    }

    /// Make column names unique
    ///
    /// While some name repeats, its first occurrence is renamed to a generic
    /// positional label (`column_<index>`). Tables whose names are already
    /// unique are left untouched. Returns whether anything was renamed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::dataset::Table;
    ///
    /// let mut table = Table::new(
    ///     "answer",
    ///     vec!["id".to_string(), "name".to_string(), "id".to_string()],
    ///     vec![],
    /// );
    /// assert!(table.dedupe_columns());
    /// assert_eq!(table.columns(), &["column_0", "name", "id"]);
    /// ```
    pub fn dedupe_columns(&mut self) -> bool {
        let mut renamed = false;

        while let Some(idx) = self.first_repeated_column() {
            let mut label = generic_label(idx);
            let mut suffix = 1;
            while self.columns.contains(&label) {
                label = format!("{}_{}", generic_label(idx), suffix);
                suffix += 1;
            }

            tracing::debug!(
                table = %self.name,
                from = %self.columns[idx],
                to = %label,
                "Renaming duplicate column"
            );
            self.columns[idx] = label;
            renamed = true;
        }

        renamed
    }

    fn first_repeated_column(&self) -> Option<usize> {
        self.columns
            .iter()
            .enumerate()
            .find(|&(idx, name)| self.columns[idx + 1..].contains(name))
            .map(|(idx, _)| idx)
    }

    /// Textual summary used to brief the LLM about this table
    ///
    /// Lists the column names followed by up to `sample_rows` example rows.
    pub fn summary(&self, sample_rows: usize) -> String {
        let mut text = format!(
            "Table \"{}\". Data Frame has column names: \n {}",
            self.name,
            self.columns.join(", ")
        );
        text.push_str(" \n Some example rows according to Data Frame are: ");
        for (idx, row) in self.rows.iter().take(sample_rows).enumerate() {
            text.push_str(&format!(" \n Row {}: {}", idx + 1, row.join(", ")));
        }
        text
    }

    /// Render the header and up to `max_rows` rows as comma-separated lines
    pub fn to_delimited(&self, max_rows: usize) -> String {
        let mut lines = Vec::with_capacity(max_rows.min(self.rows.len()) + 1);
        lines.push(self.columns.join(","));
        lines.extend(self.rows.iter().take(max_rows).map(|row| row.join(",")));
        lines.join("\n")
    }
}

fn generic_label(idx: usize) -> String {
    format!("column_{}", idx)
}

/// The collection of tables loaded from one spreadsheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    tables: Vec<Table>,
}

impl Dataset {
    /// Create a dataset from tables in source order
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// Tables in source order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the dataset holds no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// One [`Table::summary`] per table, in table order
    pub fn summaries(&self, sample_rows: usize) -> Vec<String> {
        self.tables
            .iter()
            .map(|table| table.summary(sample_rows))
            .collect()
    }
}
