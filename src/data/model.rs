use std::collections::HashSet;

use crate::error::TernaryError;

// ---------------------------------------------------------------------------
// CompositionRow – one compound / sample
// ---------------------------------------------------------------------------

/// A single row of the source table: a label and three non-negative amounts.
///
/// The unit is whatever the file uses (moles, parts, percent); only ratios
/// matter downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionRow {
    pub label: String,
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl CompositionRow {
    pub fn new(label: impl Into<String>, a: f64, b: f64, c: f64) -> Self {
        Self {
            label: label.into(),
            a,
            b,
            c,
        }
    }

    /// The raw composition vector `(a, b, c)`.
    pub fn composition(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }
}

// ---------------------------------------------------------------------------
// CompositionTable – the complete loaded file
// ---------------------------------------------------------------------------

/// The parsed table. Always holds at least one row.
#[derive(Debug, Clone)]
pub struct CompositionTable {
    /// Header names of the three composition columns.
    pub component_names: [String; 3],
    rows: Vec<CompositionRow>,
}

impl CompositionTable {
    /// Build a table, rejecting an empty row set.
    pub fn new(
        component_names: [String; 3],
        rows: Vec<CompositionRow>,
    ) -> Result<Self, TernaryError> {
        if rows.is_empty() {
            return Err(TernaryError::input_format("the table contains no data rows"));
        }
        Ok(Self {
            component_names,
            rows,
        })
    }

    pub fn rows(&self) -> &[CompositionRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Distinct labels in the order they first appear.
    pub fn unique_labels(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.label.as_str()))
            .map(|row| row.label.clone())
            .collect()
    }

    /// Composition of the first row carrying `label`.
    pub fn composition_of(&self, label: &str) -> Option<[f64; 3]> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(CompositionRow::composition)
    }
}
