// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive selection from a candidate list.
//!
//! Candidates are printed as a 1-based indexed table, and the user answers
//! with a comma-separated list of labels or indices.
//!
//! # Table Layout
//!
//! The table uses `round(N^0.4)` columns and `ceil(N / columns)` rows for N
//! candidates, which keeps long lists roughly square instead of one tall
//! column. Candidates fill the table column by column, so reading down a
//! column follows the original order. Every column is padded on its own: the
//! index is right-justified and the label left-justified to the widest entry
//! of that column.
//!
//! # Input Resolution
//!
//! Input is split on commas without trimming. A token resolves to the
//! candidate with the exact same label, or failing that, to the candidate at
//! that 1-based index. A single unresolvable token rejects the whole answer
//! and the prompt is shown again.

use crate::term::{format_line, Severity, Terminal};

use tracing::debug;

/// Insertion ordered label to value mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates<V> {
    entries: Vec<(String, V)>,
}

impl<V> Candidates<V> {
    /// Construct empty candidate list.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert candidate.
    ///
    /// Inserting an existing label replaces its value, but keeps its original
    /// position.
    pub fn insert(&mut self, label: impl Into<String>, value: V) {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((label, value)),
        }
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels in insertion order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    /// Value by label.
    pub fn get(&self, label: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, value)| value)
    }

    /// Value by 1-based index.
    pub fn nth(&self, index: usize) -> Option<&V> {
        index
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(|(_, value)| value)
    }
}

impl<V> Default for Candidates<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, V> FromIterator<(L, V)> for Candidates<V>
where
    L: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut candidates = Self::new();
        for (label, value) in iter {
            candidates.insert(label, value);
        }
        candidates
    }
}

/// Table dimensions for a candidate count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub columns: usize,
    pub rows: usize,
}

impl Layout {
    /// Compute table dimensions for `count` candidates.
    pub fn for_count(count: usize) -> Self {
        if count == 0 {
            return Self {
                columns: 0,
                rows: 0,
            };
        }

        let columns = ((count as f64).powf(0.4).round() as usize).max(1);
        let rows = count.div_ceil(columns);
        Self { columns, rows }
    }

    /// Column and row of candidate at 0-based position.
    pub fn cell(&self, position: usize) -> (usize, usize) {
        (position / self.rows, position % self.rows)
    }
}

/// Render labels as an indexed multi-column table.
///
/// Returns one string per table row. Trailing padding is trimmed.
pub fn render_table(labels: &[&str]) -> Vec<String> {
    let layout = Layout::for_count(labels.len());
    let mut index_widths = vec![0; layout.columns];
    let mut label_widths = vec![0; layout.columns];

    for (position, label) in labels.iter().enumerate() {
        let (column, _) = layout.cell(position);
        let index_len = (position + 1).to_string().len();
        index_widths[column] = index_widths[column].max(index_len);
        label_widths[column] = label_widths[column].max(label.chars().count());
    }

    (0..layout.rows)
        .map(|row| {
            let cells = (row..labels.len())
                .step_by(layout.rows)
                .map(|position| {
                    let (column, _) = layout.cell(position);
                    format!(
                        "{:>index_width$}) {:<label_width$}",
                        position + 1,
                        labels[position],
                        index_width = index_widths[column],
                        label_width = label_widths[column],
                    )
                })
                .collect::<Vec<_>>();
            cells.join("  ").trim_end().to_string()
        })
        .collect()
}

/// Resolve comma-separated input against candidates.
///
/// Returns the resolved values in input order, or every token that could not
/// be resolved.
pub fn resolve<V>(candidates: &Candidates<V>, input: &str) -> Result<Vec<V>, Vec<String>>
where
    V: Clone,
{
    let mut resolved = Vec::new();
    let mut invalid = Vec::new();

    for token in input.split(',') {
        let value = candidates.get(token).or_else(|| {
            token
                .parse::<usize>()
                .ok()
                .and_then(|index| candidates.nth(index))
        });

        match value {
            Some(value) => resolved.push(value.clone()),
            None => invalid.push(token.to_string()),
        }
    }

    if invalid.is_empty() {
        Ok(resolved)
    } else {
        Err(invalid)
    }
}

/// Show candidate table and prompt until input resolves.
///
/// An empty candidate list resolves to an empty selection without prompting.
///
/// # Errors
///
/// - Return [`crate::term::TermError::Cancelled`] if user interrupts prompt.
pub fn select<V>(
    terminal: &mut dyn Terminal,
    patch: Option<&str>,
    candidates: &Candidates<V>,
    prompt: &str,
) -> crate::term::Result<Vec<V>>
where
    V: Clone,
{
    if candidates.is_empty() {
        debug!("nothing to select from for {prompt:?}");
        return Ok(Vec::new());
    }

    for row in render_table(&candidates.labels()) {
        terminal.print(Severity::Plain, &row);
    }

    let prompt = match patch {
        Some(name) => format!("[{name}] {prompt} (comma-separated) > "),
        None => format!("{prompt} (comma-separated) > "),
    };

    loop {
        let answer = terminal.ask(&prompt)?;
        match resolve(candidates, &answer) {
            Ok(values) => return Ok(values),
            Err(invalid) => {
                let message = format!(
                    "Invalid input '{}'. Input a valid value or number.",
                    invalid.join(",")
                );
                terminal.print(
                    Severity::Warning,
                    &format_line(patch, Severity::Warning, &message),
                );
            }
        }
    }
}
