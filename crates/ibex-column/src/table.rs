// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashMap;

use thiserror::Error;
use tracing::trace;

use crate::column::Column;
use crate::value::ElementType;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("time index column not found: {0}")]
    TimeIndexNotFound(String),
    #[error("time index column {0} is not a timestamp column")]
    TimeIndexNotTimestamp(String),
}

/// An ordered, named collection of equal-length columns.
///
/// Invariants: column names are unique; every column has
/// the same length (the table's row count); insertion order is
/// preserved and observable, it drives projection output order and
/// join tie-breaks. A table may additionally carry a *time index*: the
/// name of one timestamp column, which makes it a `TimeFrame` eligible
/// for as-of joins and windowed aggregation.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<(String, Column)>,
    index: HashMap<String, usize>,
    time_index: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing it in place (preserving its original
    /// position) if a column of that name already exists, else
    /// appending it to the end.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) {
        let name = name.into();
        if let Some(&pos) = self.index.get(&name) {
            trace!(column = %name, "replacing existing column");
            self.columns[pos].1 = column;
        } else {
            trace!(column = %name, "appending new column");
            self.index.insert(name.clone(), self.columns.len());
            self.columns.push((name, column));
        }
    }

    pub fn find(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|&pos| &self.columns[pos].1)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Column> {
        let pos = *self.index.get(name)?;
        Some(&mut self.columns[pos].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Column names, in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `0` if the table has no columns, else the length of the first
    /// column (all columns are guaranteed equal length).
    pub fn rows(&self) -> usize {
        self.columns.first().map(|(_, col)| col.len()).unwrap_or(0)
    }

    pub fn time_index(&self) -> Option<&str> {
        self.time_index.as_deref()
    }

    /// Sets the time index, validating that the named column exists and
    /// is a timestamp column (making this table a TimeFrame).
    pub fn set_time_index(&mut self, name: impl Into<String>) -> Result<(), TableError> {
        let name = name.into();
        let column = self
            .find(&name)
            .ok_or_else(|| TableError::TimeIndexNotFound(name.clone()))?;
        if column.element_type() != ElementType::Timestamp {
            return Err(TableError::TimeIndexNotTimestamp(name));
        }
        self.time_index = Some(name);
        Ok(())
    }

    pub fn clear_time_index(&mut self) {
        self.time_index = None;
    }

    pub fn is_timeframe(&self) -> bool {
        self.time_index.is_some()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .zip(other.columns.iter())
                .all(|((n1, c1), (n2, c2))| n1 == n2 && c1 == c2)
            && self.time_index == other.time_index
    }
}
