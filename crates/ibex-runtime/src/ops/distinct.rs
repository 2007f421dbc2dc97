// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashSet;

use ibex_column::{Column, Table, Value};

use crate::error::RuntimeError;
use crate::ops::util::select_rows;

/// Retains the first occurrence of each distinct row, comparing values
/// across all columns, preserving first-occurrence order. NaN cells
/// compare equal to every other NaN via `Value`'s canonicalized
/// `Eq`/`Hash`.
pub fn distinct(input: &Table) -> Result<Table, RuntimeError> {
    let columns: Vec<&Column> = input.columns().map(|(_, column)| column).collect();
    let mut seen: HashSet<Vec<Value>> = HashSet::new();
    let mut rows = Vec::new();
    for row in 0..input.rows() {
        let key: Vec<Value> = columns.iter().map(|column| column.get_unchecked(row)).collect();
        if seen.insert(key) {
            rows.push(row);
        }
    }
    let mut output = Table::new();
    for (name, column) in input.columns() {
        output.add_column(name, select_rows(column, &rows)?);
    }
    if let Some(time_index) = input.time_index() {
        output
            .set_time_index(time_index)
            .expect("time index column is copied verbatim from the input");
    }
    Ok(output)
}
