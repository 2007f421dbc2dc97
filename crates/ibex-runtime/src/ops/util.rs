// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::{Column, ColumnError};

/// Builds a new column holding just the given row indices of `column`,
/// in order, preserving each row's validity bit. Used by operators
/// that reorder or drop rows (`Filter`, `Distinct`, `Order`); `Project`
/// doesn't need this since it only selects whole columns.
pub(crate) fn select_rows(column: &Column, rows: &[usize]) -> Result<Column, ColumnError> {
    let mut out = column.empty_like();
    out.reserve(rows.len());
    let mut valid = Vec::with_capacity(rows.len());
    for &row in rows {
        out.push(column.get_unchecked(row))?;
        valid.push(column.is_valid(row));
    }
    Ok(out.with_validity(valid))
}

/// An empty column of the given element type, used by operators that
/// build an output schema (e.g. `Aggregate`) before any row exists to
/// clone from.
pub(crate) fn empty_column(element_type: ibex_column::ElementType) -> Column {
    use ibex_column::ElementType;
    match element_type {
        ElementType::Int => Column::from_ints(Vec::new()),
        ElementType::Float => Column::from_floats(Vec::new()),
        ElementType::Str => Column::from_strings(Vec::new()),
        ElementType::Date => Column::from_dates(Vec::new()),
        ElementType::Timestamp => Column::from_timestamps(Vec::new()),
        ElementType::Categorical => Column::from_categorical(Vec::new()),
    }
}

/// The element-type zero used to fill unmatched rows (`Left`/`Asof`
/// join, §4.4: "fills right-only columns with the element-type zero
/// (0 / 0.0 / \"\")"), and as a fallback for `first`/`last`/`min`/`max`
/// aggregation over a group that, by construction, can't actually be
/// empty except the zero-row global-aggregate edge case.
pub(crate) fn zero_value(element_type: ibex_column::ElementType) -> ibex_column::Value {
    use ibex_column::{ElementType, Value};
    match element_type {
        ElementType::Int => Value::Int(0),
        ElementType::Float => Value::Float(0.0),
        ElementType::Str | ElementType::Categorical => Value::Str(String::new()),
        ElementType::Date => Value::Date(0),
        ElementType::Timestamp => Value::Timestamp(0),
    }
}
