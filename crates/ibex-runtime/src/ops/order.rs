// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::cmp::Ordering;

use ibex_column::{Column, Table, Value};
use ibex_ir::OrderKey;

use crate::error::RuntimeError;
use crate::ops::util::select_rows;

fn value_ordering(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        // `total_cmp` keeps NaN in a fixed position in the sort order
        // rather than treating every NaN comparison as "unordered".
        (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn compare_rows(column: &Column, a: usize, b: usize, ascending: bool) -> Ordering {
    let (a_valid, b_valid) = (column.is_valid(a), column.is_valid(b));
    if !a_valid || !b_valid {
        return match (a_valid, b_valid) {
            (false, false) => Ordering::Equal,
            (true, false) => {
                if ascending {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }
            }
            (false, true) => {
                if ascending {
                    Ordering::Greater
                } else {
                    Ordering::Less
                }
            }
            (true, true) => unreachable!(),
        };
    }
    let ordering = value_ordering(&column.get_unchecked(a), &column.get_unchecked(b));
    if ascending {
        ordering
    } else {
        ordering.reverse()
    }
}

/// Stable sort by the key list, major-to-minor. Nulls sort last in
/// ascending order, first in descending.
pub fn order(input: &Table, keys: &[OrderKey]) -> Result<Table, RuntimeError> {
    for key in keys {
        if !input.contains(&key.name) {
            return Err(RuntimeError::ColumnNotFound {
                context: "order",
                name: key.name.clone(),
            });
        }
    }
    let mut rows: Vec<usize> = (0..input.rows()).collect();
    rows.sort_by(|&a, &b| {
        for key in keys {
            let column = input.find(&key.name).expect("checked above");
            let ordering = compare_rows(column, a, b, key.ascending);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_descending_by_single_key() {
        let mut input = Table::new();
        input.add_column("price", Column::from_ints(vec![3, 1, 2]));
        let keys = vec![OrderKey {
            name: "price".into(),
            ascending: false,
        }];
        let output = order(&input, &keys).unwrap();
        let values: Vec<_> = (0..3).map(|row| output.find("price").unwrap().get(row)).collect();
        assert_eq!(
            values,
            vec![Some(Value::Int(3)), Some(Value::Int(2)), Some(Value::Int(1))]
        );
    }

    #[test]
    fn nulls_sort_last_ascending() {
        let mut input = Table::new();
        let column = Column::from_ints(vec![5, 1, 3]).with_validity(vec![true, false, true]);
        input.add_column("price", column);
        let keys = vec![OrderKey {
            name: "price".into(),
            ascending: true,
        }];
        let output = order(&input, &keys).unwrap();
        let values: Vec<_> = (0..3).map(|row| output.find("price").unwrap().get(row)).collect();
        assert_eq!(values, vec![Some(Value::Int(3)), Some(Value::Int(5)), None]);
    }
}
