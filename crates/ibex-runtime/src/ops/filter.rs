// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::Table;
use ibex_ir::FilterBool;

use crate::error::RuntimeError;
use crate::eval::{eval_filter_bool, ScalarRegistry};
use crate::ops::util::select_rows;

/// Keeps rows for which `predicate` evaluates `true`, preserving input
/// order.
pub fn filter(input: &Table, predicate: &FilterBool, scalars: &ScalarRegistry) -> Result<Table, RuntimeError> {
    let mut rows = Vec::new();
    for row in 0..input.rows() {
        if eval_filter_bool(predicate, input, row, scalars)? {
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

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;
    use ibex_ir::{CompareOp, FilterValue, Literal};

    #[test]
    fn keeps_matching_rows_in_order() {
        let mut input = Table::new();
        input.add_column("price", Column::from_ints(vec![10, 20, 30]));
        let predicate = FilterBool::Compare {
            op: CompareOp::Gt,
            left: FilterValue::Column("price".into()),
            right: FilterValue::Literal(Literal::Int(15)),
        };
        let output = filter(&input, &predicate, &ScalarRegistry::new()).unwrap();
        assert_eq!(output.rows(), 2);
        assert_eq!(output.find("price").unwrap().get(0), Some(ibex_column::Value::Int(20)));
    }

    #[test]
    fn missing_column_errors() {
        let mut input = Table::new();
        input.add_column("price", Column::from_ints(vec![1]));
        let predicate = FilterBool::Compare {
            op: CompareOp::Eq,
            left: FilterValue::Column("nope".into()),
            right: FilterValue::Literal(Literal::Int(1)),
        };
        let err = filter(&input, &predicate, &ScalarRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ColumnNotFound {
                context: "filter",
                name: "nope".into(),
            }
        );
    }
}
