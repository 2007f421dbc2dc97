// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashMap;

use ibex_column::{Table, Value};
use ibex_extern::ExternRead;
use ibex_ir::ValueExpr;

use crate::error::RuntimeError;
use crate::eval::{eval_value_expr, infer_value_expr_type, ScalarRegistry};
use crate::ops::util::empty_column;

/// Evaluates each field expression per row and appends (or replaces)
/// it under its alias. Fields are applied in order, so a later field
/// may reference an earlier one's alias.
pub fn update(
    input: &Table,
    fields: &[(String, ValueExpr)],
    scalars: &ScalarRegistry,
    externs: &ExternRead<'_>,
) -> Result<Table, RuntimeError> {
    let mut output = input.clone();
    for (alias, expr) in fields {
        let element_type = infer_value_expr_type(expr, &output, scalars, externs)?;
        let mut column = empty_column(element_type);
        column.reserve(output.rows());
        for row in 0..output.rows() {
            column.push(eval_value_expr(expr, &output, row, scalars, externs)?)?;
        }
        output.add_column(alias.clone(), column);
    }
    Ok(output)
}

/// Partitions rows by the group-by key, evaluates each field once per
/// group using the group's first row as a representative, then
/// broadcasts that scalar back to every row of the group. Which row
/// stands in for the group when the expression isn't itself an
/// aggregate is otherwise unconstrained; this picks first-occurrence
/// order's first row, mirroring `first`'s semantics elsewhere in the
/// engine.
pub fn update_grouped(
    input: &Table,
    fields: &[(String, ValueExpr)],
    group_by: &[String],
    scalars: &ScalarRegistry,
    externs: &ExternRead<'_>,
) -> Result<Table, RuntimeError> {
    for name in group_by {
        if !input.contains(name) {
            return Err(RuntimeError::ColumnNotFound {
                context: "group-by",
                name: name.clone(),
            });
        }
    }
    let group_columns: Vec<_> = group_by.iter().map(|name| input.find(name).expect("checked above")).collect();

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
    for row in 0..input.rows() {
        let key: Vec<Value> = group_columns.iter().map(|column| column.get_unchecked(row)).collect();
        let group_idx = *index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[group_idx].push(row);
    }

    let mut output = input.clone();
    for (alias, expr) in fields {
        let element_type = infer_value_expr_type(expr, &output, scalars, externs)?;
        let mut broadcast: Vec<Option<Value>> = vec![None; output.rows()];
        for group in &groups {
            let representative = group[0];
            let value = eval_value_expr(expr, &output, representative, scalars, externs)?;
            for &row in group {
                broadcast[row] = Some(value.clone());
            }
        }
        let mut column = empty_column(element_type);
        column.reserve(output.rows());
        for value in broadcast {
            column.push(value.expect("every row belongs to exactly one group"))?;
        }
        output.add_column(alias.clone(), column);
    }
    Ok(output)
}
