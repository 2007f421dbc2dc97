// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression evaluation and type promotion.

use std::collections::HashMap;

use ibex_column::{ElementType, Table, Value};
use ibex_extern::{ExternRead, ScalarValue};
use ibex_ir::{ArithOp, CompareOp, FilterBool, FilterValue, Literal, ValueExpr};

use crate::error::RuntimeError;

/// Per-query bindings for names that are not table columns: `let`-bound
/// scalars and the results of scalar extern calls. A hit here acts as
/// a broadcast constant when a name isn't found as a column.
pub type ScalarRegistry = HashMap<String, ScalarValue>;

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(v) => Value::Int(*v),
        Literal::Float(v) => Value::Float(*v),
        Literal::Str(v) => Value::Str(v.clone()),
    }
}

fn scalar_element_type(value: &ScalarValue) -> ElementType {
    match value {
        ScalarValue::Int(_) => ElementType::Int,
        ScalarValue::Float(_) => ElementType::Float,
        ScalarValue::Str(_) => ElementType::Str,
    }
}

fn value_to_scalar(value: Value) -> Result<ScalarValue, RuntimeError> {
    let element_type = value.element_type();
    ScalarValue::try_from(value).map_err(|_| RuntimeError::UnsupportedExternArgType(element_type))
}

/// Resolves a bare name against the table's columns first, then the
/// per-query scalar registry.
fn resolve_name(
    table: &Table,
    row: usize,
    name: &str,
    scalars: &ScalarRegistry,
    context: &'static str,
) -> Result<Value, RuntimeError> {
    if let Some(column) = table.find(name) {
        return Ok(column.get_unchecked(row));
    }
    if let Some(scalar) = scalars.get(name) {
        return Ok(scalar.clone().into());
    }
    Err(RuntimeError::ColumnNotFound {
        context,
        name: name.to_string(),
    })
}

fn resolve_name_type(
    table: &Table,
    name: &str,
    scalars: &ScalarRegistry,
    context: &'static str,
) -> Result<ElementType, RuntimeError> {
    if let Some(column) = table.find(name) {
        return Ok(column.element_type());
    }
    if let Some(scalar) = scalars.get(name) {
        return Ok(scalar_element_type(scalar));
    }
    Err(RuntimeError::ColumnNotFound {
        context,
        name: name.to_string(),
    })
}

/// Evaluates Int/Float arithmetic, promoting to Float when either side
/// is a Float. Strings are rejected outright; other non-numeric
/// element types (dates, timestamps, categoricals) are rejected as
/// well, since arithmetic is only defined over numbers.
pub fn eval_arith(left: Value, right: Value, op: ArithOp) -> Result<Value, RuntimeError> {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return Err(RuntimeError::StringArithmetic);
    }
    let (Some(lf), Some(rf)) = (left.as_f64(), right.as_f64()) else {
        let bad = if left.as_f64().is_none() { &left } else { &right };
        return Err(RuntimeError::ArithmeticUnsupported(bad.element_type()));
    };
    if let (Value::Int(a), Value::Int(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        return Ok(match op {
            ArithOp::Add => Value::Int(a + b),
            ArithOp::Sub => Value::Int(a - b),
            ArithOp::Mul => Value::Int(a * b),
            ArithOp::Div => Value::Float(a as f64 / b as f64),
            ArithOp::Mod => Value::Int(a % b),
        });
    }
    Ok(Value::Float(match op {
        ArithOp::Add => lf + rf,
        ArithOp::Sub => lf - rf,
        ArithOp::Mul => lf * rf,
        ArithOp::Div => lf / rf,
        ArithOp::Mod => lf % rf,
    }))
}

fn arith_result_type(left: ElementType, right: ElementType, op: ArithOp) -> Result<ElementType, RuntimeError> {
    if left == ElementType::Str || right == ElementType::Str {
        return Err(RuntimeError::StringArithmetic);
    }
    let numeric = |t: ElementType| matches!(t, ElementType::Int | ElementType::Float);
    if !numeric(left) {
        return Err(RuntimeError::ArithmeticUnsupported(left));
    }
    if !numeric(right) {
        return Err(RuntimeError::ArithmeticUnsupported(right));
    }
    Ok(match op {
        ArithOp::Div => ElementType::Float,
        ArithOp::Mod if left == ElementType::Int && right == ElementType::Int => ElementType::Int,
        ArithOp::Mod => ElementType::Float,
        _ if left == ElementType::Float || right == ElementType::Float => ElementType::Float,
        _ => ElementType::Int,
    })
}

pub fn eval_filter_value(
    expr: &FilterValue,
    table: &Table,
    row: usize,
    scalars: &ScalarRegistry,
) -> Result<Value, RuntimeError> {
    match expr {
        FilterValue::Column(name) => resolve_name(table, row, name, scalars, "filter"),
        FilterValue::Literal(lit) => Ok(literal_value(lit)),
        FilterValue::Arith { op, left, right } => {
            let left = eval_filter_value(left, table, row, scalars)?;
            let right = eval_filter_value(right, table, row, scalars)?;
            eval_arith(left, right, *op)
        }
    }
}

fn compare_values(left: &Value, right: &Value, op: CompareOp) -> Result<bool, RuntimeError> {
    use std::cmp::Ordering;
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (a, b) if a.as_f64().is_some() && b.as_f64().is_some() => a
            .as_f64()
            .unwrap()
            .partial_cmp(&b.as_f64().unwrap())
            .unwrap_or(Ordering::Greater),
        _ => {
            return Err(RuntimeError::FilterTypeMismatch {
                left: left.element_type(),
                right: right.element_type(),
            })
        }
    };
    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Neq => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

pub fn eval_filter_bool(
    expr: &FilterBool,
    table: &Table,
    row: usize,
    scalars: &ScalarRegistry,
) -> Result<bool, RuntimeError> {
    match expr {
        FilterBool::Compare { op, left, right } => {
            let left = eval_filter_value(left, table, row, scalars)?;
            let right = eval_filter_value(right, table, row, scalars)?;
            compare_values(&left, &right, *op)
        }
        FilterBool::And(left, right) => {
            Ok(eval_filter_bool(left, table, row, scalars)? && eval_filter_bool(right, table, row, scalars)?)
        }
        FilterBool::Or(left, right) => {
            Ok(eval_filter_bool(left, table, row, scalars)? || eval_filter_bool(right, table, row, scalars)?)
        }
        FilterBool::Not(inner) => Ok(!eval_filter_bool(inner, table, row, scalars)?),
    }
}

pub fn eval_value_expr(
    expr: &ValueExpr,
    table: &Table,
    row: usize,
    scalars: &ScalarRegistry,
    externs: &ExternRead<'_>,
) -> Result<Value, RuntimeError> {
    match expr {
        ValueExpr::Column(name) => resolve_name(table, row, name, scalars, "update"),
        ValueExpr::Literal(lit) => Ok(literal_value(lit)),
        ValueExpr::Binary { op, left, right } => {
            let left = eval_value_expr(left, table, row, scalars, externs)?;
            let right = eval_value_expr(right, table, row, scalars, externs)?;
            eval_arith(left, right, *op)
        }
        ValueExpr::Call { name, args } => {
            let mut argv = Vec::with_capacity(args.len());
            for arg in args {
                let value = eval_value_expr(arg, table, row, scalars, externs)?;
                argv.push(value_to_scalar(value)?);
            }
            let result = externs.call_scalar(name, &argv)?;
            Ok(result.into())
        }
    }
}

/// Infers the element type a `ValueExpr` will produce, used by `Update`
/// to choose the output column's storage type ahead of evaluating it
/// per row. `Call` nodes can't be typed structurally, so they're
/// resolved by evaluating row 0 of the input (if any rows exist); an
/// empty input table with a `Call` field falls back to `Float` since
/// there is no row to probe.
pub fn infer_value_expr_type(
    expr: &ValueExpr,
    table: &Table,
    scalars: &ScalarRegistry,
    externs: &ExternRead<'_>,
) -> Result<ElementType, RuntimeError> {
    match expr {
        ValueExpr::Column(name) => resolve_name_type(table, name, scalars, "update"),
        ValueExpr::Literal(lit) => Ok(literal_value(lit).element_type()),
        ValueExpr::Binary { op, left, right } => {
            let left = infer_value_expr_type(left, table, scalars, externs)?;
            let right = infer_value_expr_type(right, table, scalars, externs)?;
            arith_result_type(left, right, *op)
        }
        ValueExpr::Call { .. } => {
            if table.rows() == 0 {
                Ok(ElementType::Float)
            } else {
                Ok(eval_value_expr(expr, table, 0, scalars, externs)?.element_type())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;
    use ibex_ir::CompareOp;

    fn table_with_price() -> Table {
        let mut table = Table::new();
        table.add_column("price", Column::from_ints(vec![10, 20, 30]));
        table
    }

    #[test]
    fn int_div_promotes_to_float() {
        let result = eval_arith(Value::Int(7), Value::Int(2), ArithOp::Div).unwrap();
        assert_eq!(result, Value::Float(3.5));
    }

    #[test]
    fn int_mod_stays_int() {
        let result = eval_arith(Value::Int(7), Value::Int(2), ArithOp::Mod).unwrap();
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    fn string_arithmetic_errors() {
        let err = eval_arith(Value::Str("a".into()), Value::Int(1), ArithOp::Add).unwrap_err();
        assert_eq!(err, RuntimeError::StringArithmetic);
    }

    #[test]
    fn filter_compare_promotes_int_to_float() {
        let table = table_with_price();
        let scalars = ScalarRegistry::new();
        let expr = FilterBool::Compare {
            op: CompareOp::Gt,
            left: FilterValue::Column("price".into()),
            right: FilterValue::Literal(Literal::Float(15.5)),
        };
        assert!(eval_filter_bool(&expr, &table, 1, &scalars).unwrap());
        assert!(!eval_filter_bool(&expr, &table, 0, &scalars).unwrap());
    }

    #[test]
    fn scalar_registry_backs_unknown_column() {
        let table = Table::new();
        let mut scalars = ScalarRegistry::new();
        scalars.insert("threshold".into(), ScalarValue::Int(42));
        let value = resolve_name(&table, 0, "threshold", &scalars, "filter").unwrap();
        assert_eq!(value, Value::Int(42));
    }

    #[test]
    fn unknown_name_errors_with_context() {
        let table = Table::new();
        let scalars = ScalarRegistry::new();
        let err = resolve_name(&table, 0, "missing", &scalars, "filter").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ColumnNotFound {
                context: "filter",
                name: "missing".into(),
            }
        );
    }
}
