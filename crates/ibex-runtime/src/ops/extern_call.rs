// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::Table;
use ibex_extern::{ExternError, ExternFn, ExternRead, ScalarValue};
use ibex_ir::{ExternArg, Literal};

use crate::error::RuntimeError;
use crate::eval::ScalarRegistry;

/// What an `ExternCall` node produces: a fresh table for source-style
/// callees, or a bound scalar for scalar and scalar-from-table
/// callees.
pub enum ExternCallResult {
    Table(Table),
    Scalar(ScalarValue),
}

fn resolve_arg(arg: &ExternArg, scalars: &ScalarRegistry) -> Result<ScalarValue, RuntimeError> {
    match arg {
        ExternArg::Literal(Literal::Int(v)) => Ok(ScalarValue::Int(*v)),
        ExternArg::Literal(Literal::Float(v)) => Ok(ScalarValue::Float(*v)),
        ExternArg::Literal(Literal::Str(v)) => Ok(ScalarValue::Str(v.clone())),
        ExternArg::ColumnRef(name) => scalars.get(name).cloned().ok_or_else(|| RuntimeError::ColumnNotFound {
            context: "extern",
            name: name.clone(),
        }),
    }
}

/// Looks `callee` up in the extern registry, resolves its arguments
/// (literals convert directly; column-ref arguments resolve against
/// the scalar registry, since an `ExternCall` node has no input table
/// to read a real column from), and dispatches. `source` supplies the
/// table a `scalar-from-table` callee (a `write_*` sink) reports on;
/// the interpreter passes it through when an `ExternCall` closes a
/// pipeline rather than opening one.
pub fn extern_call(
    callee: &str,
    args: &[ExternArg],
    scalars: &ScalarRegistry,
    source: Option<&Table>,
    externs: &ExternRead<'_>,
) -> Result<ExternCallResult, RuntimeError> {
    let argv = args
        .iter()
        .map(|arg| resolve_arg(arg, scalars))
        .collect::<Result<Vec<_>, _>>()?;
    match externs.get(callee) {
        Some(ExternFn::Table(_)) => Ok(ExternCallResult::Table(externs.call_table(callee, &argv)?)),
        Some(ExternFn::Scalar(_)) => Ok(ExternCallResult::Scalar(externs.call_scalar(callee, &argv)?)),
        Some(ExternFn::ScalarFromTable(_)) => {
            let table = source.ok_or_else(|| {
                RuntimeError::Extern(ExternError::WrongReturnKind {
                    callee: callee.to_string(),
                    expected: "scalar or table",
                    actual: "scalar-from-table",
                })
            })?;
            Ok(ExternCallResult::Scalar(externs.call_scalar_from_table(callee, table, &argv)?))
        }
        None => Err(RuntimeError::Extern(ExternError::UnknownCallee(callee.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;
    use ibex_extern::ExternRegistry;

    #[test]
    fn table_callee_returns_a_table() {
        let registry = ExternRegistry::new();
        registry.register_table("read_csv", |_| {
            let mut table = Table::new();
            table.add_column("a", Column::from_ints(vec![1]));
            Ok(table)
        });
        let guard = registry.read();
        let scalars = ScalarRegistry::new();
        let args = vec![ExternArg::Literal(Literal::Str("trades.csv".into()))];
        match extern_call("read_csv", &args, &scalars, None, &guard).unwrap() {
            ExternCallResult::Table(table) => assert_eq!(table.rows(), 1),
            _ => panic!("expected a table result"),
        }
    }

    #[test]
    fn column_ref_arg_resolves_against_scalar_registry() {
        let registry = ExternRegistry::new();
        registry.register_scalar("add_one", |args| match args {
            [ScalarValue::Int(v)] => Ok(ScalarValue::Int(v + 1)),
            _ => Err("expected one int arg".to_string()),
        });
        let guard = registry.read();
        let mut scalars = ScalarRegistry::new();
        scalars.insert("bound".into(), ScalarValue::Int(41));
        let args = vec![ExternArg::ColumnRef("bound".into())];
        match extern_call("add_one", &args, &scalars, None, &guard).unwrap() {
            ExternCallResult::Scalar(ScalarValue::Int(v)) => assert_eq!(v, 42),
            _ => panic!("expected a scalar result"),
        }
    }

    #[test]
    fn scalar_from_table_without_source_errors() {
        let registry = ExternRegistry::new();
        registry.register_scalar_from_table("write_parquet", |table, _| Ok(ScalarValue::Int(table.rows() as i64)));
        let guard = registry.read();
        let scalars = ScalarRegistry::new();
        let err = extern_call("write_parquet", &[], &scalars, None, &guard).unwrap_err();
        assert!(matches!(err, RuntimeError::Extern(ExternError::WrongReturnKind { .. })));
    }

    #[test]
    fn unknown_callee_errors() {
        let registry = ExternRegistry::new();
        let guard = registry.read();
        let scalars = ScalarRegistry::new();
        let err = extern_call("missing", &[], &scalars, None, &guard).unwrap_err();
        assert!(matches!(err, RuntimeError::Extern(ExternError::UnknownCallee(_))));
    }
}
