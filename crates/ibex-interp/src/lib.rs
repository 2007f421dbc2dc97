// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - Tree-walking interpreter
//!
//! Evaluates an IR plan tree directly against in-memory tables, one
//! node at a time, by delegating each [`NodeKind`] to its matching
//! `ibex-runtime` operator. This is the "just run it" execution path,
//! as opposed to `ibex-emit`'s "generate source and compile it" path.
//! The two share every operator's semantics by construction, since
//! both ultimately call into the same runtime crate (the interpreter
//! directly; the emitted code indirectly, through generated calls).

mod error;
mod registry;

use ibex_column::{Column, Table};
use ibex_extern::{ExternRead, ScalarValue};
use ibex_ir::{Node, NodeKind, Program};
use ibex_runtime::{self as rt, ExternCallResult, ScalarRegistry};
use tracing::trace;

pub use error::InterpError;
pub use registry::TableRegistry;

/// Evaluates a single IR node (and, recursively, its children) against
/// the given tables, returning the table it produces.
pub fn interpret(
    node: &Node,
    tables: &TableRegistry,
    scalars: &ScalarRegistry,
    externs: &ExternRead<'_>,
) -> Result<Table, InterpError> {
    trace!(node = node.kind().name(), id = %node.id(), "interpreting node");
    match node.kind() {
        NodeKind::Scan { source } => tables
            .get(source)
            .cloned()
            .ok_or_else(|| InterpError::UnknownTable(source.clone())),
        NodeKind::Filter { input, predicate } => {
            let input = interpret(input, tables, scalars, externs)?;
            Ok(rt::filter(&input, predicate, scalars)?)
        }
        NodeKind::Project { input, columns } => {
            let input = interpret(input, tables, scalars, externs)?;
            Ok(rt::project(&input, columns)?)
        }
        NodeKind::Distinct { input } => {
            let input = interpret(input, tables, scalars, externs)?;
            Ok(rt::distinct(&input)?)
        }
        NodeKind::Order { input, keys } => {
            let input = interpret(input, tables, scalars, externs)?;
            Ok(rt::order(&input, keys)?)
        }
        NodeKind::Aggregate {
            input,
            group_by,
            aggregations,
        } => {
            let input = interpret(input, tables, scalars, externs)?;
            Ok(rt::aggregate(&input, group_by, aggregations)?)
        }
        NodeKind::Update {
            input,
            fields,
            group_by,
        } => {
            let input = interpret(input, tables, scalars, externs)?;
            match group_by {
                Some(group_by) => Ok(rt::update_grouped(&input, fields, group_by, scalars, externs)?),
                None => Ok(rt::update(&input, fields, scalars, externs)?),
            }
        }
        NodeKind::Window { .. } => Err(InterpError::Unsupported { node: "Window" }),
        NodeKind::AsTimeframe { input, time_column } => {
            let mut input = interpret(input, tables, scalars, externs)?;
            input.set_time_index(time_column.clone())?;
            Ok(input)
        }
        NodeKind::Join { left, right, kind, keys } => {
            let left = interpret(left, tables, scalars, externs)?;
            let right = interpret(right, tables, scalars, externs)?;
            Ok(rt::join(&left, &right, *kind, keys)?)
        }
        NodeKind::ExternCall { callee, args } => {
            match rt::extern_call(callee, args, scalars, None, externs)? {
                ExternCallResult::Table(table) => Ok(table),
                ExternCallResult::Scalar(value) => Ok(wrap_scalar(value)),
            }
        }
    }
}

/// Wraps a bare scalar result (a scalar `ExternCall` run as a
/// standalone statement) in a one-row, one-column table so it fits the
/// uniform "every node produces a table" shape the registries expect.
fn wrap_scalar(value: ScalarValue) -> Table {
    let column = match value {
        ScalarValue::Int(v) => Column::from_ints(vec![v]),
        ScalarValue::Float(v) => Column::from_floats(vec![v]),
        ScalarValue::Str(v) => Column::from_strings(vec![v]),
    };
    let mut table = Table::new();
    table.add_column("value", column);
    table
}

/// Runs every statement of a program in order, threading a growing
/// scalar registry across `let` bindings and registering each bound
/// statement's table so later statements can `Scan` it by name.
///
/// A bound statement whose result is exactly one row and one column
/// also becomes a scalar binding under the same name, so a later
/// `Update`/`Filter` expression can reference it as a broadcast
/// constant rather than a table. Returns the last statement's result,
/// or `None` if the program has no statements.
pub fn interpret_program(
    program: &Program,
    tables: &mut TableRegistry,
    externs: &ExternRead<'_>,
) -> Result<Option<Table>, InterpError> {
    let mut scalars = ScalarRegistry::new();
    let mut result = None;
    for statement in &program.statements {
        let table = interpret(&statement.node, tables, &scalars, externs)?;
        if let Some(binding) = &statement.binding {
            if table.rows() == 1 && table.column_count() == 1 {
                if let Some((_, column)) = table.columns().next() {
                    if let Some(value) = column.get(0) {
                        if let Ok(scalar) = ScalarValue::try_from(value) {
                            scalars.insert(binding.clone(), scalar);
                        }
                    }
                }
            }
            tables.insert(binding.clone(), table.clone());
        }
        result = Some(table);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_extern::ExternRegistry;
    use ibex_ir::{Builder, CompareOp, FilterBool, FilterValue, Literal};

    fn trades() -> Table {
        let mut table = Table::new();
        table.add_column("price", Column::from_ints(vec![10, 20, 30]));
        table
    }

    #[test]
    fn scan_reads_from_the_table_registry() {
        let builder = Builder::new();
        let node = builder.scan("trades");
        let mut tables = TableRegistry::new();
        tables.insert("trades", trades());
        let registry = ExternRegistry::new();
        let externs = registry.read();
        let scalars = ScalarRegistry::new();
        let result = interpret(&node, &tables, &scalars, &externs).unwrap();
        assert_eq!(result.rows(), 3);
    }

    #[test]
    fn scan_of_unknown_table_errors() {
        let builder = Builder::new();
        let node = builder.scan("missing");
        let tables = TableRegistry::new();
        let registry = ExternRegistry::new();
        let externs = registry.read();
        let scalars = ScalarRegistry::new();
        let err = interpret(&node, &tables, &scalars, &externs).unwrap_err();
        assert!(matches!(err, InterpError::UnknownTable(name) if name == "missing"));
    }

    #[test]
    fn filter_then_project_chains_through_scan() {
        let builder = Builder::new();
        let scan = builder.scan("trades");
        let filtered = builder.filter(
            scan,
            FilterBool::Compare {
                op: CompareOp::Gt,
                left: FilterValue::Column("price".into()),
                right: FilterValue::Literal(Literal::Int(15)),
            },
        );
        let projected = builder.project(filtered, vec!["price".into()]);
        let mut tables = TableRegistry::new();
        tables.insert("trades", trades());
        let registry = ExternRegistry::new();
        let externs = registry.read();
        let scalars = ScalarRegistry::new();
        let result = interpret(&projected, &tables, &scalars, &externs).unwrap();
        assert_eq!(result.rows(), 2);
    }

    #[test]
    fn window_is_unsupported() {
        let builder = Builder::new();
        let node = builder.window(builder.scan("trades"), 1_000_000_000);
        let mut tables = TableRegistry::new();
        tables.insert("trades", trades());
        let registry = ExternRegistry::new();
        let externs = registry.read();
        let scalars = ScalarRegistry::new();
        let err = interpret(&node, &tables, &scalars, &externs).unwrap_err();
        assert!(matches!(err, InterpError::Unsupported { node: "Window" }));
    }

    #[test]
    fn program_threads_bound_scalar_into_later_statement() {
        let builder = Builder::new();
        let registry = ExternRegistry::new();
        registry.register_scalar("threshold", |_| Ok(ScalarValue::Int(15)));
        let externs = registry.read();

        let mut program = Program::new();
        program.push(Some("cutoff".into()), builder.extern_call("threshold", vec![]));
        let scan = builder.scan("trades");
        let filtered = builder.filter(
            scan,
            FilterBool::Compare {
                op: CompareOp::Gt,
                left: FilterValue::Column("price".into()),
                right: FilterValue::Column("cutoff".into()),
            },
        );
        program.push(None, filtered);

        let mut tables = TableRegistry::new();
        tables.insert("trades", trades());
        let result = interpret_program(&program, &mut tables, &externs).unwrap().unwrap();
        assert_eq!(result.rows(), 2);
    }

    #[test]
    fn program_with_no_statements_returns_none() {
        let program = Program::new();
        let mut tables = TableRegistry::new();
        let registry = ExternRegistry::new();
        let externs = registry.read();
        assert!(interpret_program(&program, &mut tables, &externs).unwrap().is_none());
    }
}
