// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - columnar query core
//!
//! Facade over the lowering, interpretation, and emission crates: a
//! caller hands this a parsed [`ibex_ast::Program`] (parsing itself is
//! out of scope, see `ibex-lowering`'s crate docs) and gets back
//! either an executed [`ibex_column::Table`] or a Rust translation
//! unit that reproduces it when compiled against `ibex-runtime`.

mod error;

pub use error::IbexError;

pub use ibex_ast as ast;
pub use ibex_column as column;
pub use ibex_emit as emit;
pub use ibex_extern as extern_fn;
pub use ibex_interp as interp;
pub use ibex_ir as ir;
pub use ibex_lowering as lowering;
pub use ibex_runtime as runtime;

use ibex_ast::Program as AstProgram;
use ibex_column::Table;
use ibex_emit::EmitOptions;
use ibex_extern::ExternRead;
use ibex_interp::TableRegistry;
use ibex_ir::Node;

/// Lowers `ast` and interprets every statement in order, threading
/// `let` bindings through `tables` and a per-run scalar registry.
/// Returns the last statement's result, or `None` for an empty
/// program.
pub fn run_program(
    ast: &AstProgram,
    tables: &mut TableRegistry,
    externs: &ExternRead<'_>,
) -> Result<Option<Table>, IbexError> {
    let lowered = ibex_lowering::lower_program(ast)?;
    Ok(ibex_interp::interpret_program(&lowered.program, tables, externs)?)
}

/// Emits a Rust translation unit for one lowered node, given the
/// extern declarations lowering recorded for the whole program it
/// came from.
pub fn compile(
    node: &Node,
    externs: &[ibex_ast::ExternDecl],
    options: &EmitOptions,
) -> Result<String, IbexError> {
    Ok(ibex_emit::emit(node, externs, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_ast::{Clause, Expr, Program, Stmt};
    use ibex_column::Column;
    use ibex_extern::ExternRegistry;

    #[test]
    fn run_program_executes_a_single_statement() {
        let ast = Program {
            statements: vec![Stmt::Expr(Expr::Block {
                base: Box::new(Expr::Ident("trades".into())),
                clauses: vec![Clause::Distinct],
            })],
        };
        let mut tables = TableRegistry::new();
        let mut trades = Table::new();
        trades.add_column("price", Column::from_ints(vec![1, 1, 2]));
        tables.insert("trades", trades);

        let registry = ExternRegistry::new();
        let externs = registry.read();
        let result = run_program(&ast, &mut tables, &externs).unwrap().unwrap();
        assert_eq!(result.rows(), 2);
    }

    #[test]
    fn empty_program_returns_none() {
        let ast = Program { statements: vec![] };
        let mut tables = TableRegistry::new();
        let registry = ExternRegistry::new();
        let externs = registry.read();
        assert!(run_program(&ast, &mut tables, &externs).unwrap().is_none());
    }
}
