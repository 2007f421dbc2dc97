// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{ExternDecl, Program as AstProgram, Stmt};
use ibex_ir::{Builder, Program as IrProgram};
use tracing::trace;

use crate::error::LowerError;
use crate::table_expr::lower_table_expr;

/// The result of lowering a whole program: the IR statement list the
/// interpreter runs, plus the extern declarations the emitter needs to
/// translate into target-language `#include`s/bindings. Function
/// declarations are recorded by the parser for other tooling and carry
/// no weight here.
pub struct LoweredProgram {
    pub program: IrProgram,
    pub externs: Vec<ExternDecl>,
}

/// Lowers every statement in source order. `let` and bare expression
/// statements both lower their right-hand side the same way, as a
/// table-shaped expression, and are recorded as a program statement;
/// only the binding differs. A scalar `let` (e.g. `let n = 5`) has no
/// shape in the IR node catalog and is rejected at this point, since
/// the only supported source of a scalar binding is an extern call
/// that returns one.
pub fn lower_program(ast: &AstProgram) -> Result<LoweredProgram, LowerError> {
    let builder = Builder::new();
    let mut program = IrProgram::new();
    let mut externs = Vec::new();

    for stmt in &ast.statements {
        match stmt {
            Stmt::ExternDecl(decl) => {
                trace!(name = %decl.name, source = %decl.source, "recording extern declaration");
                externs.push(decl.clone());
            }
            Stmt::FunctionDecl(_) => {}
            Stmt::Let(let_stmt) => {
                trace!(name = %let_stmt.name, "lowering let binding");
                let node = lower_table_expr(&builder, &let_stmt.value)?;
                program.push(Some(let_stmt.name.clone()), node);
            }
            Stmt::Expr(expr) => {
                let node = lower_table_expr(&builder, expr)?;
                program.push(None, node);
            }
        }
    }

    Ok(LoweredProgram { program, externs })
}
