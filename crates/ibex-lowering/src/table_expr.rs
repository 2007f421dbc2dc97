// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{Expr, JoinKind as AstJoinKind};
use ibex_ir::{Builder, JoinKind, Node};

use crate::clause::apply_clauses;
use crate::error::LowerError;
use crate::value::lower_extern_arg;

fn join_kind(kind: AstJoinKind) -> JoinKind {
    match kind {
        AstJoinKind::Inner => JoinKind::Inner,
        AstJoinKind::Left => JoinKind::Left,
        AstJoinKind::Asof => JoinKind::Asof,
    }
}

/// Lowers an expression that is expected to produce a table: a bare
/// name (an input table, or a name bound by an earlier `let`), a
/// block (`base[clause, ...]`), a join, a parenthesized sub-expression,
/// or a call to an extern function.
///
/// Every `let`-bound name is resolved the same way as any other base
/// table name: a fresh `Scan`, rather than by cloning the bound
/// sub-tree. The program driver materializes each bound statement's
/// result under its name before later statements run, so `Scan`
/// observes exactly what a cloned sub-tree would have recomputed.
pub fn lower_table_expr(builder: &Builder, expr: &Expr) -> Result<Node, LowerError> {
    match expr {
        Expr::Ident(name) => Ok(builder.scan(name)),
        Expr::Group(inner) => lower_table_expr(builder, inner),
        Expr::Block { base, clauses } => {
            let input = lower_table_expr(builder, base)?;
            apply_clauses(builder, input, clauses)
        }
        Expr::Join { kind, left, right, keys } => {
            let left = lower_table_expr(builder, left)?;
            let right = lower_table_expr(builder, right)?;
            Ok(builder.join(left, right, join_kind(*kind), keys.clone()))
        }
        Expr::Call { callee, args } => {
            let args = args.iter().map(lower_extern_arg).collect::<Result<Vec<_>, _>>()?;
            Ok(builder.extern_call(callee.clone(), args))
        }
        Expr::Literal(_) => Err(LowerError::InvalidTableExpr("a literal is not a table")),
        Expr::Binary { .. } => Err(LowerError::InvalidTableExpr("a binary expression is not a table")),
        Expr::Unary { .. } => Err(LowerError::InvalidTableExpr("a unary expression is not a table")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_ast::{Clause, Literal as AstLiteral};
    use ibex_ir::NodeKind;

    #[test]
    fn bare_ident_lowers_to_scan() {
        let builder = Builder::new();
        let node = lower_table_expr(&builder, &Expr::Ident("trades".into())).unwrap();
        assert!(matches!(node.kind(), NodeKind::Scan { source } if source == "trades"));
    }

    #[test]
    fn block_applies_clauses_over_scan() {
        let builder = Builder::new();
        let expr = Expr::Block {
            base: Box::new(Expr::Ident("trades".into())),
            clauses: vec![Clause::Distinct],
        };
        let node = lower_table_expr(&builder, &expr).unwrap();
        assert!(matches!(node.kind(), NodeKind::Distinct { .. }));
    }

    #[test]
    fn join_lowers_both_sides() {
        let builder = Builder::new();
        let expr = Expr::Join {
            kind: AstJoinKind::Left,
            left: Box::new(Expr::Ident("trades".into())),
            right: Box::new(Expr::Ident("quotes".into())),
            keys: vec!["id".into()],
        };
        let node = lower_table_expr(&builder, &expr).unwrap();
        let NodeKind::Join { left, right, kind, keys } = node.kind() else {
            panic!("expected Join");
        };
        assert!(matches!(left.kind(), NodeKind::Scan { source } if source == "trades"));
        assert!(matches!(right.kind(), NodeKind::Scan { source } if source == "quotes"));
        assert_eq!(*kind, JoinKind::Left);
        assert_eq!(keys, &["id".to_string()]);
    }

    #[test]
    fn extern_call_lowers_to_extern_call_node() {
        let builder = Builder::new();
        let expr = Expr::Call {
            callee: "read_csv".into(),
            args: vec![Expr::Literal(AstLiteral::String("trades.csv".into()))],
        };
        let node = lower_table_expr(&builder, &expr).unwrap();
        assert!(matches!(node.kind(), NodeKind::ExternCall { callee, .. } if callee == "read_csv"));
    }

    #[test]
    fn literal_is_not_a_valid_table_expr() {
        let builder = Builder::new();
        let err = lower_table_expr(&builder, &Expr::Literal(AstLiteral::Integer(5))).unwrap_err();
        assert!(matches!(err, LowerError::InvalidTableExpr(_)));
    }
}
