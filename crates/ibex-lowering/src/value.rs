// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{BinOp, Expr, Literal as AstLiteral, UnOp};
use ibex_ir::{ArithOp, ExternArg, Literal, ValueExpr};

use crate::error::LowerError;

fn arith_op(op: BinOp) -> Option<ArithOp> {
    Some(match op {
        BinOp::Add => ArithOp::Add,
        BinOp::Sub => ArithOp::Sub,
        BinOp::Mul => ArithOp::Mul,
        BinOp::Div => ArithOp::Div,
        BinOp::Mod => ArithOp::Mod,
        _ => return None,
    })
}

fn literal(lit: &AstLiteral) -> Result<Literal, LowerError> {
    Ok(match lit {
        AstLiteral::Integer(v) => Literal::Int(*v),
        AstLiteral::Float(v) => Literal::Float(*v),
        AstLiteral::String(v) => Literal::Str(v.clone()),
        AstLiteral::Boolean(_) => return Err(LowerError::UpdateFieldNotValueExpr),
    })
}

/// Lowers an `update` field expression, or an `ExternCall` argument
/// expression, into a value-expression tree. Comparisons and logical
/// operators have no value-expression shape, so they are rejected
/// rather than lowered.
pub fn lower_value_expr(expr: &Expr) -> Result<ValueExpr, LowerError> {
    match expr {
        Expr::Ident(name) => Ok(ValueExpr::Column(name.clone())),
        Expr::Literal(lit) => Ok(ValueExpr::Literal(literal(lit)?)),
        Expr::Binary { op, left, right } if arith_op(*op).is_some() => Ok(ValueExpr::Binary {
            op: arith_op(*op).unwrap(),
            left: Box::new(lower_value_expr(left)?),
            right: Box::new(lower_value_expr(right)?),
        }),
        Expr::Unary { op: UnOp::Neg, expr } => Ok(ValueExpr::Binary {
            op: ArithOp::Sub,
            left: Box::new(ValueExpr::Literal(Literal::Int(0))),
            right: Box::new(lower_value_expr(expr)?),
        }),
        Expr::Group(inner) => lower_value_expr(inner),
        Expr::Call { callee, args } => {
            let args = args.iter().map(lower_value_expr).collect::<Result<Vec<_>, _>>()?;
            Ok(ValueExpr::Call {
                name: callee.clone(),
                args,
            })
        }
        _ => Err(LowerError::UpdateFieldNotValueExpr),
    }
}

/// Lowers an `ExternCall` argument: only literals and bare names (a
/// reference to a name bound earlier in the program) have a shape in
/// the IR's narrower `ExternArg`, so anything else is rejected here
/// rather than at interpret time.
pub fn lower_extern_arg(expr: &Expr) -> Result<ExternArg, LowerError> {
    match expr {
        Expr::Ident(name) => Ok(ExternArg::ColumnRef(name.clone())),
        Expr::Literal(lit) => Ok(ExternArg::Literal(literal(lit)?)),
        Expr::Group(inner) => lower_extern_arg(inner),
        _ => Err(LowerError::ExternArgNotLiteralOrName),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_arith_lowers() {
        let expr = Expr::Binary {
            op: BinOp::Mul,
            left: Box::new(Expr::Ident("price".into())),
            right: Box::new(Expr::Ident("qty".into())),
        };
        let lowered = lower_value_expr(&expr).unwrap();
        assert!(matches!(lowered, ValueExpr::Binary { op: ArithOp::Mul, .. }));
    }

    #[test]
    fn comparison_is_rejected_as_a_value() {
        let expr = Expr::Binary {
            op: BinOp::Gt,
            left: Box::new(Expr::Ident("price".into())),
            right: Box::new(Expr::Literal(AstLiteral::Integer(1))),
        };
        assert_eq!(lower_value_expr(&expr).unwrap_err(), LowerError::UpdateFieldNotValueExpr);
    }

    #[test]
    fn call_lowers_to_value_expr_call() {
        let expr = Expr::Call {
            callee: "round".into(),
            args: vec![Expr::Ident("price".into())],
        };
        assert!(matches!(lower_value_expr(&expr).unwrap(), ValueExpr::Call { .. }));
    }

    #[test]
    fn extern_arg_rejects_computed_expr() {
        let expr = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(Expr::Literal(AstLiteral::Integer(1))),
            right: Box::new(Expr::Literal(AstLiteral::Integer(2))),
        };
        assert_eq!(lower_extern_arg(&expr).unwrap_err(), LowerError::ExternArgNotLiteralOrName);
    }
}
