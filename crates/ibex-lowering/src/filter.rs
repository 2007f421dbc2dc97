// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{BinOp, Expr, Literal as AstLiteral, UnOp};
use ibex_ir::{ArithOp, CompareOp, FilterBool, FilterValue, Literal};

use crate::error::LowerError;

fn compare_op(op: BinOp) -> Option<CompareOp> {
    Some(match op {
        BinOp::Eq => CompareOp::Eq,
        BinOp::NotEq => CompareOp::Neq,
        BinOp::Lt => CompareOp::Lt,
        BinOp::LtEq => CompareOp::Le,
        BinOp::Gt => CompareOp::Gt,
        BinOp::GtEq => CompareOp::Ge,
        _ => return None,
    })
}

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
        AstLiteral::Boolean(_) => return Err(LowerError::FilterOperandNotValue),
    })
}

/// Lowers a predicate expression into the boolean half of the filter
/// tree: `and`/`or`/`not` compose booleans, `Compare` is the only way
/// to produce one from values.
pub fn lower_filter_bool(expr: &Expr) -> Result<FilterBool, LowerError> {
    match expr {
        Expr::Binary { op: BinOp::And, left, right } => Ok(FilterBool::And(
            Box::new(lower_filter_bool(left)?),
            Box::new(lower_filter_bool(right)?),
        )),
        Expr::Binary { op: BinOp::Or, left, right } => Ok(FilterBool::Or(
            Box::new(lower_filter_bool(left)?),
            Box::new(lower_filter_bool(right)?),
        )),
        Expr::Binary { op, left, right } if compare_op(*op).is_some() => Ok(FilterBool::Compare {
            op: compare_op(*op).unwrap(),
            left: lower_filter_value(left)?,
            right: lower_filter_value(right)?,
        }),
        Expr::Unary { op: UnOp::Not, expr } => Ok(FilterBool::Not(Box::new(lower_filter_bool(expr)?))),
        Expr::Group(inner) => lower_filter_bool(inner),
        _ => Err(LowerError::FilterExprNotBoolean),
    }
}

/// Lowers an operand expression into the value half of the filter
/// tree: columns, literals, and arithmetic over them.
pub fn lower_filter_value(expr: &Expr) -> Result<FilterValue, LowerError> {
    match expr {
        Expr::Ident(name) => Ok(FilterValue::Column(name.clone())),
        Expr::Literal(lit) => Ok(FilterValue::Literal(literal(lit)?)),
        Expr::Binary { op, left, right } if arith_op(*op).is_some() => Ok(FilterValue::Arith {
            op: arith_op(*op).unwrap(),
            left: Box::new(lower_filter_value(left)?),
            right: Box::new(lower_filter_value(right)?),
        }),
        Expr::Unary { op: UnOp::Neg, expr } => Ok(FilterValue::Arith {
            op: ArithOp::Sub,
            left: Box::new(FilterValue::Literal(Literal::Int(0))),
            right: Box::new(lower_filter_value(expr)?),
        }),
        Expr::Group(inner) => lower_filter_value(inner),
        _ => Err(LowerError::FilterOperandNotValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_lowers_to_filter_bool() {
        let expr = Expr::Binary {
            op: BinOp::Gt,
            left: Box::new(Expr::Ident("price".into())),
            right: Box::new(Expr::Literal(AstLiteral::Integer(15))),
        };
        let lowered = lower_filter_bool(&expr).unwrap();
        assert!(matches!(lowered, FilterBool::Compare { op: CompareOp::Gt, .. }));
    }

    #[test]
    fn and_composes_two_compares() {
        let cmp = |n: &str, v: i64| Expr::Binary {
            op: BinOp::Gt,
            left: Box::new(Expr::Ident(n.into())),
            right: Box::new(Expr::Literal(AstLiteral::Integer(v))),
        };
        let expr = Expr::Binary {
            op: BinOp::And,
            left: Box::new(cmp("price", 15)),
            right: Box::new(cmp("qty", 0)),
        };
        assert!(matches!(lower_filter_bool(&expr).unwrap(), FilterBool::And(_, _)));
    }

    #[test]
    fn bare_column_is_not_a_boolean_expr() {
        let err = lower_filter_bool(&Expr::Ident("flag".into())).unwrap_err();
        assert_eq!(err, LowerError::FilterExprNotBoolean);
    }

    #[test]
    fn negation_becomes_zero_minus_value() {
        let lowered = lower_filter_value(&Expr::Unary {
            op: UnOp::Neg,
            expr: Box::new(Expr::Ident("price".into())),
        })
        .unwrap();
        assert!(matches!(lowered, FilterValue::Arith { op: ArithOp::Sub, .. }));
    }
}
