// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

/// A literal value inside an IR expression tree.
///
/// Only the three scalar kinds the lowerer ever produces for value and
/// filter expressions; dates/timestamps only ever appear as column
/// values, never as IR literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A value expression, used inside `Update` fields and `ExternCall`
/// column-ref arguments.
///
/// Unlike the filter tree (see [`FilterValue`]/[`FilterBool`]), a value
/// expression has no boolean layer. Comparisons and logical operators
/// are rejected by the lowerer before a `ValueExpr` is ever built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueExpr {
    Column(String),
    Literal(Literal),
    Binary {
        op: ArithOp,
        left: Box<ValueExpr>,
        right: Box<ValueExpr>,
    },
    Call {
        name: String,
        args: Vec<ValueExpr>,
    },
}

/// The value-producing half of the filter expression tree.
///
/// Values and booleans are distinct kinds in the filter tree; this
/// crate enforces that distinction at the type level rather than by
/// convention, so a filter tree can never nest a boolean where a value
/// is expected or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Column(String),
    Literal(Literal),
    Arith {
        op: ArithOp,
        left: Box<FilterValue>,
        right: Box<FilterValue>,
    },
}

/// The boolean-producing half of the filter expression tree. Booleans
/// compose only through `And`/`Or`/`Not`; the only way to get a
/// boolean from values is a `Compare`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterBool {
    Compare {
        op: CompareOp,
        left: FilterValue,
        right: FilterValue,
    },
    And(Box<FilterBool>, Box<FilterBool>),
    Or(Box<FilterBool>, Box<FilterBool>),
    Not(Box<FilterBool>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bool_composes_from_compare() {
        let expr = FilterBool::And(
            Box::new(FilterBool::Compare {
                op: CompareOp::Gt,
                left: FilterValue::Column("price".into()),
                right: FilterValue::Literal(Literal::Int(15)),
            }),
            Box::new(FilterBool::Not(Box::new(FilterBool::Compare {
                op: CompareOp::Eq,
                left: FilterValue::Column("symbol".into()),
                right: FilterValue::Literal(Literal::Str("X".into())),
            }))),
        );
        assert!(matches!(expr, FilterBool::And(_, _)));
    }
}
