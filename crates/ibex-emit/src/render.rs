// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Renders IR expression sub-trees as Rust source text that, once
//! compiled, reconstructs the exact same values. The emitted program
//! calls the same generic `ibex_runtime::ops` functions the
//! interpreter does, rather than compiling each expression down to
//! native per-row arithmetic.

use ibex_ir::{AggFunc, AggSpec, ArithOp, CompareOp, FilterBool, FilterValue, JoinKind, Literal, OrderKey, ValueExpr};

/// Escapes backslashes, double quotes, and the three whitespace
/// control characters the emitted form must round-trip exactly.
pub fn escape_str(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

fn quoted(s: &str) -> String {
    format!("\"{}\".to_string()", escape_str(s))
}

pub fn literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(v) => format!("ibex_ir::Literal::Int({v}i64)"),
        Literal::Float(v) => format!("ibex_ir::Literal::Float({v:?}f64)"),
        Literal::Str(v) => format!("ibex_ir::Literal::Str({})", quoted(v)),
    }
}

pub fn compare_op(op: CompareOp) -> String {
    format!("ibex_ir::CompareOp::{op:?}")
}

pub fn arith_op(op: ArithOp) -> String {
    format!("ibex_ir::ArithOp::{op:?}")
}

pub fn agg_func(func: AggFunc) -> String {
    format!("ibex_ir::AggFunc::{func:?}")
}

pub fn join_kind(kind: JoinKind) -> String {
    format!("ibex_ir::JoinKind::{kind:?}")
}

fn option_string(opt: &Option<String>) -> String {
    match opt {
        Some(s) => format!("Some({})", quoted(s)),
        None => "None".to_string(),
    }
}

pub fn filter_value(value: &FilterValue) -> String {
    match value {
        FilterValue::Column(name) => format!("ibex_ir::FilterValue::Column({})", quoted(name)),
        FilterValue::Literal(lit) => format!("ibex_ir::FilterValue::Literal({})", literal(lit)),
        FilterValue::Arith { op, left, right } => format!(
            "ibex_ir::FilterValue::Arith {{ op: {}, left: Box::new({}), right: Box::new({}) }}",
            arith_op(*op),
            filter_value(left),
            filter_value(right),
        ),
    }
}

pub fn filter_bool(expr: &FilterBool) -> String {
    match expr {
        FilterBool::Compare { op, left, right } => format!(
            "ibex_ir::FilterBool::Compare {{ op: {}, left: {}, right: {} }}",
            compare_op(*op),
            filter_value(left),
            filter_value(right),
        ),
        FilterBool::And(left, right) => {
            format!("ibex_ir::FilterBool::And(Box::new({}), Box::new({}))", filter_bool(left), filter_bool(right))
        }
        FilterBool::Or(left, right) => {
            format!("ibex_ir::FilterBool::Or(Box::new({}), Box::new({}))", filter_bool(left), filter_bool(right))
        }
        FilterBool::Not(inner) => format!("ibex_ir::FilterBool::Not(Box::new({}))", filter_bool(inner)),
    }
}

pub fn value_expr(expr: &ValueExpr) -> String {
    match expr {
        ValueExpr::Column(name) => format!("ibex_ir::ValueExpr::Column({})", quoted(name)),
        ValueExpr::Literal(lit) => format!("ibex_ir::ValueExpr::Literal({})", literal(lit)),
        ValueExpr::Binary { op, left, right } => format!(
            "ibex_ir::ValueExpr::Binary {{ op: {}, left: Box::new({}), right: Box::new({}) }}",
            arith_op(*op),
            value_expr(left),
            value_expr(right),
        ),
        ValueExpr::Call { name, args } => {
            let args = args.iter().map(value_expr).collect::<Vec<_>>().join(", ");
            format!("ibex_ir::ValueExpr::Call {{ name: {}, args: vec![{}] }}", quoted(name), args)
        }
    }
}

pub fn order_key(key: &OrderKey) -> String {
    format!("ibex_ir::OrderKey {{ name: {}, ascending: {} }}", quoted(&key.name), key.ascending)
}

pub fn agg_spec(spec: &AggSpec) -> String {
    format!(
        "ibex_ir::AggSpec {{ func: {}, source: {}, alias: {} }}",
        agg_func(spec.func),
        option_string(&spec.source),
        quoted(&spec.alias),
    )
}

pub fn string_vec(names: &[String]) -> String {
    let items = names.iter().map(|n| quoted(n)).collect::<Vec<_>>().join(", ");
    format!("vec![{items}]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_every_required_character() {
        let escaped = escape_str("a\\b\"c\nd\te\rf");
        assert_eq!(escaped, "a\\\\b\\\"c\\nd\\te\\rf");
    }

    #[test]
    fn int_literal_round_trips_as_i64_suffixed_expr() {
        assert_eq!(literal(&Literal::Int(42)), "ibex_ir::Literal::Int(42i64)");
    }

    #[test]
    fn float_literal_keeps_a_decimal_point() {
        assert_eq!(literal(&Literal::Float(2.0)), "ibex_ir::Literal::Float(2.0f64)");
    }

    #[test]
    fn filter_bool_nests_compare_inside_and() {
        let expr = FilterBool::And(
            Box::new(FilterBool::Compare {
                op: CompareOp::Gt,
                left: FilterValue::Column("price".into()),
                right: FilterValue::Literal(Literal::Int(10)),
            }),
            Box::new(FilterBool::Not(Box::new(FilterBool::Compare {
                op: CompareOp::Lt,
                left: FilterValue::Column("qty".into()),
                right: FilterValue::Literal(Literal::Int(5)),
            }))),
        );
        let rendered = filter_bool(&expr);
        assert!(rendered.contains("ibex_ir::FilterBool::And("));
        assert!(rendered.contains("ibex_ir::CompareOp::Gt"));
        assert!(rendered.contains("ibex_ir::CompareOp::Lt"));
        assert!(rendered.contains("ibex_ir::FilterBool::Not("));
    }

    #[test]
    fn value_expr_call_renders_args_as_a_vec() {
        let expr = ValueExpr::Call { name: "round".into(), args: vec![ValueExpr::Column("price".into())] };
        let rendered = value_expr(&expr);
        assert!(rendered.contains("ibex_ir::ValueExpr::Call { name: \"round\".to_string(), args: vec!["));
        assert!(rendered.contains("ibex_ir::ValueExpr::Column(\"price\".to_string())"));
    }
}
