// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

/// An expression, before lowering.
///
/// `Block` is what makes Ibex's surface a dataframe DSL rather than a
/// plain expression language: a base expression followed by an ordered
/// list of clauses, e.g. `trades[filter price > 15, select { price }]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    Literal(Literal),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },
    /// A parenthesized sub-expression, kept distinct from its inner
    /// expression so the lowerer can tell `(a)` from `a` when deciding
    /// whether a clause key was computed.
    Group(Box<Expr>),
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Block {
        base: Box<Expr>,
        clauses: Vec<Clause>,
    },
    /// `left join right on {key, ...}` and its `left`/`asof` variants.
    /// A join combines two table-shaped sub-expressions, which doesn't
    /// fit the single-base clause chain `Block` models, so it gets its
    /// own expression form.
    Join {
        kind: JoinKind,
        left: Box<Expr>,
        right: Box<Expr>,
        keys: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Asof,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Not,
}

/// One of the seven clauses a block may carry. The lowerer, not the
/// parser, enforces composition rules (at most one of each, mutual
/// exclusions, ordering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Clause {
    Filter(Expr),
    Select(Vec<SelectField>),
    Update(Vec<SelectField>),
    Distinct,
    Order(Vec<OrderKey>),
    /// `by symbol` or `by { alias = expr, ... }`. Computed keys are only
    /// legal alongside `update`, the lowerer rejects them elsewhere.
    By(Vec<ByKey>),
    /// `window 5m`, the raw duration literal, parsed later.
    Window(String),
}

/// A field in a `select` or `update` clause.
///
/// `expr: None` means a bare identifier (`select { price }`): a
/// straight projection in `select`, or (in `by { ... }`-adjacent
/// `select`) a grouping column. `expr: Some(_)` means `alias = expr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectField {
    pub name: String,
    pub expr: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub name: String,
    pub ascending: bool,
}

/// A key in a `by` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ByKey {
    Column(String),
    Computed { alias: String, expr: Expr },
}
