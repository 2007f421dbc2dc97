// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// An ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Declares an extern function backed by host code at `source`.
    ExternDecl(ExternDecl),
    /// A user-defined function declaration. The query core does not lower
    /// these to IR; they are recorded by the parser for other tooling.
    FunctionDecl(FunctionDecl),
    Let(LetStmt),
    Expr(Expr),
}

/// A type name as written in source (`int`, `DataFrame`, ...). The lowerer
/// only inspects these for extern declarations; it does not type-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeName(pub String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeName,
}

/// `extern fn name(params) -> return_type from "source"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeName,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
}

/// `let [mut] name[: type] = value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetStmt {
    pub mutable: bool,
    pub name: String,
    pub declared_type: Option<TypeName>,
    pub value: Expr,
}
