// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - Intermediate Representation
//!
//! The immutable plan tree consumed by `ibex-interp` and `ibex-emit`,
//! and produced by `ibex-lowering`: the node catalog, expression tree
//! shapes, and the program-level statement list they compose into.

mod agg;
mod expr;
mod join;
mod node;
mod program;

pub use agg::{AggFunc, AggSpec};
pub use expr::{ArithOp, CompareOp, FilterBool, FilterValue, Literal, ValueExpr};
pub use join::JoinKind;
pub use node::{Builder, ExternArg, Node, NodeId, NodeKind, OrderKey};
pub use program::{Program, ProgramStatement};
