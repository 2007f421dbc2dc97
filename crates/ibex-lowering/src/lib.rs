// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - AST to IR lowering
//!
//! Consumes the parser's AST and emits the IR tree(s) the interpreter
//! and emitter run: clause composition (filter, aggregate-or-project,
//! update, distinct, order, window, in that fixed order regardless of
//! source order), filter/update expression translation, aggregate
//! function validation, and window duration parsing.

mod clause;
mod duration;
mod error;
mod filter;
mod program;
mod table_expr;
mod value;

pub use duration::parse_duration;
pub use error::LowerError;
pub use program::{lower_program, LoweredProgram};
pub use table_expr::lower_table_expr;
