// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - Runtime operators
//!
//! Per-operator primitives and the expression evaluation / type
//! promotion rules they share. Each operator
//! takes a borrowed input table and returns a freshly allocated output
//! table; errors are returned, never panicked across an operator
//! boundary.

mod error;
mod eval;
mod ops;

pub use error::RuntimeError;
pub use eval::{eval_filter_bool, eval_filter_value, eval_value_expr, infer_value_expr_type, ScalarRegistry};
pub use ops::{aggregate, distinct, extern_call, filter, join, order, project, update, update_grouped, ExternCallResult};
