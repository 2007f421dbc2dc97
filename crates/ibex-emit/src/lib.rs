// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Ibex - IR to Rust source emission
//!
//! Walks an IR tree and writes a self-contained Rust translation unit
//! that, compiled against `ibex-runtime`, reproduces the same table
//! `ibex-interp` would produce for that tree: one fresh local per
//! node, a direct call per `ExternCall` data load, and a generic
//! `ibex_runtime::ops` call per query operator with its IR arguments
//! reconstructed as literal Rust expressions.

mod emitter;
mod error;
mod externs;
mod options;
mod render;

pub use emitter::{emit, Emitter};
pub use error::EmitError;
pub use options::{BenchmarkConfig, EmitOptions};
