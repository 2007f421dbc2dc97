// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use thiserror::Error;

/// The union of every error a caller can see from the top-level
/// pipeline entry points: lowering an AST, interpreting a lowered
/// program, or emitting a compilable translation unit for one of its
/// nodes.
#[derive(Debug, Error)]
pub enum IbexError {
    #[error(transparent)]
    Lower(#[from] ibex_lowering::LowerError),
    #[error(transparent)]
    Interp(#[from] ibex_interp::InterpError),
    #[error(transparent)]
    Emit(#[from] ibex_emit::EmitError),
}
