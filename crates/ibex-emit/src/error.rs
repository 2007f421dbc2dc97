// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmitError {
    #[error("scan nodes have no table source available to a standalone translation unit: {0}")]
    ScanNotEmittable(String),
    #[error("extern call argument must be a literal to emit directly: {0}")]
    ExternArgNotEmittable(String),
    #[error("no extern declaration recorded for callee: {0}")]
    UnknownExternCallee(String),
}
