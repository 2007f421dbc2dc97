// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::TableError;
use ibex_runtime::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("{node} is not supported by the interpreter")]
    Unsupported { node: &'static str },
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Table(#[from] TableError),
}
