// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExternError {
    #[error("unknown extern function: {0}")]
    UnknownCallee(String),
    #[error("extern function {callee} is a {actual} function, expected {expected}")]
    WrongReturnKind {
        callee: String,
        expected: &'static str,
        actual: &'static str,
    },
    /// A callee's own error, already prefixed with its name.
    #[error("{0}")]
    Callee(String),
}
