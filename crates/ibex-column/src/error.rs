// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ColumnError {
    #[error("type mismatch: column holds {expected:?}, got {found:?}")]
    TypeMismatch {
        expected: crate::ElementType,
        found: crate::ElementType,
    },
    #[error("index {index} out of bounds for column of length {len}")]
    OutOfBounds { index: usize, len: usize },
}
