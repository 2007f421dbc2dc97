// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::{ColumnError, ElementType};
use ibex_extern::ExternError;
use thiserror::Error;

/// Errors raised while evaluating expressions or running an operator.
///
/// Variants map onto type, reference, arity, and join error
/// categories.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("{context} column not found: {name}")]
    ColumnNotFound { context: &'static str, name: String },

    #[error("string arithmetic not supported")]
    StringArithmetic,

    #[error("arithmetic not supported for a {0:?} column")]
    ArithmeticUnsupported(ElementType),

    #[error("string aggregation not supported")]
    StringAggregation,

    #[error("aggregation not supported for a {0:?} column")]
    AggregationUnsupported(ElementType),

    #[error("mismatched column type vs. literal type in filter: {left:?} vs {right:?}")]
    FilterTypeMismatch { left: ElementType, right: ElementType },

    #[error("aggregate function {func} requires a source column")]
    AggregateMissingSource { func: &'static str },

    #[error("count takes no source column")]
    AggregateUnexpectedSource,

    #[error("asof join requires a time index on both input tables")]
    AsofMissingTimeIndex,

    #[error("asof on-list must start with the time index")]
    AsofTimeIndexNotFirstKey,

    #[error("join key not found: {0}")]
    JoinKeyNotFound(String),

    #[error("cannot pass a {0:?} value as an extern argument")]
    UnsupportedExternArgType(ElementType),

    #[error(transparent)]
    Extern(#[from] ExternError),

    #[error(transparent)]
    Column(#[from] ColumnError),
}
