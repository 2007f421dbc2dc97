// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LowerError {
    #[error("clause '{0}' appears more than once in a block")]
    DuplicateClause(&'static str),

    #[error("select and update are mutually exclusive in the same block")]
    SelectAndUpdateBothPresent,

    #[error("'by' must accompany 'select' or 'update'")]
    ByWithoutSelectOrUpdate,

    #[error("computed 'by' keys are only legal alongside 'update'")]
    ComputedByKeyWithoutUpdate,

    #[error("group-by projection '{0}' must appear in the 'by' list")]
    GroupProjectionNotInByList(String),

    #[error("aggregate select field '{0}' must be either a bare column or a call to an aggregate function")]
    AggregateFieldMustBeCallOrColumn(String),

    #[error("unknown aggregate function: {0}")]
    UnknownAggregateFunction(String),

    #[error("'count' takes no arguments")]
    CountTakesNoArgs,

    #[error("aggregate function '{0}' takes exactly one column-reference argument")]
    AggregateArgMustBeSingleColumn(&'static str),

    #[error("select field '{0}' must be a bare column reference outside an aggregation")]
    ProjectFieldMustBeColumn(String),

    #[error("filter expression is not a boolean expression")]
    FilterExprNotBoolean,

    #[error("filter operand is not a value expression")]
    FilterOperandNotValue,

    #[error("update field must be a value expression")]
    UpdateFieldNotValueExpr,

    #[error("extern call argument must be a literal or a bound name, found a computed expression")]
    ExternArgNotLiteralOrName,

    #[error("invalid duration literal: {0}")]
    InvalidDuration(String),

    #[error("expression cannot be lowered to a table: {0}")]
    InvalidTableExpr(&'static str),
}
