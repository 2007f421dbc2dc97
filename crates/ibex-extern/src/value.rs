// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::Value as ColumnValue;

/// A scalar value crossing the extern-function boundary.
///
/// Dates and timestamps pass through this interface as their raw
/// nanoseconds/days integer; there is no dedicated date/timestamp
/// variant here, unlike [`ibex_column::Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<ScalarValue> for ColumnValue {
    fn from(value: ScalarValue) -> Self {
        match value {
            ScalarValue::Int(v) => ColumnValue::Int(v),
            ScalarValue::Float(v) => ColumnValue::Float(v),
            ScalarValue::Str(v) => ColumnValue::Str(v),
        }
    }
}

impl TryFrom<ColumnValue> for ScalarValue {
    type Error = ColumnValue;

    fn try_from(value: ColumnValue) -> Result<Self, Self::Error> {
        match value {
            ColumnValue::Int(v) => Ok(ScalarValue::Int(v)),
            ColumnValue::Float(v) => Ok(ScalarValue::Float(v)),
            ColumnValue::Str(v) => Ok(ScalarValue::Str(v)),
            other => Err(other),
        }
    }
}
