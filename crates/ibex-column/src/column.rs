// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::sync::Arc;

use crate::error::ColumnError;
use crate::value::{ElementType, Value};

/// The owning, contiguous backing storage for a [`Column`].
///
/// Wrapped in `Arc` so that [`Column::slice`] is zero-copy: a slice
/// shares the same backing buffer as its parent and only clones
/// (copy-on-write, via `Arc::make_mut`) the moment it is mutated
/// through `push`/`reserve`.
#[derive(Debug, Clone, PartialEq)]
enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    Date(Vec<i32>),
    Timestamp(Vec<i64>),
    /// Dictionary-encoded strings: `codes` indexes into `dict`.
    Categorical { codes: Vec<u32>, dict: Vec<String> },
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Str(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Timestamp(v) => v.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    fn element_type(&self) -> ElementType {
        match self {
            ColumnData::Int(_) => ElementType::Int,
            ColumnData::Float(_) => ElementType::Float,
            ColumnData::Str(_) => ElementType::Str,
            ColumnData::Date(_) => ElementType::Date,
            ColumnData::Timestamp(_) => ElementType::Timestamp,
            ColumnData::Categorical { .. } => ElementType::Categorical,
        }
    }

    fn get(&self, index: usize) -> Value {
        match self {
            ColumnData::Int(v) => Value::Int(v[index]),
            ColumnData::Float(v) => Value::Float(v[index]),
            ColumnData::Str(v) => Value::Str(v[index].clone()),
            ColumnData::Date(v) => Value::Date(v[index]),
            ColumnData::Timestamp(v) => Value::Timestamp(v[index]),
            ColumnData::Categorical { codes, dict } => {
                Value::Str(dict[codes[index] as usize].clone())
            }
        }
    }
}

/// A homogeneously typed, contiguous, owning vector of values plus an
/// optional validity bitmap.
///
/// Invariant: the element type is fixed at construction and never
/// changes. A `false` validity bit marks a cell
/// "missing"; reading a missing cell via [`Column::get`] returns
/// `None` rather than the undefined stored value.
#[derive(Debug, Clone)]
pub struct Column {
    data: Arc<ColumnData>,
    offset: usize,
    len: usize,
    validity: Option<Arc<Vec<bool>>>,
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len || self.element_type() != other.element_type() {
            return false;
        }
        for i in 0..self.len {
            if self.is_valid(i) != other.is_valid(i) {
                return false;
            }
            if self.is_valid(i) && self.get(i) != other.get(i) {
                return false;
            }
        }
        true
    }
}

macro_rules! ctor {
    ($name:ident, $variant:ident, $elem:ty) => {
        pub fn $name(values: Vec<$elem>) -> Self {
            let len = values.len();
            Self {
                data: Arc::new(ColumnData::$variant(values)),
                offset: 0,
                len,
                validity: None,
            }
        }
    };
}

impl Column {
    ctor!(from_ints, Int, i64);
    ctor!(from_floats, Float, f64);
    ctor!(from_strings, Str, String);
    ctor!(from_dates, Date, i32);
    ctor!(from_timestamps, Timestamp, i64);

    /// Builds a dictionary-encoded categorical column from plain strings,
    /// assigning codes in order of first appearance.
    pub fn from_categorical(values: Vec<String>) -> Self {
        let mut dict: Vec<String> = Vec::new();
        let mut index = std::collections::HashMap::new();
        let mut codes = Vec::with_capacity(values.len());
        for v in values {
            let code = *index.entry(v.clone()).or_insert_with(|| {
                dict.push(v);
                (dict.len() - 1) as u32
            });
            codes.push(code);
        }
        let len = codes.len();
        Self {
            data: Arc::new(ColumnData::Categorical { codes, dict }),
            offset: 0,
            len,
            validity: None,
        }
    }

    pub fn with_validity(mut self, validity: Vec<bool>) -> Self {
        debug_assert_eq!(validity.len(), self.len);
        self.validity = Some(Arc::new(validity));
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        match &self.validity {
            Some(bits) => bits[self.offset + index],
            None => true,
        }
    }

    /// Bounds-checked read. Returns `Ok(None)` for a missing cell.
    pub fn get(&self, index: usize) -> Option<Value> {
        if index >= self.len {
            return None;
        }
        if !self.is_valid(index) {
            return None;
        }
        Some(self.data.get(self.offset + index))
    }

    /// Unchecked read: panics (like slice indexing) if `index` is out of
    /// bounds. Used on hot paths that have already validated the range.
    pub fn get_unchecked(&self, index: usize) -> Value {
        self.data.get(self.offset + index)
    }

    /// A zero-copy view into a sub-range of this column, sharing the
    /// same backing buffer.
    pub fn slice(&self, start: usize, len: usize) -> Result<Column, ColumnError> {
        if start + len > self.len {
            return Err(ColumnError::OutOfBounds {
                index: start + len,
                len: self.len,
            });
        }
        Ok(Column {
            data: Arc::clone(&self.data),
            offset: self.offset + start,
            len,
            validity: self.validity.clone(),
        })
    }

    /// Appends one value, copy-on-writing the backing buffer if it is
    /// shared with another `Column` (e.g. a prior `slice`).
    pub fn push(&mut self, value: Value) -> Result<(), ColumnError> {
        if value.element_type() != self.element_type() {
            return Err(ColumnError::TypeMismatch {
                expected: self.element_type(),
                found: value.element_type(),
            });
        }
        // A non-zero offset means this handle is itself a slice view;
        // pushing onto a view would silently grow the shared tail, so
        // materialize an owned copy of just this view's range first.
        if self.offset != 0 {
            *self = self.to_owned_range();
        }
        let data = Arc::make_mut(&mut self.data);
        match (data, value) {
            (ColumnData::Int(v), Value::Int(x)) => v.push(x),
            (ColumnData::Float(v), Value::Float(x)) => v.push(x),
            (ColumnData::Str(v), Value::Str(x)) => v.push(x),
            (ColumnData::Date(v), Value::Date(x)) => v.push(x),
            (ColumnData::Timestamp(v), Value::Timestamp(x)) => v.push(x),
            (ColumnData::Categorical { codes, dict }, Value::Str(x)) => {
                let code = dict.iter().position(|d| d == &x).unwrap_or_else(|| {
                    dict.push(x);
                    dict.len() - 1
                }) as u32;
                codes.push(code);
            }
            _ => unreachable!("element type checked above"),
        }
        self.len += 1;
        if let Some(validity) = &mut self.validity {
            Arc::make_mut(validity).push(true);
        }
        Ok(())
    }

    pub fn reserve(&mut self, additional: usize) {
        let data = Arc::make_mut(&mut self.data);
        match data {
            ColumnData::Int(v) => v.reserve(additional),
            ColumnData::Float(v) => v.reserve(additional),
            ColumnData::Str(v) => v.reserve(additional),
            ColumnData::Date(v) => v.reserve(additional),
            ColumnData::Timestamp(v) => v.reserve(additional),
            ColumnData::Categorical { codes, .. } => codes.reserve(additional),
        }
    }

    /// An empty column of the same element type, used by operators that
    /// build an output schema before filling in rows.
    pub fn empty_like(&self) -> Column {
        match &*self.data {
            ColumnData::Int(_) => Column::from_ints(Vec::new()),
            ColumnData::Float(_) => Column::from_floats(Vec::new()),
            ColumnData::Str(_) => Column::from_strings(Vec::new()),
            ColumnData::Date(_) => Column::from_dates(Vec::new()),
            ColumnData::Timestamp(_) => Column::from_timestamps(Vec::new()),
            ColumnData::Categorical { .. } => Column::from_categorical(Vec::new()),
        }
    }

    fn to_owned_range(&self) -> Column {
        let data = match &*self.data {
            ColumnData::Int(v) => ColumnData::Int(v[self.offset..self.offset + self.len].to_vec()),
            ColumnData::Float(v) => {
                ColumnData::Float(v[self.offset..self.offset + self.len].to_vec())
            }
            ColumnData::Str(v) => ColumnData::Str(v[self.offset..self.offset + self.len].to_vec()),
            ColumnData::Date(v) => {
                ColumnData::Date(v[self.offset..self.offset + self.len].to_vec())
            }
            ColumnData::Timestamp(v) => {
                ColumnData::Timestamp(v[self.offset..self.offset + self.len].to_vec())
            }
            ColumnData::Categorical { codes, dict } => ColumnData::Categorical {
                codes: codes[self.offset..self.offset + self.len].to_vec(),
                dict: dict.clone(),
            },
        };
        let validity = self.validity.as_ref().map(|bits| {
            Arc::new(bits[self.offset..self.offset + self.len].to_vec())
        });
        Column {
            data: Arc::new(data),
            offset: 0,
            len: self.len,
            validity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_round_trip() {
        let mut col = Column::from_ints(vec![1, 2, 3]);
        col.push(Value::Int(4)).unwrap();
        assert_eq!(col.len(), 4);
        assert_eq!(col.get(3), Some(Value::Int(4)));
    }

    #[test]
    fn push_type_mismatch_errors() {
        let mut col = Column::from_ints(vec![1]);
        let err = col.push(Value::Str("x".into())).unwrap_err();
        assert!(matches!(err, ColumnError::TypeMismatch { .. }));
    }

    #[test]
    fn slice_is_independent_of_source_mutation() {
        let base = Column::from_ints(vec![1, 2, 3, 4, 5]);
        let view = base.slice(1, 3).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(0), Some(Value::Int(2)));
        assert_eq!(view.get(2), Some(Value::Int(4)));

        let mut owned = base.clone();
        owned.push(Value::Int(6)).unwrap();
        assert_eq!(view.len(), 3);
        assert_eq!(view.get(0), Some(Value::Int(2)));
    }

    #[test]
    fn validity_marks_missing_cells() {
        let col = Column::from_ints(vec![1, 2, 3]).with_validity(vec![true, false, true]);
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(0), Some(Value::Int(1)));
    }

    #[test]
    fn categorical_round_trip() {
        let col = Column::from_categorical(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(col.element_type(), ElementType::Categorical);
        assert_eq!(col.get(0), Some(Value::Str("a".into())));
        assert_eq!(col.get(2), Some(Value::Str("a".into())));
    }
}
