// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use ibex_column::{Column, ElementType, Table, Value};
use ibex_ir::{AggFunc, AggSpec};

use crate::error::RuntimeError;
use crate::ops::util::{empty_column, zero_value};

/// The golden-ratio mixing constant used to combine per-field hashes
/// into one composite group key.
const HASH_COMBINE: u64 = 0x9e3779b97f4a7c15;

/// A multi-column group-by key, hashed by combining each field's hash
/// with the golden-ratio mix instead of relying on a derived `Vec`
/// hash impl. This is the composite-key path used when more than one
/// group-by column is present.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GroupKey(Vec<Value>);

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut seed: u64 = 0;
        for value in &self.0 {
            let mut field_hasher = std::collections::hash_map::DefaultHasher::new();
            value.hash(&mut field_hasher);
            let h = field_hasher.finish();
            seed ^= h.wrapping_add(HASH_COMBINE).wrapping_add(seed << 6).wrapping_add(seed >> 2);
        }
        state.write_u64(seed);
    }
}

fn agg_func_name(func: AggFunc) -> &'static str {
    match func {
        AggFunc::Sum => "sum",
        AggFunc::Mean => "mean",
        AggFunc::Min => "min",
        AggFunc::Max => "max",
        AggFunc::Count => "count",
        AggFunc::First => "first",
        AggFunc::Last => "last",
    }
}

fn validate_spec(input: &Table, spec: &AggSpec) -> Result<Option<ElementType>, RuntimeError> {
    match (&spec.source, spec.func) {
        (None, AggFunc::Count) => Ok(None),
        (Some(_), AggFunc::Count) => Err(RuntimeError::AggregateUnexpectedSource),
        (None, func) => Err(RuntimeError::AggregateMissingSource { func: agg_func_name(func) }),
        (Some(name), func) => {
            let element_type = input
                .find(name)
                .ok_or_else(|| RuntimeError::ColumnNotFound {
                    context: "aggregate",
                    name: name.clone(),
                })?
                .element_type();
            if matches!(func, AggFunc::Sum | AggFunc::Mean) {
                if element_type == ElementType::Str {
                    return Err(RuntimeError::StringAggregation);
                }
                if !matches!(element_type, ElementType::Int | ElementType::Float) {
                    return Err(RuntimeError::AggregationUnsupported(element_type));
                }
            }
            Ok(Some(element_type))
        }
    }
}

fn output_type(func: AggFunc, source_type: Option<ElementType>) -> ElementType {
    match func {
        AggFunc::Count => ElementType::Int,
        AggFunc::Mean => ElementType::Float,
        _ => source_type.expect("non-count aggregations are validated to carry a source"),
    }
}

fn min_max_ordering(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Float(x), Value::Float(y)) => x.total_cmp(y),
        (Value::Str(x), Value::Str(y)) => x.cmp(y),
        (Value::Date(x), Value::Date(y)) => x.cmp(y),
        (Value::Timestamp(x), Value::Timestamp(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

enum Accum {
    Count,
    SumInt(i64),
    SumFloat(f64),
    MeanInt { sum: i64, count: i64 },
    MeanFloat { sum: f64, count: i64 },
    MinMax { current: Option<Value>, is_min: bool },
    First(Option<Value>),
    Last(Option<Value>),
}

impl Accum {
    fn identity(func: AggFunc, source_type: Option<ElementType>) -> Self {
        match func {
            AggFunc::Count => Accum::Count,
            AggFunc::Sum => match source_type {
                Some(ElementType::Int) => Accum::SumInt(0),
                _ => Accum::SumFloat(0.0),
            },
            AggFunc::Mean => match source_type {
                Some(ElementType::Int) => Accum::MeanInt { sum: 0, count: 0 },
                _ => Accum::MeanFloat { sum: 0.0, count: 0 },
            },
            AggFunc::Min => Accum::MinMax { current: None, is_min: true },
            AggFunc::Max => Accum::MinMax { current: None, is_min: false },
            AggFunc::First => Accum::First(None),
            AggFunc::Last => Accum::Last(None),
        }
    }

    fn update(&mut self, value: Value) {
        match self {
            Accum::Count => {}
            Accum::SumInt(sum) => {
                if let Value::Int(v) = value {
                    *sum += v;
                }
            }
            Accum::SumFloat(sum) => {
                if let Some(v) = value.as_f64() {
                    *sum += v;
                }
            }
            Accum::MeanInt { sum, count } => {
                if let Value::Int(v) = value {
                    *sum += v;
                    *count += 1;
                }
            }
            Accum::MeanFloat { sum, count } => {
                if let Some(v) = value.as_f64() {
                    *sum += v;
                    *count += 1;
                }
            }
            Accum::MinMax { current, is_min } => {
                let keep_new = match current {
                    None => true,
                    Some(existing) => {
                        let cmp = min_max_ordering(existing, &value);
                        if *is_min {
                            cmp == Ordering::Greater
                        } else {
                            cmp == Ordering::Less
                        }
                    }
                };
                if keep_new {
                    *current = Some(value);
                }
            }
            Accum::First(slot) => {
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
            Accum::Last(slot) => *slot = Some(value),
        }
    }

    fn finalize(&self, row_count: i64, source_type: Option<ElementType>) -> Value {
        match self {
            Accum::Count => Value::Int(row_count),
            Accum::SumInt(sum) => Value::Int(*sum),
            Accum::SumFloat(sum) => Value::Float(*sum),
            Accum::MeanInt { sum, count } => {
                Value::Float(if *count == 0 { 0.0 } else { *sum as f64 / *count as f64 })
            }
            Accum::MeanFloat { sum, count } => {
                Value::Float(if *count == 0 { 0.0 } else { *sum / *count as f64 })
            }
            Accum::MinMax { current, .. } | Accum::First(current) | Accum::Last(current) => current
                .clone()
                .unwrap_or_else(|| zero_value(source_type.expect("non-count aggregation carries a source type"))),
        }
    }
}

struct GroupState {
    key: Vec<Value>,
    row_count: i64,
    accum: Vec<Accum>,
}

impl GroupState {
    fn new(key: Vec<Value>, aggregations: &[AggSpec], source_types: &[Option<ElementType>]) -> Self {
        let accum = aggregations
            .iter()
            .zip(source_types)
            .map(|(spec, ty)| Accum::identity(spec.func, *ty))
            .collect();
        Self { key, row_count: 0, accum }
    }
}

/// Partitions rows by group-by key, computing one row of aggregations
/// per distinct key, in first-occurrence order. Uses a
/// type-specialized single-`Value` key when there is exactly one
/// group-by column, and a hash-combined [`GroupKey`] otherwise, with
/// identical semantics either way.
pub fn aggregate(input: &Table, group_by: &[String], aggregations: &[AggSpec]) -> Result<Table, RuntimeError> {
    for name in group_by {
        if !input.contains(name) {
            return Err(RuntimeError::ColumnNotFound {
                context: "group-by",
                name: name.clone(),
            });
        }
    }
    let source_types = aggregations
        .iter()
        .map(|spec| validate_spec(input, spec))
        .collect::<Result<Vec<_>, _>>()?;

    let group_columns: Vec<&Column> = group_by.iter().map(|name| input.find(name).expect("checked above")).collect();
    let agg_columns: Vec<Option<&Column>> = aggregations
        .iter()
        .map(|spec| spec.source.as_deref().map(|name| input.find(name).expect("validated above")))
        .collect();

    let mut groups: Vec<GroupState> = Vec::new();
    let mut single_index: HashMap<Value, usize> = HashMap::new();
    let mut multi_index: HashMap<GroupKey, usize> = HashMap::new();

    for row in 0..input.rows() {
        let key: Vec<Value> = group_columns.iter().map(|column| column.get_unchecked(row)).collect();
        let group_idx = if group_columns.len() == 1 {
            let scalar = key[0].clone();
            *single_index
                .entry(scalar)
                .or_insert_with(|| {
                    groups.push(GroupState::new(key.clone(), aggregations, &source_types));
                    groups.len() - 1
                })
        } else {
            let composite = GroupKey(key.clone());
            *multi_index
                .entry(composite)
                .or_insert_with(|| {
                    groups.push(GroupState::new(key.clone(), aggregations, &source_types));
                    groups.len() - 1
                })
        };
        let group = &mut groups[group_idx];
        group.row_count += 1;
        for (i, column) in agg_columns.iter().enumerate() {
            if let Some(column) = column {
                group.accum[i].update(column.get_unchecked(row));
            }
        }
    }

    // A global aggregate (no group-by columns) over an empty input
    // still yields one row, so that `sum`/`mean`'s documented
    // empty-group identities are observable.
    if groups.is_empty() && group_by.is_empty() {
        groups.push(GroupState::new(Vec::new(), aggregations, &source_types));
    }

    let mut output = Table::new();
    for (i, name) in group_by.iter().enumerate() {
        let mut column = group_columns[i].empty_like();
        for group in &groups {
            column.push(group.key[i].clone())?;
        }
        output.add_column(name.clone(), column);
    }
    for (i, spec) in aggregations.iter().enumerate() {
        let ty = output_type(spec.func, source_types[i]);
        let mut column = empty_column(ty);
        for group in &groups {
            column.push(group.accum[i].finalize(group.row_count, source_types[i]))?;
        }
        output.add_column(spec.alias.clone(), column);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(func: AggFunc, source: Option<&str>, alias: &str) -> AggSpec {
        AggSpec {
            func,
            source: source.map(String::from),
            alias: alias.to_string(),
        }
    }

    #[test]
    fn single_key_sum_and_count() {
        let mut input = Table::new();
        input.add_column("symbol", Column::from_strings(vec!["A".into(), "B".into(), "A".into()]));
        input.add_column("qty", Column::from_ints(vec![1, 2, 3]));
        let output = aggregate(
            &input,
            &["symbol".to_string()],
            &[spec(AggFunc::Sum, Some("qty"), "total"), spec(AggFunc::Count, None, "n")],
        )
        .unwrap();
        assert_eq!(output.rows(), 2);
        assert_eq!(output.find("symbol").unwrap().get(0), Some(Value::Str("A".into())));
        assert_eq!(output.find("total").unwrap().get(0), Some(Value::Int(4)));
        assert_eq!(output.find("n").unwrap().get(0), Some(Value::Int(2)));
    }

    #[test]
    fn multi_key_groups_use_composite_hash() {
        let mut input = Table::new();
        input.add_column("a", Column::from_ints(vec![1, 1, 2]));
        input.add_column("b", Column::from_strings(vec!["x".into(), "x".into(), "y".into()]));
        input.add_column("v", Column::from_ints(vec![10, 20, 30]));
        let output = aggregate(
            &input,
            &["a".to_string(), "b".to_string()],
            &[spec(AggFunc::Sum, Some("v"), "total")],
        )
        .unwrap();
        assert_eq!(output.rows(), 2);
        assert_eq!(output.find("total").unwrap().get(0), Some(Value::Int(30)));
        assert_eq!(output.find("total").unwrap().get(1), Some(Value::Int(30)));
    }

    #[test]
    fn string_sum_errors() {
        let mut input = Table::new();
        input.add_column("symbol", Column::from_strings(vec!["A".into()]));
        let err = aggregate(&input, &[], &[spec(AggFunc::Sum, Some("symbol"), "x")]).unwrap_err();
        assert_eq!(err, RuntimeError::StringAggregation);
    }

    #[test]
    fn string_min_is_allowed() {
        let mut input = Table::new();
        input.add_column("symbol", Column::from_strings(vec!["B".into(), "A".into()]));
        let output = aggregate(&input, &[], &[spec(AggFunc::Min, Some("symbol"), "m")]).unwrap();
        assert_eq!(output.find("m").unwrap().get(0), Some(Value::Str("A".into())));
    }

    #[test]
    fn count_rejects_a_source_column() {
        let mut input = Table::new();
        input.add_column("a", Column::from_ints(vec![1]));
        let err = aggregate(&input, &[], &[spec(AggFunc::Count, Some("a"), "n")]).unwrap_err();
        assert_eq!(err, RuntimeError::AggregateUnexpectedSource);
    }

    #[test]
    fn empty_global_aggregate_yields_identity_row() {
        let mut input = Table::new();
        input.add_column("qty", Column::from_ints(Vec::new()));
        let output = aggregate(&input, &[], &[spec(AggFunc::Sum, Some("qty"), "total")]).unwrap();
        assert_eq!(output.rows(), 1);
        assert_eq!(output.find("total").unwrap().get(0), Some(Value::Int(0)));
    }
}
