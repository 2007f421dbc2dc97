// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::{HashMap, HashSet};

use ibex_column::{Column, Table, Value};
use ibex_ir::JoinKind;

use crate::error::RuntimeError;
use crate::ops::util::zero_value;

fn time_ns(value: &Value) -> i64 {
    match value {
        Value::Timestamp(v) => *v,
        _ => unreachable!("time index columns are validated to hold Timestamp values"),
    }
}

/// Equijoins `left` and `right` on `keys`.
pub fn join(left: &Table, right: &Table, kind: JoinKind, keys: &[String]) -> Result<Table, RuntimeError> {
    for key in keys {
        if !left.contains(key) || !right.contains(key) {
            return Err(RuntimeError::JoinKeyNotFound(key.clone()));
        }
    }
    match kind {
        JoinKind::Inner => hash_join(left, right, keys, false),
        JoinKind::Left => hash_join(left, right, keys, true),
        JoinKind::Asof => asof_join(left, right, keys),
    }
}

fn row_key(columns: &[&Column], row: usize) -> Vec<Value> {
    columns.iter().map(|column| column.get_unchecked(row)).collect()
}

fn hash_join(left: &Table, right: &Table, keys: &[String], keep_unmatched: bool) -> Result<Table, RuntimeError> {
    let left_keys: Vec<&Column> = keys.iter().map(|k| left.find(k).expect("checked above")).collect();
    let right_keys: Vec<&Column> = keys.iter().map(|k| right.find(k).expect("checked above")).collect();

    let mut right_index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for row in 0..right.rows() {
        right_index.entry(row_key(&right_keys, row)).or_default().push(row);
    }

    let mut pairs: Vec<(usize, Option<usize>)> = Vec::new();
    for row in 0..left.rows() {
        let key = row_key(&left_keys, row);
        match right_index.get(&key) {
            Some(matches) => pairs.extend(matches.iter().map(|&r| (row, Some(r)))),
            None if keep_unmatched => pairs.push((row, None)),
            None => {}
        }
    }
    build_output(left, right, keys, &pairs)
}

/// For each left row at time `t`, selects the right row with the
/// maximum right-time ≤ `t` among rows matching the equality keys,
/// breaking ties by preferring the row that comes last in the right
/// table's current order.
fn asof_join(left: &Table, right: &Table, keys: &[String]) -> Result<Table, RuntimeError> {
    let time_index = left.time_index().ok_or(RuntimeError::AsofMissingTimeIndex)?;
    if right.time_index().is_none() {
        return Err(RuntimeError::AsofMissingTimeIndex);
    }
    if keys.first().map(String::as_str) != Some(time_index) {
        return Err(RuntimeError::AsofTimeIndexNotFirstKey);
    }
    let equality_keys = &keys[1..];

    let left_time = left.find(time_index).expect("validated by time_index()");
    let right_time = right.find(time_index).expect("checked above");
    let left_eq: Vec<&Column> = equality_keys.iter().map(|k| left.find(k).expect("checked above")).collect();
    let right_eq: Vec<&Column> = equality_keys.iter().map(|k| right.find(k).expect("checked above")).collect();

    let mut right_groups: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for row in 0..right.rows() {
        right_groups.entry(row_key(&right_eq, row)).or_default().push(row);
    }

    let mut pairs: Vec<(usize, Option<usize>)> = Vec::new();
    for row in 0..left.rows() {
        let t = time_ns(&left_time.get_unchecked(row));
        let key = row_key(&left_eq, row);
        let best = right_groups.get(&key).and_then(|candidates| {
            let mut best_row = None;
            let mut best_time = None;
            for &candidate in candidates {
                let candidate_time = time_ns(&right_time.get_unchecked(candidate));
                if candidate_time <= t && best_time.map_or(true, |bt| candidate_time >= bt) {
                    best_time = Some(candidate_time);
                    best_row = Some(candidate);
                }
            }
            best_row
        });
        pairs.push((row, best));
    }
    build_output(left, right, keys, &pairs)
}

/// Assembles the output schema: left columns unchanged, then right
/// columns minus the join keys (emitted once from the left side),
/// renaming any non-key right column whose name collides with a left
/// column by appending `_right`. Unmatched right-side cells are filled
/// with the element-type zero.
fn build_output(
    left: &Table,
    right: &Table,
    keys: &[String],
    pairs: &[(usize, Option<usize>)],
) -> Result<Table, RuntimeError> {
    let mut output = Table::new();
    let left_rows: Vec<usize> = pairs.iter().map(|(l, _)| *l).collect();
    for (name, column) in left.columns() {
        let mut out_col = column.empty_like();
        out_col.reserve(left_rows.len());
        let mut valid = Vec::with_capacity(left_rows.len());
        for &row in &left_rows {
            out_col.push(column.get_unchecked(row))?;
            valid.push(column.is_valid(row));
        }
        output.add_column(name, out_col.with_validity(valid));
    }

    let key_set: HashSet<&str> = keys.iter().map(String::as_str).collect();
    for (name, column) in right.columns() {
        if key_set.contains(name) {
            continue;
        }
        let out_name = if left.contains(name) {
            format!("{name}_right")
        } else {
            name.to_string()
        };
        let mut out_col = column.empty_like();
        out_col.reserve(pairs.len());
        let mut valid = Vec::with_capacity(pairs.len());
        for (_, maybe_right) in pairs {
            match maybe_right {
                Some(r) => {
                    out_col.push(column.get_unchecked(*r))?;
                    valid.push(column.is_valid(*r));
                }
                None => {
                    out_col.push(zero_value(column.element_type()))?;
                    valid.push(true);
                }
            }
        }
        output.add_column(out_name, out_col.with_validity(valid));
    }

    if let Some(time_index) = left.time_index() {
        output
            .set_time_index(time_index)
            .expect("left's time index column is copied into the output verbatim");
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;

    #[test]
    fn inner_join_drops_unmatched_rows() {
        let mut left = Table::new();
        left.add_column("id", Column::from_ints(vec![1, 2, 3]));
        let mut right = Table::new();
        right.add_column("id", Column::from_ints(vec![2, 3]));
        right.add_column("label", Column::from_strings(vec!["b".into(), "c".into()]));
        let output = join(&left, &right, JoinKind::Inner, &["id".to_string()]).unwrap();
        assert_eq!(output.rows(), 2);
    }

    #[test]
    fn left_join_zero_fills_unmatched() {
        let mut left = Table::new();
        left.add_column("id", Column::from_ints(vec![1, 2]));
        let mut right = Table::new();
        right.add_column("id", Column::from_ints(vec![2]));
        right.add_column("label", Column::from_strings(vec!["b".into()]));
        let output = join(&left, &right, JoinKind::Left, &["id".to_string()]).unwrap();
        assert_eq!(output.rows(), 2);
        assert_eq!(output.find("label").unwrap().get(0), Some(Value::Str(String::new())));
        assert_eq!(output.find("label").unwrap().get(1), Some(Value::Str("b".into())));
    }

    #[test]
    fn duplicate_non_key_column_gets_right_suffix() {
        let mut left = Table::new();
        left.add_column("id", Column::from_ints(vec![1]));
        left.add_column("value", Column::from_ints(vec![10]));
        let mut right = Table::new();
        right.add_column("id", Column::from_ints(vec![1]));
        right.add_column("value", Column::from_ints(vec![20]));
        let output = join(&left, &right, JoinKind::Inner, &["id".to_string()]).unwrap();
        let names: Vec<_> = output.column_names().collect();
        assert!(names.contains(&"value"));
        assert!(names.contains(&"value_right"));
    }

    #[test]
    fn asof_picks_latest_right_row_at_or_before_left_time() {
        let mut left = Table::new();
        left.add_column("ts", Column::from_timestamps(vec![5, 15]));
        left.set_time_index("ts").unwrap();
        let mut right = Table::new();
        right.add_column("ts", Column::from_timestamps(vec![0, 10, 20]));
        right.add_column("price", Column::from_ints(vec![100, 200, 300]));
        right.set_time_index("ts").unwrap();

        let output = join(&left, &right, JoinKind::Asof, &["ts".to_string()]).unwrap();
        assert_eq!(output.find("price").unwrap().get(0), Some(Value::Int(100)));
        assert_eq!(output.find("price").unwrap().get(1), Some(Value::Int(200)));
    }

    #[test]
    fn asof_without_time_index_errors() {
        let left = Table::new();
        let right = Table::new();
        let err = join(&left, &right, JoinKind::Asof, &[]).unwrap_err();
        assert_eq!(err, RuntimeError::AsofMissingTimeIndex);
    }
}
