// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_column::Table;

use crate::error::RuntimeError;

/// Copies the named columns, in the listed order, into a new table.
/// Each column is an `Arc` clone of the original backing storage, no
/// row data is copied.
pub fn project(input: &Table, columns: &[String]) -> Result<Table, RuntimeError> {
    let mut output = Table::new();
    for name in columns {
        let column = input.find(name).ok_or_else(|| RuntimeError::ColumnNotFound {
            context: "project",
            name: name.clone(),
        })?;
        output.add_column(name.clone(), column.clone());
    }
    if let Some(time_index) = input.time_index() {
        if columns.iter().any(|name| name == time_index) {
            output
                .set_time_index(time_index)
                .expect("time index column retained by projection");
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;

    #[test]
    fn reorders_and_drops_columns() {
        let mut input = Table::new();
        input.add_column("a", Column::from_ints(vec![1]));
        input.add_column("b", Column::from_ints(vec![2]));
        input.add_column("c", Column::from_ints(vec![3]));
        let output = project(&input, &["c".to_string(), "a".to_string()]).unwrap();
        let names: Vec<_> = output.column_names().collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn missing_column_errors() {
        let input = Table::new();
        let err = project(&input, &["missing".to_string()]).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ColumnNotFound {
                context: "project",
                name: "missing".into(),
            }
        );
    }
}
