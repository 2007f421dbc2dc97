// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashMap;

use ibex_column::Table;

/// Named tables available to `Scan`: the query's base inputs, plus the
/// results of earlier `let`-bound statements in the same program.
#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<String, Table>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_column::Column;

    #[test]
    fn insert_then_get_round_trips() {
        let mut registry = TableRegistry::new();
        let mut table = Table::new();
        table.add_column("a", Column::from_ints(vec![1]));
        registry.insert("trades", table);
        assert_eq!(registry.get("trades").unwrap().rows(), 1);
        assert!(registry.get("missing").is_none());
    }
}
