// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use ibex_column::Table;
use tracing::trace;

use crate::error::ExternError;
use crate::value::ScalarValue;

type ScalarFn = Arc<dyn Fn(&[ScalarValue]) -> Result<ScalarValue, String> + Send + Sync>;
type TableFn = Arc<dyn Fn(&[ScalarValue]) -> Result<Table, String> + Send + Sync>;
type ScalarFromTableFn = Arc<dyn Fn(&Table, &[ScalarValue]) -> Result<ScalarValue, String> + Send + Sync>;

/// One registered extern function: its return-kind and the callable
/// backing it.
#[derive(Clone)]
pub enum ExternFn {
    Scalar(ScalarFn),
    Table(TableFn),
    ScalarFromTable(ScalarFromTableFn),
}

impl ExternFn {
    fn kind_name(&self) -> &'static str {
        match self {
            ExternFn::Scalar(_) => "scalar",
            ExternFn::Table(_) => "table",
            ExternFn::ScalarFromTable(_) => "scalar-from-table",
        }
    }
}

/// A process-wide, name-keyed mapping of extern functions.
///
/// Registration happens at plugin-load time (out of scope) and is
/// last-write-wins by exact name; lookup happens during query
/// execution. The `RwLock` enforces many concurrent query readers,
/// no insert racing a read.
/// [`ExternRegistry::read`] returns a guard that should be held for the
/// duration of one query so the function set it observes cannot change
/// underneath it mid-evaluation.
#[derive(Default)]
pub struct ExternRegistry {
    functions: RwLock<HashMap<String, ExternFn>>,
}

impl ExternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_scalar(
        &self,
        name: impl Into<String>,
        f: impl Fn(&[ScalarValue]) -> Result<ScalarValue, String> + Send + Sync + 'static,
    ) {
        self.insert(name, ExternFn::Scalar(Arc::new(f)));
    }

    pub fn register_table(
        &self,
        name: impl Into<String>,
        f: impl Fn(&[ScalarValue]) -> Result<Table, String> + Send + Sync + 'static,
    ) {
        self.insert(name, ExternFn::Table(Arc::new(f)));
    }

    pub fn register_scalar_from_table(
        &self,
        name: impl Into<String>,
        f: impl Fn(&Table, &[ScalarValue]) -> Result<ScalarValue, String> + Send + Sync + 'static,
    ) {
        self.insert(name, ExternFn::ScalarFromTable(Arc::new(f)));
    }

    fn insert(&self, name: impl Into<String>, entry: ExternFn) {
        let name = name.into();
        trace!(function = %name, kind = entry.kind_name(), "registering extern function");
        let mut functions = self.functions.write().expect("extern registry poisoned");
        functions.insert(name, entry);
    }

    /// Acquires a shared read borrow of the registry, to be held for
    /// the duration of one query's execution.
    pub fn read(&self) -> ExternRead<'_> {
        ExternRead {
            functions: self.functions.read().expect("extern registry poisoned"),
        }
    }
}

/// A scoped read borrow of the registry. Holding this across a whole
/// query's evaluation guarantees every `ExternCall` node in that query
/// sees the same function set, even if another thread registers new
/// plugins concurrently.
pub struct ExternRead<'a> {
    functions: RwLockReadGuard<'a, HashMap<String, ExternFn>>,
}

impl<'a> ExternRead<'a> {
    pub fn get(&self, name: &str) -> Option<&ExternFn> {
        self.functions.get(name)
    }

    pub fn call_scalar(&self, name: &str, args: &[ScalarValue]) -> Result<ScalarValue, ExternError> {
        match self.get(name) {
            Some(ExternFn::Scalar(f)) => {
                f(args).map_err(|e| ExternError::Callee(format!("{name}: {e}")))
            }
            Some(other) => Err(ExternError::WrongReturnKind {
                callee: name.to_string(),
                expected: "scalar",
                actual: other.kind_name(),
            }),
            None => Err(ExternError::UnknownCallee(name.to_string())),
        }
    }

    pub fn call_table(&self, name: &str, args: &[ScalarValue]) -> Result<Table, ExternError> {
        match self.get(name) {
            Some(ExternFn::Table(f)) => {
                f(args).map_err(|e| ExternError::Callee(format!("{name}: {e}")))
            }
            Some(other) => Err(ExternError::WrongReturnKind {
                callee: name.to_string(),
                expected: "table",
                actual: other.kind_name(),
            }),
            None => Err(ExternError::UnknownCallee(name.to_string())),
        }
    }

    pub fn call_scalar_from_table(
        &self,
        name: &str,
        table: &Table,
        args: &[ScalarValue],
    ) -> Result<ScalarValue, ExternError> {
        match self.get(name) {
            Some(ExternFn::ScalarFromTable(f)) => {
                f(table, args).map_err(|e| ExternError::Callee(format!("{name}: {e}")))
            }
            Some(other) => Err(ExternError::WrongReturnKind {
                callee: name.to_string(),
                expected: "scalar-from-table",
                actual: other.kind_name(),
            }),
            None => Err(ExternError::UnknownCallee(name.to_string())),
        }
    }
}
