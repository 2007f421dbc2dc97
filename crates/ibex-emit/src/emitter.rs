// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::{BTreeSet, HashMap};

use ibex_ast::ExternDecl;
use ibex_ir::{Node, NodeId, NodeKind};
use tracing::debug;

use crate::error::EmitError;
use crate::externs::emit_registration;
use crate::options::EmitOptions;
use crate::render::{self, value_expr};

fn contains(node: &Node, predicate: &impl Fn(&NodeKind) -> bool) -> bool {
    predicate(node.kind()) || node.children().iter().any(|child| contains(child, predicate))
}

fn is_filter(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Filter { .. })
}

fn is_update(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Update { .. })
}

fn collect_extern_calls<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    if matches!(node.kind(), NodeKind::ExternCall { .. }) {
        out.push(node);
    }
    for child in node.children() {
        collect_extern_calls(child, out);
    }
}

/// Walks an IR tree bottom-up, emitting one fresh local per node into a
/// Rust translation unit that, compiled against `ibex-runtime`,
/// reproduces the same table `ibex-interp` would for the same tree.
pub struct Emitter {
    next_var: u64,
    extern_vars: HashMap<NodeId, String>,
}

impl Emitter {
    pub fn new() -> Self {
        Self { next_var: 1, extern_vars: HashMap::new() }
    }

    fn fresh_var(&mut self) -> String {
        let var = format!("t_{}", self.next_var);
        self.next_var += 1;
        var
    }

    fn extern_arg(&self, arg: &ibex_ir::ExternArg) -> Result<String, EmitError> {
        match arg {
            ibex_ir::ExternArg::Literal(ibex_ir::Literal::Int(v)) => Ok(format!("{v}i64")),
            ibex_ir::ExternArg::Literal(ibex_ir::Literal::Float(v)) => Ok(format!("{v:?}f64")),
            ibex_ir::ExternArg::Literal(ibex_ir::Literal::Str(v)) => {
                Ok(format!("\"{}\"", render::escape_str(v)))
            }
            ibex_ir::ExternArg::ColumnRef(name) => Err(EmitError::ExternArgNotEmittable(name.clone())),
        }
    }

    /// Emits the data-load section: one call per distinct `ExternCall`
    /// leaf, in first-occurrence order, before any query operator runs.
    fn emit_data_loads(&mut self, root: &Node, externs: &[ExternDecl], out: &mut String) -> Result<(), EmitError> {
        let mut calls = Vec::new();
        collect_extern_calls(root, &mut calls);
        for node in calls {
            let NodeKind::ExternCall { callee, args } = node.kind() else {
                unreachable!("collect_extern_calls only collects ExternCall nodes");
            };
            let decl = externs
                .iter()
                .find(|d| &d.name == callee)
                .ok_or_else(|| EmitError::UnknownExternCallee(callee.clone()))?;
            let rendered_args =
                args.iter().map(|a| self.extern_arg(a)).collect::<Result<Vec<_>, _>>()?.join(", ");
            let var = self.fresh_var();
            debug!(node = "ExternCall", callee = %callee, %var, "emitting data load");
            out.push_str(&format!("    let {var} = {}::{}({rendered_args});\n", decl.source, callee));
            self.extern_vars.insert(node.id(), var);
        }
        Ok(())
    }

    /// Emits the query chain: every non-`ExternCall` node as a call
    /// into the matching `ibex_runtime::ops` function, referencing the
    /// already-loaded data-load variables for its `ExternCall` leaves.
    fn emit_query_node(&mut self, node: &Node, out: &mut String) -> Result<String, EmitError> {
        if let NodeKind::ExternCall { .. } = node.kind() {
            return Ok(self.extern_vars[&node.id()].clone());
        }
        debug!(node = node.kind().name(), id = %node.id(), "emitting query node");
        match node.kind() {
            NodeKind::Scan { source } => Err(EmitError::ScanNotEmittable(source.clone())),
            NodeKind::ExternCall { .. } => unreachable!("handled above"),
            NodeKind::Filter { input, predicate } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                out.push_str(&format!(
                    "    let {var} = ops::filter(&{input_var}, &{}, &__scalars)?;\n",
                    render::filter_bool(predicate)
                ));
                Ok(var)
            }
            NodeKind::Project { input, columns } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                out.push_str(&format!(
                    "    let {var} = ops::project(&{input_var}, &{})?;\n",
                    render::string_vec(columns)
                ));
                Ok(var)
            }
            NodeKind::Distinct { input } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                out.push_str(&format!("    let {var} = ops::distinct(&{input_var})?;\n"));
                Ok(var)
            }
            NodeKind::Order { input, keys } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                let keys = keys.iter().map(render::order_key).collect::<Vec<_>>().join(", ");
                out.push_str(&format!("    let {var} = ops::order(&{input_var}, &[{keys}])?;\n"));
                Ok(var)
            }
            NodeKind::Aggregate { input, group_by, aggregations } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                let aggs = aggregations.iter().map(render::agg_spec).collect::<Vec<_>>().join(", ");
                out.push_str(&format!(
                    "    let {var} = ops::aggregate(&{input_var}, &{}, &[{aggs}])?;\n",
                    render::string_vec(group_by)
                ));
                Ok(var)
            }
            NodeKind::Update { input, fields, group_by } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                let fields = fields
                    .iter()
                    .map(|(alias, expr)| format!("(\"{}\".to_string(), {})", render::escape_str(alias), value_expr(expr)))
                    .collect::<Vec<_>>()
                    .join(", ");
                match group_by {
                    Some(keys) => out.push_str(&format!(
                        "    let {var} = ops::update_grouped(&{input_var}, &[{fields}], &{}, &__scalars, &__externs_read)?;\n",
                        render::string_vec(keys)
                    )),
                    None => out.push_str(&format!(
                        "    let {var} = ops::update(&{input_var}, &[{fields}], &__scalars, &__externs_read)?;\n"
                    )),
                }
                Ok(var)
            }
            NodeKind::Window { input, lookback_ns } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                // No rolling-window semantics exist in ibex-runtime yet; this
                // calls a hook name reserved for that, matching the interpreter's
                // own "Window is unsupported" stance (see ibex-interp).
                out.push_str(&format!("    let {var} = ops::ibex_window(&{input_var}, {lookback_ns}i64)?;\n"));
                Ok(var)
            }
            NodeKind::AsTimeframe { input, time_column } => {
                let input_var = self.emit_query_node(input, out)?;
                let var = self.fresh_var();
                out.push_str(&format!(
                    "    let {var} = {{ let mut __t = {input_var}.clone(); __t.set_time_index(\"{}\".to_string())?; __t }};\n",
                    render::escape_str(time_column)
                ));
                Ok(var)
            }
            NodeKind::Join { left, right, kind, keys } => {
                let left_var = self.emit_query_node(left, out)?;
                let right_var = self.emit_query_node(right, out)?;
                let var = self.fresh_var();
                out.push_str(&format!(
                    "    let {var} = ops::join(&{left_var}, &{right_var}, {}, &{})?;\n",
                    render::join_kind(*kind),
                    render::string_vec(keys)
                ));
                Ok(var)
            }
        }
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Emits a translation unit for `root`, an IR tree rooted directly in
/// an `ExternCall` (or a chain over one). A bare `Scan` has no table
/// to read in a standalone translation unit, so it is rejected rather
/// than guessed at.
pub fn emit(root: &Node, externs: &[ExternDecl], options: &EmitOptions) -> Result<String, EmitError> {
    let mut emitter = Emitter::new();
    let mut body = String::new();

    emitter.emit_data_loads(root, externs, &mut body)?;

    if contains(root, &is_filter) || contains(root, &is_update) {
        body.push_str("    let __scalars = ibex_runtime::ScalarRegistry::new();\n");
    }
    if contains(root, &is_update) {
        body.push_str(&emit_registration(externs));
    }

    body.push_str("    let run_query = || -> Result<ibex_column::Table, Box<dyn std::error::Error>> {\n");
    let mut query_body = String::new();
    let root_var = emitter.emit_query_node(root, &mut query_body)?;
    body.push_str(&query_body);
    body.push_str(&format!("        Ok({root_var})\n"));
    body.push_str("    };\n\n");

    if let Some(bench) = options.benchmark() {
        body.push_str(&format!("    for _ in 0..{}u32 {{ run_query()?; }}\n", bench.warmup_iters));
        body.push_str("    let __bench_start = std::time::Instant::now();\n");
        body.push_str(&format!("    for _ in 0..{}u32 {{ run_query()?; }}\n", bench.timed_iters));
        body.push_str(&format!(
            "    eprintln!(\"ran {} iterations in {{:?}}\", __bench_start.elapsed());\n",
            bench.timed_iters
        ));
    }

    body.push_str("    let result = run_query()?;\n");
    if options.print_root() {
        body.push_str("    println!(\"{:#?}\", result);\n");
        body.push_str("    Ok(())\n");
    } else {
        body.push_str("    println!(\"{}\", result.rows());\n");
        body.push_str("    Ok(())\n");
    }

    let mut unit = String::new();
    if let Some(name) = options.source_name() {
        unit.push_str(&format!("// Source: {}\n", render::escape_str(name)));
    }
    let mut sources: BTreeSet<&str> = BTreeSet::new();
    for decl in externs {
        sources.insert(decl.source.as_str());
    }
    for source in sources {
        unit.push_str(&format!("use {source}::*;\n"));
    }
    unit.push_str("use ibex_runtime::ops;\n\n");
    unit.push_str("fn run() -> Result<(), Box<dyn std::error::Error>> {\n");
    unit.push_str(&body);
    unit.push_str("}\n\n");
    unit.push_str("fn main() -> Result<(), Box<dyn std::error::Error>> {\n    run()\n}\n");

    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibex_ast::{Param, TypeName};
    use ibex_ir::{Builder, CompareOp, ExternArg, FilterBool, FilterValue, Literal};

    fn read_csv_decl() -> ExternDecl {
        ExternDecl {
            name: "read_csv".into(),
            params: vec![Param { name: "path".into(), ty: TypeName::new("string") }],
            return_type: TypeName::new("DataFrame"),
            source: "csv_source".into(),
        }
    }

    #[test]
    fn scan_root_is_rejected() {
        let builder = Builder::new();
        let node = builder.scan("trades");
        let err = emit(&node, &[], &EmitOptions::new()).unwrap_err();
        assert!(matches!(err, EmitError::ScanNotEmittable(name) if name == "trades"));
    }

    #[test]
    fn extern_call_emits_direct_function_call_and_runtime_include() {
        let builder = Builder::new();
        let node = builder.extern_call("read_csv", vec![ExternArg::Literal(Literal::Str("trades.csv".into()))]);
        let out = emit(&node, &[read_csv_decl()], &EmitOptions::new()).unwrap();
        assert!(out.contains("use csv_source::*;"));
        assert!(out.contains("use ibex_runtime::ops;"));
        assert!(out.contains("csv_source::read_csv(\"trades.csv\")"));
        assert!(out.contains("fn main()"));
    }

    #[test]
    fn filter_chains_after_its_input_and_binds_scalars() {
        let builder = Builder::new();
        let source = builder.extern_call("read_csv", vec![ExternArg::Literal(Literal::Str("t.csv".into()))]);
        let filter = builder.filter(
            source,
            FilterBool::Compare {
                op: CompareOp::Gt,
                left: FilterValue::Column("price".into()),
                right: FilterValue::Literal(Literal::Int(100)),
            },
        );
        let out = emit(&filter, &[read_csv_decl()], &EmitOptions::new()).unwrap();
        assert!(out.contains("ops::filter("));
        assert!(out.contains("ibex_ir::CompareOp::Gt"));
        assert!(out.contains("let __scalars = ibex_runtime::ScalarRegistry::new();"));
        let source_pos = out.find("csv_source::read_csv(").unwrap();
        let filter_pos = out.find("ops::filter(").unwrap();
        assert!(source_pos < filter_pos);
    }

    #[test]
    fn print_mode_emits_debug_print_not_row_count() {
        let builder = Builder::new();
        let node = builder.extern_call("read_csv", vec![ExternArg::Literal(Literal::Str("t.csv".into()))]);
        let out = emit(&node, &[read_csv_decl()], &EmitOptions::new().with_print_root(true)).unwrap();
        assert!(out.contains("println!(\"{:#?}\", result);"));
        assert!(!out.contains("result.rows()"));
    }

    #[test]
    fn benchmark_mode_wraps_query_not_data_load() {
        let builder = Builder::new();
        let source = builder.extern_call("read_csv", vec![ExternArg::Literal(Literal::Str("t.csv".into()))]);
        let distinct = builder.distinct(source);
        let out = emit(&distinct, &[read_csv_decl()], &EmitOptions::new().with_benchmark(5, 50)).unwrap();
        let load_pos = out.find("csv_source::read_csv(").unwrap();
        let warmup_pos = out.find("for _ in 0..5u32").unwrap();
        let timed_pos = out.find("for _ in 0..50u32").unwrap();
        assert!(load_pos < warmup_pos);
        assert!(warmup_pos < timed_pos);
    }

    #[test]
    fn unknown_extern_callee_is_rejected() {
        let builder = Builder::new();
        let node = builder.extern_call("mystery_fn", vec![]);
        let err = emit(&node, &[], &EmitOptions::new()).unwrap_err();
        assert!(matches!(err, EmitError::UnknownExternCallee(name) if name == "mystery_fn"));
    }
}
