// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use ibex_ast::{ByKey, Clause, Expr, OrderKey as AstOrderKey, SelectField};
use ibex_ir::{AggFunc, AggSpec, Builder, Node, OrderKey, ValueExpr};

use crate::duration::parse_duration;
use crate::error::LowerError;
use crate::filter::lower_filter_bool;
use crate::value::lower_value_expr;

#[derive(Default)]
struct Clauses<'a> {
    filter: Option<&'a Expr>,
    select: Option<&'a [SelectField]>,
    update: Option<&'a [SelectField]>,
    distinct: bool,
    order: Option<&'a [AstOrderKey]>,
    by: Option<&'a [ByKey]>,
    window: Option<&'a str>,
}

fn collect(clauses: &[Clause]) -> Result<Clauses<'_>, LowerError> {
    let mut out = Clauses::default();
    for clause in clauses {
        match clause {
            Clause::Filter(expr) => {
                if out.filter.replace(expr).is_some() {
                    return Err(LowerError::DuplicateClause("filter"));
                }
            }
            Clause::Select(fields) => {
                if out.select.replace(fields).is_some() {
                    return Err(LowerError::DuplicateClause("select"));
                }
            }
            Clause::Update(fields) => {
                if out.update.replace(fields).is_some() {
                    return Err(LowerError::DuplicateClause("update"));
                }
            }
            Clause::Distinct => {
                if out.distinct {
                    return Err(LowerError::DuplicateClause("distinct"));
                }
                out.distinct = true;
            }
            Clause::Order(keys) => {
                if out.order.replace(keys).is_some() {
                    return Err(LowerError::DuplicateClause("order"));
                }
            }
            Clause::By(keys) => {
                if out.by.replace(keys).is_some() {
                    return Err(LowerError::DuplicateClause("by"));
                }
            }
            Clause::Window(duration) => {
                if out.window.replace(duration).is_some() {
                    return Err(LowerError::DuplicateClause("window"));
                }
            }
        }
    }
    Ok(out)
}

fn by_names(keys: &[ByKey]) -> Result<Vec<String>, LowerError> {
    keys.iter()
        .map(|key| match key {
            ByKey::Column(name) => Ok(name.clone()),
            ByKey::Computed { .. } => Err(LowerError::ComputedByKeyWithoutUpdate),
        })
        .collect()
}

fn agg_func(callee: &str) -> Result<AggFunc, LowerError> {
    Ok(match callee {
        "sum" => AggFunc::Sum,
        "mean" => AggFunc::Mean,
        "min" => AggFunc::Min,
        "max" => AggFunc::Max,
        "count" => AggFunc::Count,
        "first" => AggFunc::First,
        "last" => AggFunc::Last,
        _ => return Err(LowerError::UnknownAggregateFunction(callee.to_string())),
    })
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

fn lower_agg_spec(alias: &str, callee: &str, args: &[Expr]) -> Result<AggSpec, LowerError> {
    let func = agg_func(callee)?;
    if func == AggFunc::Count {
        if !args.is_empty() {
            return Err(LowerError::CountTakesNoArgs);
        }
        return Ok(AggSpec {
            func,
            source: None,
            alias: alias.to_string(),
        });
    }
    match args {
        [Expr::Ident(name)] => Ok(AggSpec {
            func,
            source: Some(name.clone()),
            alias: alias.to_string(),
        }),
        _ => Err(LowerError::AggregateArgMustBeSingleColumn(agg_func_name(func))),
    }
}

fn lower_aggregate(builder: &Builder, input: Node, by: &[ByKey], select: &[SelectField]) -> Result<Node, LowerError> {
    let group_by = by_names(by)?;
    let mut aggregations = Vec::new();
    for field in select {
        match &field.expr {
            None => {
                if !group_by.contains(&field.name) {
                    return Err(LowerError::GroupProjectionNotInByList(field.name.clone()));
                }
            }
            Some(Expr::Call { callee, args }) => {
                aggregations.push(lower_agg_spec(&field.name, callee, args)?);
            }
            Some(_) => return Err(LowerError::AggregateFieldMustBeCallOrColumn(field.name.clone())),
        }
    }
    Ok(builder.aggregate(input, group_by, aggregations))
}

fn lower_project(builder: &Builder, input: Node, select: &[SelectField]) -> Result<Node, LowerError> {
    let columns = select
        .iter()
        .map(|field| match &field.expr {
            None => Ok(field.name.clone()),
            Some(_) => Err(LowerError::ProjectFieldMustBeColumn(field.name.clone())),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(builder.project(input, columns))
}

fn lower_update_fields(fields: &[SelectField]) -> Result<Vec<(String, ValueExpr)>, LowerError> {
    fields
        .iter()
        .map(|field| {
            let value = match &field.expr {
                Some(expr) => lower_value_expr(expr)?,
                None => ValueExpr::Column(field.name.clone()),
            };
            Ok((field.name.clone(), value))
        })
        .collect()
}

/// Materializes any computed `by` keys into real columns via a
/// preliminary ungrouped `update`, since `Aggregate`/`Update`'s
/// `group_by` is a plain column-name list with no room for the key
/// expression itself. Returns the (possibly updated) input node and
/// the resulting group-by column names, in declaration order.
fn lower_grouped_by(builder: &Builder, input: Node, by: &[ByKey]) -> Result<(Node, Vec<String>), LowerError> {
    let mut computed_fields = Vec::new();
    let mut group_by = Vec::with_capacity(by.len());
    for key in by {
        match key {
            ByKey::Column(name) => group_by.push(name.clone()),
            ByKey::Computed { alias, expr } => {
                computed_fields.push((alias.clone(), lower_value_expr(expr)?));
                group_by.push(alias.clone());
            }
        }
    }
    let input = if computed_fields.is_empty() {
        input
    } else {
        builder.update(input, computed_fields, None)
    };
    Ok((input, group_by))
}

fn lower_update(builder: &Builder, input: Node, update: &[SelectField], by: Option<&[ByKey]>) -> Result<Node, LowerError> {
    let fields = lower_update_fields(update)?;
    match by {
        None => Ok(builder.update(input, fields, None)),
        Some(by) => {
            let (input, group_by) = lower_grouped_by(builder, input, by)?;
            Ok(builder.update(input, fields, Some(group_by)))
        }
    }
}

/// Applies a block's clauses to its already-lowered base node, in the
/// fixed evaluation order: filter, aggregate-or-project, update,
/// distinct, order, window, regardless of the order the clauses were
/// written in.
pub fn apply_clauses(builder: &Builder, input: Node, clauses: &[Clause]) -> Result<Node, LowerError> {
    let parsed = collect(clauses)?;

    if parsed.select.is_some() && parsed.update.is_some() {
        return Err(LowerError::SelectAndUpdateBothPresent);
    }
    if parsed.by.is_some() && parsed.select.is_none() && parsed.update.is_none() {
        return Err(LowerError::ByWithoutSelectOrUpdate);
    }
    if let Some(by) = parsed.by {
        let has_computed = by.iter().any(|key| matches!(key, ByKey::Computed { .. }));
        if has_computed && parsed.update.is_none() {
            return Err(LowerError::ComputedByKeyWithoutUpdate);
        }
    }

    let mut node = input;

    if let Some(predicate) = parsed.filter {
        node = builder.filter(node, lower_filter_bool(predicate)?);
    }

    node = match (parsed.by, parsed.select) {
        (Some(by), Some(select)) => lower_aggregate(builder, node, by, select)?,
        (None, Some(select)) => lower_project(builder, node, select)?,
        _ => node,
    };

    if let Some(update) = parsed.update {
        node = lower_update(builder, node, update, parsed.by)?;
    }

    if parsed.distinct {
        node = builder.distinct(node);
    }

    if let Some(keys) = parsed.order {
        let keys = keys
            .iter()
            .map(|key| OrderKey {
                name: key.name.clone(),
                ascending: key.ascending,
            })
            .collect();
        node = builder.order(node, keys);
    }

    if let Some(duration) = parsed.window {
        node = builder.window(node, parse_duration(duration)?);
    }

    Ok(node)
}
