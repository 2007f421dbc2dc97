// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::agg::AggSpec;
use crate::expr::{FilterBool, Literal, ValueExpr};
use crate::join::JoinKind;

/// A stable identifier assigned by a [`Builder`], unique within the
/// tree it built. Ids are monotonically increasing and are never
/// reused, so they remain referentially stable for the lifetime of the
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderKey {
    pub name: String,
    pub ascending: bool,
}

/// An argument to an `ExternCall` node: either a literal or a
/// reference to a name resolved at interpret time (a column, or a
/// scalar bound by `let`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExternArg {
    Literal(Literal),
    ColumnRef(String),
}

/// A node in the immutable IR plan tree.
///
/// The builder exclusively owns a node until it is added as a child,
/// at which point its parent exclusively owns it, modeled here with
/// `Box`, not `Rc`/`Arc`: the tree has no sharing. `let` bindings are
/// materialized by cloning the bound sub-tree at lowering time, not by
/// aliasing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The node's children, in the order the node catalog declares
    /// them.
    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Scan { .. } | NodeKind::ExternCall { .. } => vec![],
            NodeKind::Filter { input, .. }
            | NodeKind::Project { input, .. }
            | NodeKind::Distinct { input }
            | NodeKind::Order { input, .. }
            | NodeKind::Aggregate { input, .. }
            | NodeKind::Update { input, .. }
            | NodeKind::Window { input, .. }
            | NodeKind::AsTimeframe { input, .. } => vec![input.as_ref()],
            NodeKind::Join { left, right, .. } => vec![left.as_ref(), right.as_ref()],
        }
    }
}

/// Per-kind payload for each node in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Scan {
        source: String,
    },
    Filter {
        input: Box<Node>,
        predicate: FilterBool,
    },
    Project {
        input: Box<Node>,
        columns: Vec<String>,
    },
    Distinct {
        input: Box<Node>,
    },
    Order {
        input: Box<Node>,
        keys: Vec<OrderKey>,
    },
    Aggregate {
        input: Box<Node>,
        group_by: Vec<String>,
        aggregations: Vec<AggSpec>,
    },
    Update {
        input: Box<Node>,
        fields: Vec<(String, ValueExpr)>,
        group_by: Option<Vec<String>>,
    },
    Window {
        input: Box<Node>,
        lookback_ns: i64,
    },
    AsTimeframe {
        input: Box<Node>,
        time_column: String,
    },
    Join {
        left: Box<Node>,
        right: Box<Node>,
        kind: JoinKind,
        keys: Vec<String>,
    },
    ExternCall {
        callee: String,
        args: Vec<ExternArg>,
    },
}

impl NodeKind {
    /// A short, stable name for diagnostics and emitted local variable
    /// comments, never used for dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Scan { .. } => "Scan",
            NodeKind::Filter { .. } => "Filter",
            NodeKind::Project { .. } => "Project",
            NodeKind::Distinct { .. } => "Distinct",
            NodeKind::Order { .. } => "Order",
            NodeKind::Aggregate { .. } => "Aggregate",
            NodeKind::Update { .. } => "Update",
            NodeKind::Window { .. } => "Window",
            NodeKind::AsTimeframe { .. } => "AsTimeframe",
            NodeKind::Join { .. } => "Join",
            NodeKind::ExternCall { .. } => "ExternCall",
        }
    }
}

/// Factory for IR nodes. Assigns each node a fresh id from an atomic
/// counter starting at 1.
///
/// The counter is the only shared-mutable state in the query core: a
/// single atomic increment lets nodes built from multiple threads
/// receive distinct ids without a lock. Everything else about node
/// construction is single-threaded per call.
#[derive(Debug, Default)]
pub struct Builder {
    counter: AtomicU64,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.counter.fetch_add(1, Ordering::Relaxed))
    }

    fn node(&self, kind: NodeKind) -> Node {
        Node {
            id: self.next_id(),
            kind,
        }
    }

    pub fn scan(&self, source: impl Into<String>) -> Node {
        self.node(NodeKind::Scan {
            source: source.into(),
        })
    }

    pub fn filter(&self, input: Node, predicate: FilterBool) -> Node {
        self.node(NodeKind::Filter {
            input: Box::new(input),
            predicate,
        })
    }

    pub fn project(&self, input: Node, columns: Vec<String>) -> Node {
        self.node(NodeKind::Project {
            input: Box::new(input),
            columns,
        })
    }

    pub fn distinct(&self, input: Node) -> Node {
        self.node(NodeKind::Distinct {
            input: Box::new(input),
        })
    }

    pub fn order(&self, input: Node, keys: Vec<OrderKey>) -> Node {
        self.node(NodeKind::Order {
            input: Box::new(input),
            keys,
        })
    }

    pub fn aggregate(&self, input: Node, group_by: Vec<String>, aggregations: Vec<AggSpec>) -> Node {
        self.node(NodeKind::Aggregate {
            input: Box::new(input),
            group_by,
            aggregations,
        })
    }

    pub fn update(
        &self,
        input: Node,
        fields: Vec<(String, ValueExpr)>,
        group_by: Option<Vec<String>>,
    ) -> Node {
        self.node(NodeKind::Update {
            input: Box::new(input),
            fields,
            group_by,
        })
    }

    pub fn window(&self, input: Node, lookback_ns: i64) -> Node {
        self.node(NodeKind::Window {
            input: Box::new(input),
            lookback_ns,
        })
    }

    pub fn as_timeframe(&self, input: Node, time_column: impl Into<String>) -> Node {
        self.node(NodeKind::AsTimeframe {
            input: Box::new(input),
            time_column: time_column.into(),
        })
    }

    pub fn join(&self, left: Node, right: Node, kind: JoinKind, keys: Vec<String>) -> Node {
        self.node(NodeKind::Join {
            left: Box::new(left),
            right: Box::new(right),
            kind,
            keys,
        })
    }

    pub fn extern_call(&self, callee: impl Into<String>, args: Vec<ExternArg>) -> Node {
        self.node(NodeKind::ExternCall {
            callee: callee.into(),
            args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_and_stable() {
        let builder = Builder::new();
        let scan = builder.scan("trades");
        let filtered = builder.filter(
            scan,
            FilterBool::Compare {
                op: crate::expr::CompareOp::Gt,
                left: crate::expr::FilterValue::Column("price".into()),
                right: crate::expr::FilterValue::Literal(Literal::Int(15)),
            },
        );
        assert_eq!(filtered.id().get(), 2);
        let NodeKind::Filter { input, .. } = filtered.kind() else {
            panic!("expected Filter");
        };
        assert_eq!(input.id().get(), 1);
    }

    #[test]
    fn children_arity_matches_catalog() {
        let builder = Builder::new();
        let scan = builder.scan("t");
        assert_eq!(scan.children().len(), 0);
        let distinct = builder.distinct(builder.scan("t"));
        assert_eq!(distinct.children().len(), 1);
        let join = builder.join(
            builder.scan("l"),
            builder.scan("r"),
            JoinKind::Inner,
            vec!["id".into()],
        );
        assert_eq!(join.children().len(), 2);
    }
}
