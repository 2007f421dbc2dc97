// Copyright (c) 2025 Ibex Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use serde::{Deserialize, Serialize};

use crate::node::Node;

/// One statement in a lowered program: a node, plus the name it was
/// bound to by a `let`. An unbound statement is the trailing bare
/// expression statement whose result the whole program evaluates to,
/// so only the final statement in a `Program` is expected to have
/// `binding: None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramStatement {
    pub binding: Option<String>,
    pub node: Node,
}

/// The output of lowering a whole `ibex-ast` `Program`: an ordered
/// list of statements to run in sequence. There is no dedicated IR
/// node for `let`, binding lives at this level, one step above the
/// per-expression plan tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<ProgramStatement>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, binding: Option<String>, node: Node) {
        self.statements.push(ProgramStatement { binding, node });
    }
}
