// Call graph structures for callgraph-dot.
// Maps each caller to the call sites found in its body.

use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::symbol::Position;

/// One outgoing call: who is called and where the call happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallDetail {
    pub callee: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl CallDetail {
    pub fn new(callee: impl Into<String>, position: Position) -> Self {
        Self {
            callee: callee.into(),
            file: position.file,
            line: position.line,
            column: position.column,
        }
    }

    /// `file:line:column`, used as the edge label.
    pub fn label(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}

/// The call graph itself.
///
/// Callers keep the order in which their declarations were met, and each
/// caller's calls keep traversal order. Repeated calls are kept as separate
/// entries.
#[derive(Debug, Default, Clone)]
pub struct CallGraph {
    calls: IndexMap<String, Vec<CallDetail>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a caller key. Functions with no calls still show up.
    pub fn declare(&mut self, caller: &str) {
        if !self.calls.contains_key(caller) {
            self.calls.insert(caller.to_string(), Vec::new());
        }
    }

    pub fn add_call(&mut self, caller: &str, detail: CallDetail) {
        self.calls
            .entry(caller.to_string())
            .or_default()
            .push(detail);
    }

    pub fn callees(&self, caller: &str) -> Option<&[CallDetail]> {
        self.calls.get(caller).map(Vec::as_slice)
    }

    pub fn contains(&self, caller: &str) -> bool {
        self.calls.contains_key(caller)
    }

    pub fn callers(&self) -> impl Iterator<Item = &str> {
        self.calls.keys().map(String::as_str)
    }

    /// Every edge as `(caller, detail)`, in caller order then call order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &CallDetail)> {
        self.calls
            .iter()
            .flat_map(|(caller, details)| details.iter().map(move |d| (caller.as_str(), d)))
    }

    /// Number of caller keys.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.calls.values().map(Vec::len).sum()
    }
}
