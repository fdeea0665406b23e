use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::domain::callgraph::CallGraph;
use crate::domain::symbol::split_qualified;

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDto {
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    pub package: Option<String>,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl From<&CallGraph> for GraphDto {
    fn from(cg: &CallGraph) -> Self {
        // Callers first, then callees that never appear as callers.
        let mut ids: IndexSet<&str> = cg.callers().collect();
        ids.extend(cg.edges().map(|(_, d)| d.callee.as_str()));

        let nodes = ids
            .into_iter()
            .map(|id| {
                let (package, name) = split_qualified(id);
                NodeDto {
                    id: id.to_string(),
                    package: package.map(str::to_string),
                    name: name.to_string(),
                }
            })
            .collect();

        let edges = cg
            .edges()
            .map(|(caller, d)| EdgeDto {
                from: caller.to_string(),
                to: d.callee.clone(),
                file: d.file.clone(),
                line: d.line,
                column: d.column,
            })
            .collect();

        GraphDto { nodes, edges }
    }
}
