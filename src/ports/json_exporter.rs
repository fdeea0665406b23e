//! JSON Exporter
//!
//! Writes the call graph as `{ "nodes": [...], "edges": [...] }`.

use std::io::{Result, Write};

use crate::api::dto::GraphDto;
use crate::domain::callgraph::CallGraph;
use crate::ports::OutputExporter;

pub struct JsonExporter;

impl OutputExporter for JsonExporter {
    fn export(&self, cg: &CallGraph, out: &mut dyn Write) -> Result<()> {
        let dto = GraphDto::from(cg);
        serde_json::to_writer_pretty(&mut *out, &dto)?;
        out.write_all(b"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callgraph::CallDetail;
    use crate::domain::symbol::Position;

    #[test]
    fn test_json_nodes_and_edges() {
        let mut cg = CallGraph::new();
        cg.declare("demo.main");
        cg.add_call(
            "demo.main",
            CallDetail::new(
                "drop",
                Position {
                    file: "main.rs".to_string(),
                    line: 2,
                    column: 5,
                },
            ),
        );

        let mut out = Vec::new();
        JsonExporter.export(&cg, &mut out).unwrap();
        let parsed: GraphDto = serde_json::from_slice(&out).unwrap();

        let ids: Vec<&str> = parsed.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["demo.main", "drop"]);
        assert_eq!(parsed.nodes[0].package.as_deref(), Some("demo"));
        assert_eq!(parsed.nodes[1].package, None);
        assert_eq!(parsed.edges.len(), 1);
        assert_eq!(parsed.edges[0].from, "demo.main");
        assert_eq!((parsed.edges[0].line, parsed.edges[0].column), (2, 5));
    }
}
