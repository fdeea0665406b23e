//! DOT Exporter
//!
//! Exports a CallGraph as a Graphviz digraph, one labeled edge per call site.

use std::io::{Result, Write};

use crate::domain::callgraph::CallGraph;
use crate::ports::OutputExporter;

pub struct DotExporter;

impl DotExporter {
    /// Convert a CallGraph to DOT string.
    pub fn to_dot(cg: &CallGraph) -> String {
        let mut lines = Vec::with_capacity(cg.edge_count() + 2);

        lines.push("digraph G {".to_string());
        for (caller, detail) in cg.edges() {
            lines.push(format!(
                "    {} -> {} [label={}];",
                Self::quote(caller),
                Self::quote(&detail.callee),
                Self::quote(&detail.label())
            ));
        }
        lines.push("}".to_string());

        let mut dot = lines.join("\n");
        dot.push('\n');
        dot
    }

    fn quote(value: &str) -> String {
        format!("\"{}\"", Self::escape(value))
    }

    fn escape(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
    }
}

impl OutputExporter for DotExporter {
    fn export(&self, cg: &CallGraph, out: &mut dyn Write) -> Result<()> {
        out.write_all(Self::to_dot(cg).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::callgraph::CallDetail;
    use crate::domain::symbol::Position;

    fn at(file: &str, line: usize, column: usize) -> Position {
        Position {
            file: file.to_string(),
            line,
            column,
        }
    }

    #[test]
    fn test_to_dot() {
        let mut cg = CallGraph::new();
        cg.declare("demo.main");
        cg.add_call("demo.main", CallDetail::new("demo::net.connect", at("src/main.rs", 3, 5)));
        cg.add_call("demo.main", CallDetail::new("demo::net.connect", at("src/main.rs", 4, 5)));
        cg.declare("demo::net.connect");

        let dot = DotExporter::to_dot(&cg);
        assert_eq!(
            dot,
            "digraph G {\n\
             \x20   \"demo.main\" -> \"demo::net.connect\" [label=\"src/main.rs:3:5\"];\n\
             \x20   \"demo.main\" -> \"demo::net.connect\" [label=\"src/main.rs:4:5\"];\n\
             }\n"
        );
    }

    #[test]
    fn test_empty_graph() {
        let mut cg = CallGraph::new();
        cg.declare("demo.leaf");
        assert_eq!(DotExporter::to_dot(&cg), "digraph G {\n}\n");
    }

    #[test]
    fn test_names_are_escaped() {
        let mut cg = CallGraph::new();
        cg.add_call("a", CallDetail::new("b", at("dir \"x\"\\y.rs", 1, 1)));
        let dot = DotExporter::to_dot(&cg);
        assert!(dot.contains(r#"[label="dir \"x\"\\y.rs:1:1"];"#), "{dot}");
    }

    #[test]
    fn test_export_writes_to_sink() {
        let mut cg = CallGraph::new();
        cg.add_call("a", CallDetail::new("b", at("f.rs", 1, 2)));
        let mut out = Vec::new();
        DotExporter.export(&cg, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("digraph G {\n"));
        assert!(text.trim_end().ends_with('}'));
        assert!(text.contains("    \"a\" -> \"b\" [label=\"f.rs:1:2\"];"));
    }
}
