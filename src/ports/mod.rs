use std::io::Write;

use crate::domain::callgraph::CallGraph;
use crate::domain::unit::Program;
use crate::error::LoadResult;

pub mod dot_exporter;
pub mod json_exporter;

/// Turns a target into compilation units and their symbol table.
pub trait ProgramLoader {
    fn load(&self) -> LoadResult<Program>;
}

pub trait CallGraphBuilder {
    fn build_call_graph(&self, program: &Program) -> CallGraph;
}

pub trait OutputExporter {
    fn export(&self, cg: &CallGraph, out: &mut dyn Write) -> std::io::Result<()>;
}
