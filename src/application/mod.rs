use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::domain::callgraph::CallGraph;
use crate::ports::{CallGraphBuilder, OutputExporter, ProgramLoader};

/// Load, build, export. Loading failures abort before anything is written.
pub struct AnalyzeUsecase<'a> {
    pub loader: &'a dyn ProgramLoader,
    pub callgraph_builder: &'a dyn CallGraphBuilder,
    pub exporter: &'a dyn OutputExporter,
}

impl<'a> AnalyzeUsecase<'a> {
    pub fn run(&self, out: &mut dyn Write) -> Result<CallGraph> {
        let program = self.loader.load().context("failed to load program")?;
        info!(units = program.units.len(), "program loaded");

        let cg = self.callgraph_builder.build_call_graph(&program);
        self.exporter
            .export(&cg, out)
            .context("failed to write call graph")?;
        Ok(cg)
    }
}
