// Command-line entry point for callgraph-dot.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use callgraph_dot::application::AnalyzeUsecase;
use callgraph_dot::infrastructure::logging::init_tracing;
use callgraph_dot::infrastructure::{select_loader, SynCallGraphBuilder};
use callgraph_dot::ports::dot_exporter::DotExporter;
use callgraph_dot::ports::json_exporter::JsonExporter;
use callgraph_dot::ports::OutputExporter;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "callgraph", author, version, about, long_about = None)]
struct Cli {
    /// A `.rs` file, a package directory or Cargo.toml, or a pattern ending
    /// in `...` for every workspace package below a directory
    target: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Dot)]
    format: Format,

    /// Write the graph to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not look for calls inside macro arguments
    #[arg(long)]
    skip_macros: bool,

    /// More log output on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Dot,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loader = select_loader(&cli.target);
    let builder = SynCallGraphBuilder::new().with_macro_args(!cli.skip_macros);
    let exporter: Box<dyn OutputExporter> = match cli.format {
        Format::Dot => Box::new(DotExporter),
        Format::Json => Box::new(JsonExporter),
    };

    let usecase = AnalyzeUsecase {
        loader: loader.as_ref(),
        callgraph_builder: &builder,
        exporter: exporter.as_ref(),
    };

    // Rendered in memory so a failed run never leaves half a graph behind.
    let mut rendered = Vec::new();
    let cg = usecase.run(&mut rendered)?;

    match &cli.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered)?;
            stdout.flush()?;
        }
    }

    info!(
        callers = cg.len(),
        edges = cg.edge_count(),
        "call graph written"
    );
    Ok(())
}
