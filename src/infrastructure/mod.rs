// Infrastructure implementations for callgraph-dot.

use std::path::Path;

use crate::ports::ProgramLoader;

pub mod file_loader;
pub mod logging;
pub mod module_tree;
pub mod project_loader;
pub mod syn_builder;

pub use file_loader::SingleFileLoader;
pub use project_loader::WorkspaceLoader;
pub use syn_builder::SynCallGraphBuilder;

/// Picks the loader for a command-line target: a `.rs` file is a single
/// compilation unit, anything else is a package pattern.
pub fn select_loader(target: &str) -> Box<dyn ProgramLoader> {
    let path = Path::new(target);
    if path.extension().is_some_and(|ext| ext == "rs") {
        Box::new(SingleFileLoader::new(path))
    } else {
        Box::new(WorkspaceLoader::from_pattern(target))
    }
}
