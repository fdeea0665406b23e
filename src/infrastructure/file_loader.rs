use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::unit::{CompilationUnit, Program};
use crate::error::LoadResult;
use crate::ports::ProgramLoader;

/// Loads exactly one `.rs` file as its own crate.
///
/// `mod name;` declarations are not followed; paths into them stay
/// unresolved.
pub struct SingleFileLoader {
    path: PathBuf,
}

impl SingleFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// The crate name `rustc` derives from a file name: `my-tool.rs` -> `my_tool`.
pub fn crate_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "main".to_string()
    } else {
        name
    }
}

impl ProgramLoader for SingleFileLoader {
    fn load(&self) -> LoadResult<Program> {
        let crate_name = crate_name_for(&self.path);
        let unit = CompilationUnit::read(&crate_name, vec![crate_name.clone()], &self.path)?;
        info!(file = %self.path.display(), crate_name = %crate_name, "loaded single file");
        Ok(Program::new(vec![unit], &[]))
    }
}
