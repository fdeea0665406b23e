// Compilation units and the loaded program.

use std::path::{Path, PathBuf};

use proc_macro2::Span;

use crate::domain::index::SymbolIndex;
use crate::domain::symbol::Position;
use crate::error::{LoadError, LoadResult};

/// One parsed source file and the module it defines.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub crate_name: String,
    /// Absolute module path, crate name first: `["shapes", "geometry"]`.
    pub module_path: Vec<String>,
    pub path: PathBuf,
    pub syntax: syn::File,
}

impl CompilationUnit {
    /// Parses `source` as the file for `module_path`.
    pub fn parse(
        crate_name: &str,
        module_path: Vec<String>,
        path: &Path,
        source: &str,
    ) -> LoadResult<Self> {
        let syntax = syn::parse_file(source).map_err(|e| {
            let start = e.span().start();
            LoadError::Parse {
                path: path.to_path_buf(),
                line: start.line,
                column: start.column + 1,
                message: e.to_string(),
            }
        })?;

        Ok(Self {
            crate_name: crate_name.to_string(),
            module_path,
            path: path.to_path_buf(),
            syntax,
        })
    }

    /// Reads and parses a file from disk.
    pub fn read(crate_name: &str, module_path: Vec<String>, path: &Path) -> LoadResult<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(crate_name, module_path, path, &source)
    }

    pub fn module_key(&self) -> String {
        self.module_path.join("::")
    }

    /// The file name as it appears in edge labels.
    pub fn file_label(&self) -> String {
        self.path.display().to_string()
    }

    /// Resolves a span from this unit's tree to a 1-based line and column.
    ///
    /// Must run on the thread that parsed the unit.
    pub fn position(&self, span: Span) -> Position {
        let start = span.start();
        Position {
            file: self.file_label(),
            line: start.line.max(1),
            column: start.column + 1,
        }
    }
}

/// Everything the builder needs: the units in load order and the symbol
/// table built over all of them.
#[derive(Debug)]
pub struct Program {
    pub units: Vec<CompilationUnit>,
    pub index: SymbolIndex,
}

impl Program {
    pub fn new(units: Vec<CompilationUnit>, extern_crates: &[String]) -> Self {
        let index = SymbolIndex::build(&units, extern_crates);
        Self { units, index }
    }
}
